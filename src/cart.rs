//! Cart synchronization controller.
//!
//! One controller owns the cart of one browsing session. While the session is
//! a guest, every operation reads and writes the guest slot of a
//! [`SlotStorage`]. Once authenticated, every operation goes to a
//! [`CartBackend`] and the local item list is only a cache, replaced by a
//! fresh fetch after each successful mutation. The first switch to
//! authenticated migrates the guest cart into the backend, at most once per
//! session.

use std::io;

use rust_decimal::Decimal;

use crate::backend::CartBackend;
use crate::config;
use crate::error::{CartError, Result};
use crate::events::{SubscriptionId, Subscribers};
use crate::models::{BadgeUpdate, CartItem, CartTotals, ProductRef, SellerGroup};
use crate::storage::SlotStorage;

// ---------------------------------------------------------------------------
// SessionState / TransferOutcome
// ---------------------------------------------------------------------------

/// Which store backs the cart. There is no way back to `Guest` once a session
/// has left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Guest,
    Transferring,
    Authenticated,
}

/// Result of the one-time guest cart transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The guest slot was absent or empty; no remote call was made.
    Skipped,
    /// The backend accepted the guest items and the guest slot was deleted.
    Transferred { items: usize },
    /// The backend rejected the transfer. The guest slot is left as it was
    /// and the transfer is not retried this session.
    Failed { message: String },
}

// ---------------------------------------------------------------------------
// CartController
// ---------------------------------------------------------------------------

/// Single cart API over a guest store and a remote store.
///
/// Created via [`CartController::mount`]. Mutations take `&mut self`, so two
/// updates for the same session can never interleave.
pub struct CartController<S, B> {
    storage: S,
    backend: B,
    state: SessionState,
    items: Vec<CartItem>,
    transfer_done: bool,
    last_transfer: Option<TransferOutcome>,
    subscribers: Subscribers<BadgeUpdate>,
}

impl<S: SlotStorage, B: CartBackend> CartController<S, B> {
    /// Mount a controller for a session.
    ///
    /// A guest session loads the guest slot. An authenticated session runs the
    /// guest transfer first (a guest cart left from before login is migrated,
    /// an empty one costs no remote call) and then fetches the remote cart.
    pub fn mount(storage: S, backend: B, authenticated: bool) -> Result<Self> {
        let mut cart = Self {
            storage,
            backend,
            state: SessionState::Guest,
            items: Vec::new(),
            transfer_done: false,
            last_transfer: None,
            subscribers: Subscribers::new(),
        };

        if authenticated {
            cart.authenticate()?;
        } else {
            let items = cart.load_guest()?;
            cart.commit(items)?;
        }
        tracing::debug!(state = ?cart.state, items = cart.items.len(), "cart mounted");
        Ok(cart)
    }

    // -- Session ------------------------------------------------------------

    /// Feed the externally supplied authentication flag.
    ///
    /// The first `true` while the session is a guest runs the transfer and
    /// returns its outcome. Every other call, including a `false` after
    /// authentication, leaves the session as it is and returns `None`.
    pub fn set_authenticated(&mut self, authenticated: bool) -> Result<Option<TransferOutcome>> {
        if !authenticated || self.state != SessionState::Guest {
            if !authenticated && self.state != SessionState::Guest {
                tracing::debug!("ignoring logout signal; session stays authenticated");
            }
            return Ok(None);
        }
        self.authenticate()
    }

    fn authenticate(&mut self) -> Result<Option<TransferOutcome>> {
        let outcome = if self.transfer_done {
            None
        } else {
            Some(self.run_transfer())
        };
        self.state = SessionState::Authenticated;
        tracing::debug!("cart session authenticated");
        self.reload_remote()?;
        Ok(outcome)
    }

    fn run_transfer(&mut self) -> TransferOutcome {
        self.state = SessionState::Transferring;

        let outcome = match self.load_guest() {
            Err(e) => TransferOutcome::Failed {
                message: e.to_string(),
            },
            Ok(guest) if guest.is_empty() => TransferOutcome::Skipped,
            Ok(guest) => match self.backend.transfer(&guest) {
                Ok(()) => {
                    if let Err(e) = self.storage.remove(config::GUEST_CART_SLOT) {
                        tracing::warn!(error = %e, "transferred guest cart but could not delete it");
                    }
                    tracing::info!(items = guest.len(), "transferred guest cart");
                    TransferOutcome::Transferred { items: guest.len() }
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        stranded_items = guest.len(),
                        "guest cart transfer failed; not retrying this session"
                    );
                    TransferOutcome::Failed {
                        message: e.to_string(),
                    }
                }
            },
        };

        self.transfer_done = true;
        self.last_transfer = Some(outcome.clone());
        outcome
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state != SessionState::Guest
    }

    /// Whether the transfer has run (in any outcome) this session.
    pub fn transfer_completed(&self) -> bool {
        self.transfer_done
    }

    /// Outcome of this session's transfer, if it has run.
    pub fn last_transfer(&self) -> Option<&TransferOutcome> {
        self.last_transfer.as_ref()
    }

    // -- Operations ---------------------------------------------------------

    /// Add `quantity` units of `product`.
    ///
    /// An existing row for the product becomes
    /// `min(existing + quantity, available_quantity)`, which shrinks it when
    /// stock has dropped below what the cart holds; otherwise a new row is
    /// inserted with `min(quantity, available_quantity)`. A zero quantity or
    /// an out-of-stock product is rejected without touching the cart.
    pub fn add_to_cart(&mut self, product: &ProductRef, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(CartError::InvalidArgument(
                "quantity to add must be at least 1".into(),
            ));
        }
        if product.available_quantity == 0 {
            return Err(CartError::InvalidArgument(format!(
                "product {} is out of stock",
                product.id
            )));
        }

        let existing = self.item(product.id).map(|i| i.quantity);
        let target = existing
            .unwrap_or(0)
            .saturating_add(quantity)
            .min(product.available_quantity);

        if self.is_authenticated() {
            let current = existing.unwrap_or(0);
            if target > current {
                self.backend.add(product.id, target - current)?;
            } else if target < current {
                tracing::debug!(
                    product_id = product.id,
                    quantity = target,
                    "stock dropped; shrinking row"
                );
                self.backend.update(product.id, target)?;
            } else {
                tracing::debug!(product_id = product.id, "already at stock ceiling");
                return Ok(());
            }
            return self.reload_remote();
        }

        let mut items = self.items.clone();
        match items.iter_mut().find(|i| i.product_id == product.id) {
            Some(row) => {
                row.quantity = target;
                row.max_quantity = product.available_quantity;
            }
            None => items.push(CartItem {
                id: guest_item_id(),
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                primary_image: product.primary_image.clone(),
                quantity: target,
                seller: product.seller.clone(),
                max_quantity: product.available_quantity,
            }),
        }
        self.save_guest(items)
    }

    /// Delete the row for `product_id`. Absent products are a no-op.
    pub fn remove_from_cart(&mut self, product_id: u64) -> Result<()> {
        if !self.contains(product_id) {
            return Ok(());
        }

        if self.is_authenticated() {
            self.backend.remove(product_id)?;
            return self.reload_remote();
        }

        let items = self
            .items
            .iter()
            .filter(|i| i.product_id != product_id)
            .cloned()
            .collect();
        self.save_guest(items)
    }

    /// Set the quantity of the row for `product_id`.
    ///
    /// Zero removes the row. Other values are clamped to the row's recorded
    /// `max_quantity`. Absent products are a no-op.
    pub fn update_quantity(&mut self, product_id: u64, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return self.remove_from_cart(product_id);
        }

        let Some(row) = self.item(product_id) else {
            return Ok(());
        };
        let clamped = if row.max_quantity > 0 {
            quantity.min(row.max_quantity)
        } else {
            quantity
        };
        if clamped == row.quantity {
            return Ok(());
        }

        if self.is_authenticated() {
            self.backend.update(product_id, clamped)?;
            return self.reload_remote();
        }

        let mut items = self.items.clone();
        if let Some(row) = items.iter_mut().find(|i| i.product_id == product_id) {
            row.quantity = clamped;
        }
        self.save_guest(items)
    }

    /// Empty the cart: remove the guest slot, or issue a remote clear.
    pub fn clear_cart(&mut self) -> Result<()> {
        if self.is_authenticated() {
            self.backend.clear()?;
            return self.reload_remote();
        }

        self.storage.remove(config::GUEST_CART_SLOT)?;
        self.commit(Vec::new())
    }

    /// Reload the item list from the backing store.
    pub fn refresh_cart(&mut self) -> Result<()> {
        if self.is_authenticated() {
            return self.reload_remote();
        }
        let items = self.load_guest()?;
        self.commit(items)
    }

    // -- Reads --------------------------------------------------------------

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn item(&self, product_id: u64) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    pub fn contains(&self, product_id: u64) -> bool {
        self.item(product_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all rows.
    pub fn total_items(&self) -> u64 {
        self.totals().total_items
    }

    /// Sum of `price * quantity` across all rows.
    pub fn total_amount(&self) -> Decimal {
        self.totals().total_amount
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals::of(&self.items)
    }

    /// Rows grouped by seller, in the order each seller first appears.
    pub fn items_by_seller(&self) -> Vec<SellerGroup> {
        let mut groups: Vec<SellerGroup> = Vec::new();
        for item in &self.items {
            match groups.iter_mut().find(|g| g.seller.id == item.seller.id) {
                Some(group) => {
                    group.subtotal = group.subtotal.saturating_add(item.line_total());
                    group.items.push(item.clone());
                }
                None => groups.push(SellerGroup {
                    seller: item.seller.clone(),
                    subtotal: item.line_total(),
                    items: vec![item.clone()],
                }),
            }
        }
        groups
    }

    // -- Badge subscribers --------------------------------------------------

    /// Call `callback` with the new count whenever `total_items` changes.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&BadgeUpdate) + Send + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // -- Parts --------------------------------------------------------------

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consume the controller, returning its storage and backend.
    pub fn into_parts(self) -> (S, B) {
        (self.storage, self.backend)
    }

    // -- Internals ----------------------------------------------------------

    /// Read the guest slot. Contents that are not UTF-8, do not parse, or
    /// hold rows whose totals are invalid count as an empty cart and the slot
    /// is cleared.
    fn load_guest(&mut self) -> Result<Vec<CartItem>> {
        let raw = match self.storage.get(config::GUEST_CART_SLOT) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Vec::new()),
            Err(CartError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
                return self.discard_guest(&e);
            }
            Err(e) => return Err(e),
        };
        let items = match serde_json::from_str::<Vec<CartItem>>(&raw) {
            Ok(items) => items,
            Err(e) => return self.discard_guest(&e),
        };
        match CartTotals::checked(&items) {
            Ok(_) => Ok(items),
            Err(e) => self.discard_guest(&e),
        }
    }

    fn discard_guest(&mut self, error: &dyn std::fmt::Display) -> Result<Vec<CartItem>> {
        tracing::warn!(error = %error, "corrupt guest cart in storage; clearing it");
        self.storage.remove(config::GUEST_CART_SLOT)?;
        Ok(Vec::new())
    }

    /// Persist guest items, then make them current.
    fn save_guest(&mut self, items: Vec<CartItem>) -> Result<()> {
        CartTotals::checked(&items)?;
        let raw = serde_json::to_string(&items)?;
        self.storage.set(config::GUEST_CART_SLOT, &raw)?;
        self.commit(items)
    }

    /// Replace the cache with a fresh remote fetch. A response whose totals
    /// are invalid is rejected and the cache is left as it was.
    fn reload_remote(&mut self) -> Result<()> {
        let items = self.backend.fetch()?;
        CartTotals::checked(&items)?;
        self.commit(items)
    }

    /// Replace the item list; publish and persist the count if it changed.
    fn commit(&mut self, items: Vec<CartItem>) -> Result<()> {
        let before = self.total_items();
        self.items = items;
        let count = self.total_items();
        if count != before || self.storage.get(config::CART_COUNT_SLOT)?.is_none() {
            self.storage
                .set(config::CART_COUNT_SLOT, &count.to_string())?;
        }
        if count != before {
            self.subscribers.publish(&BadgeUpdate { count });
        }
        Ok(())
    }
}

/// Last-known cart count, for drawing the badge before a cart is mounted.
///
/// Missing or unreadable slots read as zero.
pub fn stored_badge_count<S: SlotStorage>(storage: &S) -> u64 {
    storage
        .get(config::CART_COUNT_SLOT)
        .ok()
        .flatten()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(0)
}

fn guest_item_id() -> String {
    format!("{}{:016x}", config::GUEST_ID_PREFIX, rand::random::<u64>())
}
