//! Shared test fixtures for the cart integration tests.
//!
//! Provides `ScriptedBackend`, an in-memory stand-in for the marketplace
//! cart API that records every call and can be told to fail, plus product
//! and storage helpers.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use artisan_cart::models::{CartItem, ProductRef, Seller};
use artisan_cart::{CartBackend, CartController, CartError, MemoryStorage, Result, SlotStorage};
use rust_decimal::Decimal;

/// A remote call as seen by the scripted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch,
    Add { product_id: u64, quantity: u32 },
    Remove { product_id: u64 },
    Update { product_id: u64, quantity: u32 },
    Clear,
    Transfer { items: usize },
}

#[derive(Debug, Default)]
pub struct BackendState {
    pub items: Vec<CartItem>,
    pub calls: Vec<Call>,
    /// Calls matching this predicate name fail with a 500.
    pub failing: Vec<&'static str>,
    next_id: u64,
}

/// In-memory cart server. Clones share state, so a test can keep a handle
/// after moving one into a controller.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    pub state: Arc<Mutex<BackendState>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose authenticated cart already holds `items`.
    pub fn with_items(items: Vec<CartItem>) -> Self {
        let backend = Self::new();
        backend.state.lock().unwrap().items = items;
        backend
    }

    pub fn fail(&self, op: &'static str) {
        self.state.lock().unwrap().failing.push(op);
    }

    pub fn recover(&self) {
        self.state.lock().unwrap().failing.clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn transfer_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Transfer { .. }))
            .count()
    }

    pub fn mutation_calls(&self) -> usize {
        self.calls().iter().filter(|c| **c != Call::Fetch).count()
    }

    pub fn server_items(&self) -> Vec<CartItem> {
        self.state.lock().unwrap().items.clone()
    }

    fn record(&self, op: &'static str, call: Call) -> Result<std::sync::MutexGuard<'_, BackendState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing.contains(&op) {
            return Err(CartError::Remote {
                status: 500,
                message: format!("{} failed", op),
            });
        }
        Ok(state)
    }
}

impl BackendState {
    fn upsert(&mut self, item: &CartItem, quantity: u32) {
        match self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(row) => row.quantity = (row.quantity + quantity).min(row.max_quantity),
            None => {
                self.next_id += 1;
                self.items.push(CartItem {
                    id: format!("srv-{}", self.next_id),
                    quantity: quantity.min(item.max_quantity),
                    ..item.clone()
                });
            }
        }
    }
}

impl CartBackend for ScriptedBackend {
    fn fetch(&self) -> Result<Vec<CartItem>> {
        let state = self.record("fetch", Call::Fetch)?;
        Ok(state.items.clone())
    }

    fn add(&self, product_id: u64, quantity: u32) -> Result<()> {
        let mut state = self.record("add", Call::Add { product_id, quantity })?;
        let template = item(product_id, "2.00", 0, 99);
        state.upsert(&template, quantity);
        Ok(())
    }

    fn remove(&self, product_id: u64) -> Result<()> {
        let mut state = self.record("remove", Call::Remove { product_id })?;
        state.items.retain(|i| i.product_id != product_id);
        Ok(())
    }

    fn update(&self, product_id: u64, quantity: u32) -> Result<()> {
        let mut state = self.record("update", Call::Update { product_id, quantity })?;
        if let Some(row) = state.items.iter_mut().find(|i| i.product_id == product_id) {
            row.quantity = quantity;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut state = self.record("clear", Call::Clear)?;
        state.items.clear();
        Ok(())
    }

    fn transfer(&self, items: &[CartItem]) -> Result<()> {
        let mut state = self.record("transfer", Call::Transfer { items: items.len() })?;
        for guest in items {
            state.upsert(guest, guest.quantity);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn seller(id: u64) -> Seller {
    Seller {
        id,
        name: format!("Artisan {}", id),
    }
}

pub fn product(id: u64, price: &str, available: u32) -> ProductRef {
    ProductRef {
        id,
        name: format!("Product {}", id),
        price: price.parse().unwrap(),
        primary_image: Some(format!("products/{}.jpg", id)),
        seller: seller(id % 3 + 1),
        available_quantity: available,
    }
}

pub fn item(product_id: u64, price: &str, quantity: u32, max_quantity: u32) -> CartItem {
    CartItem {
        id: format!("guest-{:016x}", product_id),
        product_id,
        name: format!("Product {}", product_id),
        price: price.parse().unwrap(),
        primary_image: None,
        quantity,
        seller: seller(product_id % 3 + 1),
        max_quantity,
    }
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Memory storage whose guest slot already holds `items`.
pub fn guest_storage(items: &[CartItem]) -> MemoryStorage {
    let mut storage = MemoryStorage::new();
    storage
        .set("guest_cart", &serde_json::to_string(items).unwrap())
        .unwrap();
    storage
}

pub fn guest_cart() -> CartController<MemoryStorage, ScriptedBackend> {
    CartController::mount(MemoryStorage::new(), ScriptedBackend::new(), false).unwrap()
}

/// Stored guest items, or `None` if the slot is absent.
pub fn stored_guest(storage: &MemoryStorage) -> Option<Vec<CartItem>> {
    storage
        .get("guest_cart")
        .unwrap()
        .map(|raw| serde_json::from_str(&raw).unwrap())
}
