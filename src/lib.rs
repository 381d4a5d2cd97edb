//! Cart client for the local-artisan marketplace.
//!
//! Keeps the shopping cart of one browsing session in sync with the right
//! store: a local guest slot before login, the marketplace API after it. On
//! login the guest cart is transferred to the account once. A small
//! unread-notification badge shares the same subscription model.
//!
//! # Quick start
//!
//! ```no_run
//! use artisan_cart::models::ProductPayload;
//! use artisan_cart::{MarketplaceClient, ProductRef};
//!
//! let mut client = MarketplaceClient::builder()
//!     .base_url("https://market.example")
//!     .build()
//!     .unwrap();
//!
//! client.cart_mut().subscribe(|update| println!("badge: {}", update.count));
//!
//! let payload: ProductPayload = serde_json::from_str(
//!     r#"{"id": 7, "name": "Walnut bowl", "price": "42.50", "image": "bowl.jpg",
//!         "artisan": "Ines", "seller_id": 3, "stock_quantity": 4}"#,
//! ).unwrap();
//! let product = ProductRef::try_from(payload).unwrap();
//! client.cart_mut().add_to_cart(&product, 2).unwrap();
//!
//! // After the user logs in
//! client.cart_mut().set_authenticated(true).unwrap();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod backend;
pub mod cart;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod models;
pub mod notifications;
pub mod storage;

#[cfg(feature = "async")]
pub use async_client::AsyncMarketplaceClient;
pub use backend::{CartBackend, HttpCartBackend};
pub use cart::{stored_badge_count, CartController, SessionState, TransferOutcome};
pub use error::{CartError, Result};
pub use events::SubscriptionId;
pub use http::ApiClient;
pub use models::{BadgeUpdate, CartItem, ProductRef, Seller, UnreadCount};
pub use notifications::{HttpNotificationBackend, NotificationBackend, NotificationBadge};
pub use storage::{FileStorage, MemoryStorage, SlotStorage};

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Cart controller as wired by [`MarketplaceClient`].
pub type HttpCart = CartController<FileStorage, HttpCartBackend>;

// ---------------------------------------------------------------------------
// MarketplaceClientBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`MarketplaceClient`].
///
/// Use [`MarketplaceClient::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](MarketplaceClientBuilder::build).
#[derive(Debug, Clone)]
pub struct MarketplaceClientBuilder {
    base_url: String,
    storage_dir: Option<PathBuf>,
    timeout: Duration,
    bearer_token: Option<String>,
    csrf_token: Option<String>,
    authenticated: bool,
    initial_unread: u64,
}

impl Default for MarketplaceClientBuilder {
    fn default() -> Self {
        Self {
            base_url: config::DEFAULT_BASE_URL.to_string(),
            storage_dir: None,
            timeout: config::DEFAULT_TIMEOUT,
            bearer_token: None,
            csrf_token: None,
            authenticated: false,
            initial_unread: 0,
        }
    }
}

impl MarketplaceClientBuilder {
    /// Base URL of the marketplace API (e.g. `https://market.example`).
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Set a custom directory for the guest cart and badge count slots.
    ///
    /// If not set, the platform local data directory is used
    /// (e.g. `~/.local/share/artisan-cart` on Linux).
    pub fn storage_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.storage_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the HTTP request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn bearer_token(mut self, token: &str) -> Self {
        self.bearer_token = Some(token.to_string());
        self
    }

    /// Send `X-CSRF-TOKEN: <token>` with every request.
    pub fn csrf_token(mut self, token: &str) -> Self {
        self.csrf_token = Some(token.to_string());
        self
    }

    /// Whether the page was rendered for a logged-in user.
    pub fn authenticated(mut self, authenticated: bool) -> Self {
        self.authenticated = authenticated;
        self
    }

    /// Unread notification count from the initial page payload.
    pub fn initial_unread(mut self, count: u64) -> Self {
        self.initial_unread = count;
        self
    }

    /// Build the client: open storage, create the HTTP client, mount the cart.
    ///
    /// Mounting an authenticated session contacts the API (transfer, then a
    /// cart fetch); a guest session only reads local storage.
    pub fn build(self) -> Result<MarketplaceClient> {
        let storage = FileStorage::new(self.storage_dir)?;
        let api = ApiClient::new(
            &self.base_url,
            self.timeout,
            self.bearer_token.as_deref(),
            self.csrf_token.as_deref(),
        )?;
        let cart = CartController::mount(
            storage,
            HttpCartBackend::new(api.clone()),
            self.authenticated,
        )?;
        let notifications =
            NotificationBadge::new(HttpNotificationBackend::new(api.clone()), self.initial_unread);
        Ok(MarketplaceClient {
            api,
            cart,
            notifications,
        })
    }
}

// ---------------------------------------------------------------------------
// MarketplaceClient
// ---------------------------------------------------------------------------

/// One session's cart and notification badge, wired to the marketplace API.
///
/// Created via [`MarketplaceClient::builder()`]. Pass it (or the parts it
/// lends out) to whatever renders the cart and header; there is no global
/// state.
pub struct MarketplaceClient {
    api: ApiClient,
    cart: HttpCart,
    notifications: NotificationBadge<HttpNotificationBackend>,
}

impl MarketplaceClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> MarketplaceClientBuilder {
        MarketplaceClientBuilder::default()
    }

    pub fn cart(&self) -> &HttpCart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut HttpCart {
        &mut self.cart
    }

    pub fn notifications(&self) -> &NotificationBadge<HttpNotificationBackend> {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationBadge<HttpNotificationBackend> {
        &mut self.notifications
    }

    /// The shared HTTP transport, for calls this crate does not wrap.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for MarketplaceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MarketplaceClient(api={}, storage={}, state={:?}, items={}, unread={})",
            self.api.base_url(),
            self.cart.storage().path().display(),
            self.cart.state(),
            self.cart.total_items(),
            self.notifications.unread()
        )
    }
}
