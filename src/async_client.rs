//! Async wrapper around [`MarketplaceClient`] for use in async runtimes (Tokio, etc.).
//!
//! Runs every operation on the blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the event loop free while the
//! blocking HTTP client waits. The client sits behind a fair async mutex that
//! is taken before the blocking task is spawned, so rapid calls (e.g. repeated
//! quantity clicks) apply in the order they were issued.
//!
//! # Example
//!
//! ```no_run
//! use artisan_cart::AsyncMarketplaceClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = AsyncMarketplaceClient::builder()
//!         .base_url("https://market.example")
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     client.update_quantity(7, 3).await.unwrap();
//!     let count = client.run(|c| Ok(c.cart().total_items())).await.unwrap();
//! }
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::error::{CartError, Result};
use crate::models::{CartItem, ProductRef};
use crate::{MarketplaceClient, MarketplaceClientBuilder, TransferOutcome};

// ---------------------------------------------------------------------------
// AsyncMarketplaceClientBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncMarketplaceClient`].
///
/// Accepts the same options as [`MarketplaceClientBuilder`].
#[derive(Debug, Clone, Default)]
pub struct AsyncMarketplaceClientBuilder {
    inner: MarketplaceClientBuilder,
}

impl AsyncMarketplaceClientBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.inner = self.inner.base_url(url);
        self
    }

    pub fn storage_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.inner = self.inner.storage_dir(path);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.timeout(timeout);
        self
    }

    pub fn bearer_token(mut self, token: &str) -> Self {
        self.inner = self.inner.bearer_token(token);
        self
    }

    pub fn csrf_token(mut self, token: &str) -> Self {
        self.inner = self.inner.csrf_token(token);
        self
    }

    pub fn authenticated(mut self, authenticated: bool) -> Self {
        self.inner = self.inner.authenticated(authenticated);
        self
    }

    pub fn initial_unread(mut self, count: u64) -> Self {
        self.inner = self.inner.initial_unread(count);
        self
    }

    /// Build the client on the blocking thread pool.
    ///
    /// An authenticated mount performs network calls, so this never runs on
    /// the async event loop.
    pub async fn build(self) -> Result<AsyncMarketplaceClient> {
        let builder = self.inner;
        tokio::task::spawn_blocking(move || {
            let client = builder.build()?;
            Ok(AsyncMarketplaceClient {
                inner: Arc::new(Mutex::new(client)),
            })
        })
        .await
        .map_err(|e| CartError::Runtime(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncMarketplaceClient
// ---------------------------------------------------------------------------

/// Async wrapper around [`MarketplaceClient`].
///
/// Cloning shares the same underlying client.
#[derive(Clone)]
pub struct AsyncMarketplaceClient {
    inner: Arc<Mutex<MarketplaceClient>>,
}

impl AsyncMarketplaceClient {
    /// Create a new builder for configuring the async client.
    pub fn builder() -> AsyncMarketplaceClientBuilder {
        AsyncMarketplaceClientBuilder::default()
    }

    /// Wrap an already-built client.
    pub fn from_client(client: MarketplaceClient) -> Self {
        Self {
            inner: Arc::new(Mutex::new(client)),
        }
    }

    /// Run a sync operation on the blocking thread pool.
    ///
    /// The client lock is requested when the returned future is first polled
    /// and is granted in request order, so operations issued through clones of
    /// one handle run one at a time in the order they were issued.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut MarketplaceClient) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut guard = self.inner.clone().lock_owned().await;
        tokio::task::spawn_blocking(move || f(&mut guard))
            .await
            .map_err(|e| CartError::Runtime(format!("Task join error: {e}")))?
    }

    pub async fn add_to_cart(&self, product: ProductRef, quantity: u32) -> Result<()> {
        self.run(move |c| c.cart_mut().add_to_cart(&product, quantity))
            .await
    }

    pub async fn remove_from_cart(&self, product_id: u64) -> Result<()> {
        self.run(move |c| c.cart_mut().remove_from_cart(product_id))
            .await
    }

    pub async fn update_quantity(&self, product_id: u64, quantity: u32) -> Result<()> {
        self.run(move |c| c.cart_mut().update_quantity(product_id, quantity))
            .await
    }

    pub async fn clear_cart(&self) -> Result<()> {
        self.run(|c| c.cart_mut().clear_cart()).await
    }

    pub async fn refresh_cart(&self) -> Result<()> {
        self.run(|c| c.cart_mut().refresh_cart()).await
    }

    pub async fn set_authenticated(&self, authenticated: bool) -> Result<Option<TransferOutcome>> {
        self.run(move |c| c.cart_mut().set_authenticated(authenticated))
            .await
    }

    /// Snapshot of the current cart rows.
    pub async fn items(&self) -> Result<Vec<CartItem>> {
        self.run(|c| Ok(c.cart().items().to_vec())).await
    }

    pub async fn total_amount(&self) -> Result<Decimal> {
        self.run(|c| Ok(c.cart().total_amount())).await
    }

    pub async fn mark_notification_read(&self, notification_id: u64) -> Result<u64> {
        self.run(move |c| c.notifications_mut().mark_as_read(notification_id))
            .await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<u64> {
        self.run(|c| c.notifications_mut().mark_all_as_read()).await
    }

    /// Release this handle on the blocking thread pool.
    ///
    /// The blocking HTTP client must not be dropped on an async worker thread;
    /// close the last handle this way once the client has talked to the API.
    pub async fn close(self) -> Result<()> {
        let inner = self.inner;
        tokio::task::spawn_blocking(move || drop(inner))
            .await
            .map_err(|e| CartError::Runtime(format!("Task join error: {e}")))
    }
}
