//! Remote cart store used once a session is authenticated.

use reqwest::Method;

use crate::config;
use crate::error::Result;
use crate::http::ApiClient;
use crate::models::{CartItem, CartResponse, ProductIdRequest, QuantityRequest, TransferRequest};

/// The authenticated cart's source of truth.
///
/// Every call is a single remote round-trip; none of them mutate local
/// state. [`HttpCartBackend`] talks to the marketplace API; tests supply
/// scripted implementations.
pub trait CartBackend {
    /// Read the authenticated cart.
    fn fetch(&self) -> Result<Vec<CartItem>>;

    /// Add `quantity` units of `product_id`.
    fn add(&self, product_id: u64, quantity: u32) -> Result<()>;

    /// Delete the row for `product_id`.
    fn remove(&self, product_id: u64) -> Result<()>;

    /// Set the row for `product_id` to `quantity`.
    fn update(&self, product_id: u64, quantity: u32) -> Result<()>;

    /// Empty the authenticated cart.
    fn clear(&self) -> Result<()>;

    /// Submit a whole guest cart in one call.
    fn transfer(&self, items: &[CartItem]) -> Result<()>;
}

// ---------------------------------------------------------------------------
// HttpCartBackend
// ---------------------------------------------------------------------------

/// [`CartBackend`] over the marketplace's `/cart` endpoints.
#[derive(Debug, Clone)]
pub struct HttpCartBackend {
    api: ApiClient,
}

impl HttpCartBackend {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl CartBackend for HttpCartBackend {
    fn fetch(&self) -> Result<Vec<CartItem>> {
        let resp: CartResponse = self.api.get_json(config::CART_PATH)?;
        Ok(resp.into_items())
    }

    fn add(&self, product_id: u64, quantity: u32) -> Result<()> {
        self.api.send_json(
            Method::POST,
            config::CART_ADD_PATH,
            &QuantityRequest {
                product_id,
                quantity,
            },
        )
    }

    fn remove(&self, product_id: u64) -> Result<()> {
        self.api.send_json(
            Method::DELETE,
            config::CART_REMOVE_PATH,
            &ProductIdRequest { product_id },
        )
    }

    fn update(&self, product_id: u64, quantity: u32) -> Result<()> {
        self.api.send_json(
            Method::PUT,
            config::CART_UPDATE_PATH,
            &QuantityRequest {
                product_id,
                quantity,
            },
        )
    }

    fn clear(&self) -> Result<()> {
        self.api.send(Method::DELETE, config::CART_CLEAR_PATH)
    }

    fn transfer(&self, items: &[CartItem]) -> Result<()> {
        self.api
            .send_json(Method::POST, config::CART_TRANSFER_PATH, &TransferRequest { items })
    }
}
