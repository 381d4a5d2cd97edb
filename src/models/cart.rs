use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CartError, Result};

// ---------------------------------------------------------------------------
// Seller — Denormalized artisan snapshot carried by each cart row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    pub id: u64,
    pub name: String,
}

// ---------------------------------------------------------------------------
// CartItem — One row of a guest or authenticated cart
// ---------------------------------------------------------------------------

/// A single cart row.
///
/// `id` is client-generated for guest rows and server-assigned for
/// authenticated rows; servers that send numeric ids are accepted.
/// `max_quantity` is the stock ceiling recorded when the row was added and
/// is not re-validated against live inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub product_id: u64,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub primary_image: Option<String>,
    pub quantity: u32,
    pub seller: Seller,
    #[serde(alias = "stock_quantity")]
    pub max_quantity: u32,
}

impl CartItem {
    /// `price * quantity` for this row, saturating at `Decimal::MAX`.
    ///
    /// Rows held by a cart controller have passed [`CartTotals::checked`], so
    /// this is exact for them.
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }

    /// `price * quantity`, or `None` on overflow.
    pub fn checked_line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

// ---------------------------------------------------------------------------
// CartTotals — Derived values, recomputed on every read
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub total_items: u64,
    pub total_amount: Decimal,
}

impl CartTotals {
    /// Totals of `items`; the amount saturates instead of overflowing.
    pub fn of(items: &[CartItem]) -> Self {
        Self {
            total_items: items.iter().map(|i| u64::from(i.quantity)).sum(),
            total_amount: items
                .iter()
                .fold(Decimal::ZERO, |acc, i| acc.saturating_add(i.line_total())),
        }
    }

    /// Totals of `items`, rejecting negative prices and amounts that do not
    /// fit in a `Decimal`.
    pub fn checked(items: &[CartItem]) -> Result<Self> {
        let mut total_amount = Decimal::ZERO;
        for item in items {
            if item.price.is_sign_negative() && !item.price.is_zero() {
                return Err(CartError::InvalidArgument(format!(
                    "product {} has a negative price: {}",
                    item.product_id, item.price
                )));
            }
            total_amount = item
                .checked_line_total()
                .and_then(|line| total_amount.checked_add(line))
                .ok_or_else(|| {
                    CartError::InvalidArgument(format!(
                        "cart total overflows at product {}",
                        item.product_id
                    ))
                })?;
        }
        Ok(Self {
            total_items: items.iter().map(|i| u64::from(i.quantity)).sum(),
            total_amount,
        })
    }
}

// ---------------------------------------------------------------------------
// SellerGroup — Cart rows grouped per artisan for checkout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellerGroup {
    pub seller: Seller,
    pub items: Vec<CartItem>,
    pub subtotal: Decimal,
}

// ---------------------------------------------------------------------------
// BadgeUpdate — Published whenever the visible cart count changes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeUpdate {
    pub count: u64,
}

// ---------------------------------------------------------------------------
// Wire payloads for the cart endpoints
// ---------------------------------------------------------------------------

/// Body of `GET /cart`. Both `{items: [...]}` and `{data: {items: [...]}}`
/// are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CartResponse {
    Flat { items: Vec<CartItem> },
    Wrapped { data: CartItems },
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartItems {
    pub items: Vec<CartItem>,
}

impl CartResponse {
    pub fn into_items(self) -> Vec<CartItem> {
        match self {
            CartResponse::Flat { items } => items,
            CartResponse::Wrapped { data } => data.items,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuantityRequest {
    pub product_id: u64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductIdRequest {
    pub product_id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferRequest<'a> {
    pub items: &'a [CartItem],
}
