use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CartError;
use crate::models::cart::Seller;

// ---------------------------------------------------------------------------
// ProductRef — The one product shape the cart controller accepts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: u64,
    pub name: String,
    pub price: Decimal,
    pub primary_image: Option<String>,
    pub seller: Seller,
    pub available_quantity: u32,
}

// ---------------------------------------------------------------------------
// ProductPayload — Loose product shape as it appears in page payloads
// ---------------------------------------------------------------------------

/// Product data as different pages send it.
///
/// Listing pages carry `image` and a bare `artisan` name, detail pages carry
/// `primary_image` and a nested `seller`; stock is either
/// `available_quantity` or `stock_quantity`. Convert with
/// [`ProductRef::try_from`].
///
/// Conversion fails without an id, a name, a non-negative price, a seller id
/// (nested `seller.id` or `seller_id`) and a seller name (nested
/// `seller.name` or `artisan`). Missing stock reads as out of stock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPayload {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub primary_image: Option<String>,
    pub image: Option<String>,
    pub seller: Option<SellerPayload>,
    pub artisan: Option<String>,
    pub seller_id: Option<u64>,
    pub available_quantity: Option<u32>,
    pub stock_quantity: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SellerPayload {
    pub id: Option<u64>,
    pub name: Option<String>,
}

impl TryFrom<ProductPayload> for ProductRef {
    type Error = CartError;

    fn try_from(p: ProductPayload) -> Result<Self, Self::Error> {
        let id = p
            .id
            .ok_or_else(|| CartError::InvalidArgument("product payload has no id".into()))?;
        let name = p.name.filter(|n| !n.trim().is_empty()).ok_or_else(|| {
            CartError::InvalidArgument(format!("product {} has no name", id))
        })?;
        let price = p.price.ok_or_else(|| {
            CartError::InvalidArgument(format!("product {} has no price", id))
        })?;
        if price.is_sign_negative() {
            return Err(CartError::InvalidArgument(format!(
                "product {} has a negative price: {}",
                id, price
            )));
        }

        let (nested_id, nested_name) = match p.seller {
            Some(s) => (s.id, s.name),
            None => (None, None),
        };
        let seller = Seller {
            id: nested_id.or(p.seller_id).ok_or_else(|| {
                CartError::InvalidArgument(format!("product {} has no seller id", id))
            })?,
            name: nested_name
                .or(p.artisan)
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| {
                    CartError::InvalidArgument(format!("product {} has no seller name", id))
                })?,
        };

        Ok(ProductRef {
            id,
            name,
            price,
            primary_image: p.primary_image.or(p.image),
            seller,
            available_quantity: p
                .available_quantity
                .or(p.stock_quantity)
                .unwrap_or_default(),
        })
    }
}
