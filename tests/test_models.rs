//! Product payload normalisation and cart item wire format.

mod common;

use artisan_cart::models::{CartItem, CartResponse, CartTotals, ProductPayload};
use artisan_cart::{CartError, ProductRef};
use common::{dec, item};
use rust_decimal::Decimal;
use serde_json::json;

fn payload(value: serde_json::Value) -> ProductPayload {
    serde_json::from_value(value).unwrap()
}

#[test]
fn listing_shape_normalises_image_and_artisan() {
    let p = ProductRef::try_from(payload(json!({
        "id": 7,
        "name": "Walnut bowl",
        "price": "42.50",
        "image": "bowls/7.jpg",
        "artisan": "Ines",
        "seller_id": 3,
        "stock_quantity": 4
    })))
    .unwrap();

    assert_eq!(p.primary_image.as_deref(), Some("bowls/7.jpg"));
    assert_eq!(p.seller.id, 3);
    assert_eq!(p.seller.name, "Ines");
    assert_eq!(p.available_quantity, 4);
    assert_eq!(p.price, dec("42.5"));
}

#[test]
fn detail_shape_prefers_nested_seller_and_primary_image() {
    let p = ProductRef::try_from(payload(json!({
        "id": 8,
        "name": "Linen apron",
        "price": 18.0,
        "primary_image": "aprons/8.jpg",
        "image": "thumbs/8.jpg",
        "seller": {"id": 5, "name": "Tomas"},
        "artisan": "ignored",
        "available_quantity": 2
    })))
    .unwrap();

    assert_eq!(p.primary_image.as_deref(), Some("aprons/8.jpg"));
    assert_eq!(p.seller.id, 5);
    assert_eq!(p.seller.name, "Tomas");
    assert_eq!(p.available_quantity, 2);
}

#[test]
fn missing_fields_and_negative_price_are_rejected() {
    let no_id = ProductRef::try_from(payload(json!({"name": "x", "price": "1.00"})));
    assert!(matches!(no_id, Err(CartError::InvalidArgument(_))));

    let no_name = ProductRef::try_from(payload(json!({"id": 1, "name": " ", "price": "1.00"})));
    assert!(matches!(no_name, Err(CartError::InvalidArgument(_))));

    let no_price = ProductRef::try_from(payload(json!({"id": 1, "name": "x"})));
    assert!(matches!(no_price, Err(CartError::InvalidArgument(_))));

    let negative = ProductRef::try_from(payload(json!({"id": 1, "name": "x", "price": "-1"})));
    assert!(matches!(negative, Err(CartError::InvalidArgument(_))));
}

#[test]
fn missing_stock_reads_as_out_of_stock() {
    let p = ProductRef::try_from(payload(json!({
        "id": 1, "name": "x", "price": "1.00", "seller_id": 2, "artisan": "Ana"
    })))
    .unwrap();
    assert_eq!(p.available_quantity, 0);
}

#[test]
fn missing_seller_is_rejected() {
    let no_seller = ProductRef::try_from(payload(json!({"id": 1, "name": "x", "price": "1.00"})));
    assert!(matches!(no_seller, Err(CartError::InvalidArgument(_))));

    let name_only = ProductRef::try_from(payload(json!({
        "id": 1, "name": "x", "price": "1.00", "artisan": "Ana"
    })));
    assert!(matches!(name_only, Err(CartError::InvalidArgument(_))));

    let id_only = ProductRef::try_from(payload(json!({
        "id": 1, "name": "x", "price": "1.00", "seller": {"id": 4}
    })));
    assert!(matches!(id_only, Err(CartError::InvalidArgument(_))));
}

#[test]
fn cart_response_accepts_flat_and_wrapped_bodies() {
    let row = json!({
        "id": "guest-00000000000000aa",
        "product_id": 1,
        "name": "Mug",
        "price": "9.00",
        "quantity": 1,
        "seller": {"id": 1, "name": "Ana"},
        "max_quantity": 3
    });

    let flat: CartResponse = serde_json::from_value(json!({ "items": [row.clone()] })).unwrap();
    let wrapped: CartResponse =
        serde_json::from_value(json!({ "data": { "items": [row] } })).unwrap();

    let flat = flat.into_items();
    assert_eq!(flat, wrapped.into_items());
    assert_eq!(flat[0].primary_image, None);
    assert_eq!(flat[0].line_total(), dec("9"));
}

#[test]
fn cart_item_serialises_max_quantity_under_its_own_name() {
    let item: CartItem = serde_json::from_value(json!({
        "id": 5,
        "product_id": 1,
        "name": "Mug",
        "price": 9.5,
        "quantity": 2,
        "seller": {"id": 1, "name": "Ana"},
        "stock_quantity": 3
    }))
    .unwrap();

    let value = serde_json::to_value(&item).unwrap();
    assert_eq!(value["max_quantity"], 3);
    assert_eq!(value["id"], "5");
    assert_eq!(item.line_total(), dec("19.0"));
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

#[test]
fn totals_reject_overflowing_and_negative_rows() {
    let huge = item(1, &Decimal::MAX.to_string(), 2, 5);
    assert_eq!(huge.checked_line_total(), None);
    assert_eq!(huge.line_total(), Decimal::MAX);
    assert_eq!(CartTotals::of(&[huge.clone()]).total_amount, Decimal::MAX);
    assert!(matches!(
        CartTotals::checked(&[huge]),
        Err(CartError::InvalidArgument(_))
    ));

    let negative = item(2, "-1.00", 1, 5);
    assert!(matches!(
        CartTotals::checked(&[negative]),
        Err(CartError::InvalidArgument(_))
    ));

    let ok = CartTotals::checked(&[item(1, "2.50", 2, 5), item(2, "1.00", 3, 5)]).unwrap();
    assert_eq!(ok.total_items, 5);
    assert_eq!(ok.total_amount, dec("8.00"));
}
