use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// Cart endpoints
pub const CART_PATH: &str = "/cart";
pub const CART_ADD_PATH: &str = "/cart/add";
pub const CART_REMOVE_PATH: &str = "/cart/remove";
pub const CART_UPDATE_PATH: &str = "/cart/update";
pub const CART_CLEAR_PATH: &str = "/cart/clear";
pub const CART_TRANSFER_PATH: &str = "/cart/transfer";

// Notification endpoints
pub const UNREAD_COUNT_PATH: &str = "/notifications/unread-count";
pub const READ_ALL_PATH: &str = "/notifications/read-all";

pub fn mark_read_path(notification_id: u64) -> String {
    format!("/notifications/{}/read", notification_id)
}

/// Storage slot holding the serialized guest cart item array.
pub const GUEST_CART_SLOT: &str = "guest_cart";
/// Storage slot holding the last-known total item count.
pub const CART_COUNT_SLOT: &str = "cart_count";

/// Prefix for client-generated guest item ids.
pub const GUEST_ID_PREFIX: &str = "guest-";

pub fn default_storage_dir() -> PathBuf {
    if let Some(data) = dirs::data_local_dir() {
        data.join("artisan-cart")
    } else {
        PathBuf::from(".artisan-cart")
    }
}
