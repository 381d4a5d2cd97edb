use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// UnreadCount — Body of the unread-count endpoint and the badge event
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: u64,
}
