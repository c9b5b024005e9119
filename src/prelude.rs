//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Reactive container
pub use crate::observable::Observable;
// Subscription handle
pub use crate::subscription::Subscription;
// Element and key types
pub use crate::value::{Key, Value};
// Plain values are serde_json data; `json!` is the natural literal syntax
pub use serde_json::json;
