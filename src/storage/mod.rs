//! Storage Module
//!
//! The in-memory data store: four independent typed namespaces (string,
//! list, set, hash) behind per-namespace locks. See [`store`] for the
//! concurrency model and operation semantics.
//!
//! ## Example
//!
//! ```
//! use tetrakv::storage::Store;
//!
//! let store = Store::new();
//! store.rpush("queue", &["a".to_string(), "b".to_string()]);
//! assert_eq!(store.lpop("queue"), Some("a".to_string()));
//! ```

pub mod store;

// Re-export commonly used types
pub use store::{Store, StoreError};
