//! # TetraKV - A Concurrent In-Memory Key-Value Store
//!
//! TetraKV is a network-addressable, in-memory key-value store speaking a
//! Redis-style textual wire protocol. Clients open a persistent TCP
//! connection, send commands as arrays of bulk strings, and receive typed
//! replies.
//!
//! The name comes from the data model: four independent typed namespaces
//! (string, list, set, hash), each keyed by string.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                             TetraKV                              │
//! │                                                                  │
//! │  ┌──────────┐   ┌─────────────┐   ┌──────────────────────┐       │
//! │  │ Listener │──>│ reader task │──>│ shared bounded queue │       │
//! │  └──────────┘   │ per conn    │   └──────────┬───────────┘       │
//! │                 │ (codec)     │              │                   │
//! │                 └─────────────┘              ▼                   │
//! │                                       ┌────────────┐             │
//! │                                       │ dispatcher │             │
//! │                                       └──────┬─────┘             │
//! │                                              │ per-conn FIFO     │
//! │                 ┌─────────────┐       ┌──────▼─────┐             │
//! │                 │    Store    │<──────│ worker per │             │
//! │                 │ 4 namespaces│       │ connection │             │
//! │                 └─────────────┘       └────────────┘             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands from one connection execute and reply in the order they were
//! sent; different connections run concurrently against the shared,
//! lock-guarded store.
//!
//! ## Module Overview
//!
//! - [`protocol`]: incremental request decoder and typed reply encoding
//! - [`storage`]: the four-namespace store and its concurrency guard
//! - [`commands`]: typed command records, validation, and the router
//! - [`connection`]: per-connection reader and worker tasks
//! - [`server`]: listener, dispatch queue, and graceful shutdown
//!
//! ## A Note on Case Folding
//!
//! Every decoded argument is folded to lowercase, stored values included.
//! `SET foo Bar` stores `bar`. This is historical, externally observable
//! behavior and is preserved on purpose.

pub mod commands;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::{Command, CommandError, Router};
pub use protocol::{ProtocolError, Reply};
pub use server::Server;
pub use storage::Store;

/// The default port TetraKV listens on
pub const DEFAULT_PORT: u16 = 6969;

/// The default host TetraKV binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of TetraKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
