//! Wire Protocol Codec
//!
//! This module implements both directions of the textual wire protocol:
//! requests come in as arrays of bulk strings and are decoded into command
//! arguments, results go out as one of the typed reply forms.
//!
//! The codec is pure: no I/O, no shared state. The connection layer owns the
//! buffers and sockets.
//!
//! ## Modules
//!
//! - `codec`: incremental request decoder
//! - `reply`: the [`Reply`] type and wire encoding
//!
//! ## Example
//!
//! ```
//! use tetrakv::protocol::{codec, Reply};
//!
//! let data = b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n";
//! let (args, consumed) = codec::decode(data).unwrap().unwrap();
//! assert_eq!(args, vec!["get", "name"]);
//! assert_eq!(consumed, data.len());
//!
//! let response = Reply::Bulk("ada".to_string());
//! assert_eq!(response.encode(), b"$3\r\nada\r\n");
//! ```

pub mod codec;
pub mod reply;

// Re-export commonly used types for convenience
pub use codec::{decode, ProtocolError};
pub use reply::{encode_error, Reply};
