//! Connection Module
//!
//! Per-connection reader and worker tasks. The server module wires these
//! together with the shared dispatch queue; see [`handler`] for the data
//! flow and ordering guarantees.

pub mod handler;

// Re-export commonly used types
pub use handler::{read_loop, write_loop, ConnectionError, Job, JOB_QUEUE_CAPACITY};
