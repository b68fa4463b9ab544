//! Command Processing Module
//!
//! This module turns decoded argument lists into typed commands and executes
//! them against the store:
//!
//! ```text
//! Client request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  protocol codec │
//! └────────┬────────┘
//!          │ Vec<String>
//!          ▼
//! ┌─────────────────┐
//! │ Command::parse  │   arity / type validation
//! └────────┬────────┘
//!          │ Command
//!          ▼
//! ┌─────────────────┐
//! │     Router      │   one store operation per command
//! └────────┬────────┘
//!          │ Reply
//!          ▼
//! ```
//!
//! ## Supported Commands
//!
//! - Strings: `SET`, `GET`, `DEL`, `EXISTS`
//! - Lists: `LPUSH`, `RPUSH`, `LPOP`, `RPOP`, `LRANGE`
//! - Sets: `SADD`, `SREM`, `SMEMBERS`, `SISMEMBER`
//! - Hashes: `HSET`, `HGET`, `HDEL`
//! - Server: `PING`, `COMMAND`
//!
//! `FLUSHALL`, `FLUSHDB`, `TTL` and `EXPIRE` are recognized but answer an
//! explicit "not implemented" error.

pub mod command;
pub mod router;

// Re-export the command types and router
pub use command::{Command, CommandError};
pub use router::Router;
