//! Command Router
//!
//! The router is the stateless dispatch layer between decoded arguments and
//! the store:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │ Command::parse  │───>│  Router::handle │───>│      Store      │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Arity and type preconditions are checked during parsing, before any state
//! is touched. Execution maps each command onto one store operation and
//! wraps the result in a [`Reply`].

use crate::commands::command::{Command, CommandError};
use crate::protocol::Reply;
use crate::storage::Store;
use std::sync::Arc;

/// Routes parsed commands to the shared store.
///
/// Cheap to clone; every per-connection worker holds one.
#[derive(Debug, Clone)]
pub struct Router {
    store: Arc<Store>,
}

impl Router {
    /// Creates a router over the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Parses and executes one request, producing its reply.
    pub fn handle(&self, args: Vec<String>) -> Result<Reply, CommandError> {
        let command = Command::parse(args)?;
        self.execute(command)
    }

    fn execute(&self, command: Command) -> Result<Reply, CommandError> {
        let reply = match command {
            Command::Ping { message: None } => Reply::Pong,
            Command::Ping { message: Some(m) } => Reply::Bulk(m),
            Command::CommandList => Reply::Bulk("command".to_string()),

            Command::Set { key, value } => {
                self.store.set(&key, value);
                Reply::Ok
            }
            Command::Get { key } => self.store.get(&key).into(),
            Command::Del { key } => Reply::Integer(i64::from(self.store.del(&key))),
            Command::Exists { key } => Reply::Integer(i64::from(self.store.exists(&key))),

            Command::LPush { key, values } => {
                Reply::Integer(self.store.lpush(&key, &values) as i64)
            }
            Command::RPush { key, values } => {
                Reply::Integer(self.store.rpush(&key, &values) as i64)
            }
            Command::LPop { key } => self.store.lpop(&key).into(),
            Command::RPop { key } => self.store.rpop(&key).into(),
            Command::LRange { key, start, end } => {
                Reply::Multi(self.store.lrange(&key, start, end)?)
            }

            Command::SAdd { key, members } => {
                Reply::Integer(self.store.sadd(&key, &members) as i64)
            }
            Command::SRem { key, members } => {
                Reply::Integer(self.store.srem(&key, &members) as i64)
            }
            Command::SMembers { key } => match self.store.smembers(&key) {
                Some(members) => Reply::Multi(members),
                None => Reply::Null,
            },
            Command::SIsMember { key, member } => {
                Reply::Integer(i64::from(self.store.sismember(&key, &member)))
            }

            Command::HSet { key, pairs } => Reply::Integer(self.store.hset(&key, &pairs) as i64),
            Command::HGet { key, field } => self.store.hget(&key, &field).into(),
            Command::HDel { key, fields } => {
                Reply::Integer(self.store.hdel(&key, &fields) as i64)
            }
        };

        Ok(reply)
    }
}
