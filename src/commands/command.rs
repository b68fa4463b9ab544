//! Command Records and Parsing
//!
//! A [`Command`] is the transient, typed form of one parsed request. Parsing
//! validates arity up front so the router and store only ever see
//! well-formed commands.
//!
//! Commands the server recognizes but does not support (`flushall`,
//! `flushdb`, `ttl`, `expire`) parse into an explicit
//! [`CommandError::NotImplemented`] rather than silently succeeding, so a
//! client can always tell the difference.

use crate::storage::StoreError;
use thiserror::Error;

/// Errors produced while parsing or executing a command.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandError {
    /// Wrong argument count for a known command.
    #[error("wrong number of arguments for '{0}' command")]
    Arity(String),

    /// Command name the server does not recognize at all.
    #[error("unknown command '{0}'")]
    Unknown(String),

    /// Recognized but unsupported command.
    #[error("command '{0}' is not implemented")]
    NotImplemented(String),

    /// List range bounds that `lrange` rejects.
    #[error("invalid range: {0}")]
    InvalidRange(String),
}

impl From<StoreError> for CommandError {
    fn from(err: StoreError) -> Self {
        CommandError::InvalidRange(err.to_string())
    }
}

/// One parsed request, ready to execute. Lives only for the duration of a
/// single dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `ping` with an optional message to echo.
    Ping { message: Option<String> },
    /// `command`, sent by redis-cli on connect; answered with a stub.
    CommandList,

    // String namespace
    Set { key: String, value: String },
    Get { key: String },
    Del { key: String },
    Exists { key: String },

    // List namespace
    LPush { key: String, values: Vec<String> },
    RPush { key: String, values: Vec<String> },
    LPop { key: String },
    RPop { key: String },
    LRange { key: String, start: i64, end: i64 },

    // Set namespace
    SAdd { key: String, members: Vec<String> },
    SRem { key: String, members: Vec<String> },
    SMembers { key: String },
    SIsMember { key: String, member: String },

    // Hash namespace
    HSet { key: String, pairs: Vec<(String, String)> },
    HGet { key: String, field: String },
    HDel { key: String, fields: Vec<String> },
}

impl Command {
    /// Parses decoded arguments into a typed command.
    ///
    /// The first argument is the command name; the codec has already folded
    /// everything to lowercase.
    pub fn parse(args: Vec<String>) -> Result<Command, CommandError> {
        let mut args = args.into_iter();
        let name = match args.next() {
            Some(name) => name,
            None => return Err(CommandError::Unknown(String::new())),
        };
        let rest: Vec<String> = args.collect();

        match name.as_str() {
            "ping" => match rest.len() {
                0 => Ok(Command::Ping { message: None }),
                1 => Ok(Command::Ping {
                    message: rest.into_iter().next(),
                }),
                _ => Err(CommandError::Arity(name)),
            },
            "command" => Ok(Command::CommandList),

            "set" => {
                let [key, value] = exactly::<2>(&name, rest)?;
                Ok(Command::Set { key, value })
            }
            "get" => {
                let [key] = exactly::<1>(&name, rest)?;
                Ok(Command::Get { key })
            }
            "del" => {
                let [key] = exactly::<1>(&name, rest)?;
                Ok(Command::Del { key })
            }
            "exists" => {
                let [key] = exactly::<1>(&name, rest)?;
                Ok(Command::Exists { key })
            }

            "lpush" => {
                let (key, values) = key_and_tail(&name, rest)?;
                Ok(Command::LPush { key, values })
            }
            "rpush" => {
                let (key, values) = key_and_tail(&name, rest)?;
                Ok(Command::RPush { key, values })
            }
            "lpop" => {
                let [key] = exactly::<1>(&name, rest)?;
                Ok(Command::LPop { key })
            }
            "rpop" => {
                let [key] = exactly::<1>(&name, rest)?;
                Ok(Command::RPop { key })
            }
            "lrange" => {
                let [key, start, end] = exactly::<3>(&name, rest)?;
                let start = parse_index(&start)?;
                let end = parse_index(&end)?;
                Ok(Command::LRange { key, start, end })
            }

            "sadd" => {
                let (key, members) = key_and_tail(&name, rest)?;
                Ok(Command::SAdd { key, members })
            }
            "srem" => {
                let (key, members) = key_and_tail(&name, rest)?;
                Ok(Command::SRem { key, members })
            }
            "smembers" => {
                let [key] = exactly::<1>(&name, rest)?;
                Ok(Command::SMembers { key })
            }
            "sismember" => {
                let [key, member] = exactly::<2>(&name, rest)?;
                Ok(Command::SIsMember { key, member })
            }

            "hset" => {
                let (key, tail) = key_and_tail(&name, rest)?;
                // Fields and values come in pairs.
                if tail.len() % 2 != 0 {
                    return Err(CommandError::Arity(name));
                }
                let pairs = tail
                    .chunks_exact(2)
                    .map(|pair| (pair[0].clone(), pair[1].clone()))
                    .collect();
                Ok(Command::HSet { key, pairs })
            }
            "hget" => {
                let [key, field] = exactly::<2>(&name, rest)?;
                Ok(Command::HGet { key, field })
            }
            "hdel" => {
                let (key, fields) = key_and_tail(&name, rest)?;
                Ok(Command::HDel { key, fields })
            }

            // Recognized, declared, not implemented. Expiry and flush hooks
            // live here once they exist.
            "flushall" | "flushdb" | "ttl" | "expire" => {
                Err(CommandError::NotImplemented(name))
            }

            _ => Err(CommandError::Unknown(name)),
        }
    }
}

/// Requires exactly `N` arguments.
fn exactly<const N: usize>(name: &str, rest: Vec<String>) -> Result<[String; N], CommandError> {
    <[String; N]>::try_from(rest).map_err(|_| CommandError::Arity(name.to_string()))
}

/// Requires a key plus at least one further argument.
fn key_and_tail(name: &str, rest: Vec<String>) -> Result<(String, Vec<String>), CommandError> {
    if rest.len() < 2 {
        return Err(CommandError::Arity(name.to_string()));
    }
    let mut iter = rest.into_iter();
    let Some(key) = iter.next() else {
        return Err(CommandError::Arity(name.to_string()));
    };
    Ok((key, iter.collect()))
}

fn parse_index(value: &str) -> Result<i64, CommandError> {
    value
        .parse::<i64>()
        .map_err(|_| CommandError::InvalidRange(format!("'{}' is not an integer", value)))
}
