//! Reply Types and Wire Encoding
//!
//! A command produces exactly one [`Reply`], which maps onto the wire like
//! this:
//!
//! | Reply          | Wire form                                   |
//! |----------------|---------------------------------------------|
//! | `Pong`         | `+PONG\r\n`                                 |
//! | `Ok`           | `+OK\r\n`                                   |
//! | `Null`         | `$-1\r\n`                                   |
//! | `Integer(n)`   | `:<n>\r\n`                                  |
//! | `Bulk(s)`      | `$<len>\r\n<s>\r\n`                         |
//! | `Multi(items)` | `*<count>\r\n` then each item as a bulk     |
//!
//! The tagged enum keeps stored data and protocol sentinels apart: a stored
//! value that is literally the text `-1` encodes as the bulk string
//! `$2\r\n-1\r\n`, never as the null reply.
//!
//! Error replies are a separate channel entirely, see [`encode_error`].

/// The semantic result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Acknowledgement for `ping` without an argument.
    Pong,
    /// Acknowledgement for successful writes.
    Ok,
    /// Null / not found.
    Null,
    /// A numeric result such as a length or a removal count.
    Integer(i64),
    /// A single stored value.
    Bulk(String),
    /// A multi-value result such as a list slice or set members.
    /// Encodes as `*0\r\n` when empty.
    Multi(Vec<String>),
}

impl Reply {
    /// Encodes this reply into its wire form.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Reply::Pong => b"+PONG\r\n".to_vec(),
            Reply::Ok => b"+OK\r\n".to_vec(),
            Reply::Null => b"$-1\r\n".to_vec(),
            Reply::Integer(n) => format!(":{}\r\n", n).into_bytes(),
            Reply::Bulk(s) => encode_bulk(s),
            Reply::Multi(items) => {
                let mut buf = format!("*{}\r\n", items.len()).into_bytes();
                for item in items {
                    buf.extend_from_slice(&encode_bulk(item));
                }
                buf
            }
        }
    }
}

/// A lookup result maps directly onto bulk-or-null.
impl From<Option<String>> for Reply {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) => Reply::Bulk(s),
            None => Reply::Null,
        }
    }
}

fn encode_bulk(s: &str) -> Vec<u8> {
    format!("${}\r\n{}\r\n", s.len(), s).into_bytes()
}

/// Encodes an error line: `-<message>\r\n`.
///
/// Every request-local failure (framing, arity, unknown command, invalid
/// range) is sent back through this path without touching the connection.
pub fn encode_error(message: &str) -> Vec<u8> {
    format!("-{}\r\n", message).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_acknowledgements() {
        assert_eq!(Reply::Pong.encode(), b"+PONG\r\n");
        assert_eq!(Reply::Ok.encode(), b"+OK\r\n");
    }

    #[test]
    fn encode_null() {
        assert_eq!(Reply::Null.encode(), b"$-1\r\n");
    }

    #[test]
    fn encode_integer() {
        assert_eq!(Reply::Integer(3).encode(), b":3\r\n");
        assert_eq!(Reply::Integer(0).encode(), b":0\r\n");
        assert_eq!(Reply::Integer(-7).encode(), b":-7\r\n");
    }

    #[test]
    fn encode_bulk_string() {
        assert_eq!(Reply::Bulk("hello".to_string()).encode(), b"$5\r\nhello\r\n");
        assert_eq!(Reply::Bulk(String::new()).encode(), b"$0\r\n\r\n");
    }

    #[test]
    fn stored_minus_one_is_not_null() {
        // The tagged type keeps the literal value "-1" apart from absence.
        assert_eq!(Reply::Bulk("-1".to_string()).encode(), b"$2\r\n-1\r\n");
        assert_ne!(Reply::Bulk("-1".to_string()).encode(), Reply::Null.encode());
    }

    #[test]
    fn encode_multi() {
        let reply = Reply::Multi(vec!["b".to_string(), "a".to_string()]);
        assert_eq!(reply.encode(), b"*2\r\n$1\r\nb\r\n$1\r\na\r\n");
    }

    #[test]
    fn encode_empty_multi() {
        assert_eq!(Reply::Multi(Vec::new()).encode(), b"*0\r\n");
    }

    #[test]
    fn encode_error_line() {
        assert_eq!(encode_error("unknown command 'zadd'"), b"-unknown command 'zadd'\r\n");
    }

    #[test]
    fn lookup_result_conversion() {
        assert_eq!(Reply::from(Some("v".to_string())), Reply::Bulk("v".to_string()));
        assert_eq!(Reply::from(None), Reply::Null);
    }
}
