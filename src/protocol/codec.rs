//! Incremental Request Decoder
//!
//! This module turns raw bytes into commands. A request is an array of bulk
//! strings:
//!
//! ```text
//! *<count>\r\n
//! $<length>\r\n<payload>\r\n     (repeated <count> times)
//! ```
//!
//! The decoder is incremental. TCP is a stream protocol, so a single read may
//! hold half a command, one command, or several commands back to back. Each
//! call to [`decode`] returns either:
//!
//! - `Ok(Some((args, consumed)))` - one complete command; `consumed` bytes
//!   were used and should be dropped from the front of the buffer
//! - `Ok(None)` - the buffer does not yet hold a complete command
//! - `Err(ProtocolError)` - the bytes at the front of the buffer are not a
//!   valid request
//!
//! The caller appends network data to its buffer, calls [`decode`] in a loop
//! until it returns `Ok(None)`, and advances the buffer by `consumed` after
//! each success.
//!
//! ## Case folding
//!
//! Every decoded argument is folded to lowercase, values included. `SET foo
//! Bar` stores `bar`, not `Bar`. This matches the server's historical
//! behavior and is externally observable, so it is kept as is.
//!
//! ## Bulk terminators
//!
//! The two bytes after each bulk payload are consumed without being checked
//! against `\r\n`. Any two trailing bytes are accepted.
//!
//! ## Limits
//!
//! Length fields come from the wire and are never trusted. A request
//! announcing more than [`MAX_ARGS`] arguments or a bulk payload longer
//! than [`MAX_BULK_LEN`] is rejected as malformed before anything is
//! allocated or indexed.

use thiserror::Error;

/// Longest allowed `*<count>\r\n` or `$<length>\r\n` header line. A buffer
/// that grows past this without a CRLF is not going to become valid.
pub const MAX_LINE_LEN: usize = 64;

/// Most arguments one request may announce.
pub const MAX_ARGS: usize = 1024;

/// Longest single bulk payload, matching the connection read buffer cap.
pub const MAX_BULK_LEN: usize = 64 * 1024;

/// Errors produced while decoding a request.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProtocolError {
    /// Framing or parsing failure. The message names what went wrong and,
    /// for bulk strings, the 1-based index of the offending argument.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// A well-formed array header announcing zero arguments.
    #[error("empty command")]
    EmptyCommand,
}

/// Attempts to decode one command from the front of `buf`.
///
/// Returns the decoded arguments (lowercased) and the number of bytes
/// consumed, `None` if the buffer is incomplete, or an error if the bytes
/// cannot form a valid request.
pub fn decode(buf: &[u8]) -> Result<Option<(Vec<String>, usize)>, ProtocolError> {
    if buf.is_empty() {
        return Ok(None);
    }

    if buf[0] != b'*' {
        return Err(ProtocolError::MalformedRequest(
            "missing array marker".to_string(),
        ));
    }

    let (count_line, mut pos) = match read_line(buf, 1)? {
        Some(line) => line,
        None => return Ok(None),
    };

    let count = parse_length(count_line)
        .ok_or_else(|| ProtocolError::MalformedRequest("invalid array length".to_string()))?;

    if count == 0 {
        return Err(ProtocolError::EmptyCommand);
    }

    if count > MAX_ARGS {
        return Err(ProtocolError::MalformedRequest(
            "array length too large".to_string(),
        ));
    }

    let mut args = Vec::with_capacity(count);

    for index in 1..=count {
        if pos >= buf.len() {
            return Ok(None);
        }

        if buf[pos] != b'$' {
            return Err(ProtocolError::MalformedRequest(format!(
                "invalid bulk header for argument {}",
                index
            )));
        }

        let (length_line, data_start) = match read_line(buf, pos + 1)? {
            Some(line) => line,
            None => return Ok(None),
        };

        let length = parse_length(length_line).ok_or_else(|| {
            ProtocolError::MalformedRequest(format!("invalid bulk length for argument {}", index))
        })?;

        if length > MAX_BULK_LEN {
            return Err(ProtocolError::MalformedRequest(format!(
                "bulk length too large for argument {}",
                index
            )));
        }

        // Payload plus the 2-byte terminator must be present in full.
        let data_end = data_start + length;
        if buf.len() < data_end + 2 {
            return Ok(None);
        }

        let payload = String::from_utf8_lossy(&buf[data_start..data_end]);
        args.push(payload.to_lowercase());

        // Terminator bytes are discarded without validation.
        pos = data_end + 2;
    }

    Ok(Some((args, pos)))
}

/// Finds the line starting at `start` and ending at the next CRLF.
///
/// Returns the line contents (without CRLF) and the offset just past the
/// CRLF. `Ok(None)` means no CRLF yet; a line longer than [`MAX_LINE_LEN`]
/// is rejected outright.
fn read_line(buf: &[u8], start: usize) -> Result<Option<(&[u8], usize)>, ProtocolError> {
    let mut i = start;
    while i + 1 < buf.len() {
        if buf[i] == b'\r' && buf[i + 1] == b'\n' {
            return Ok(Some((&buf[start..i], i + 2)));
        }
        if i - start >= MAX_LINE_LEN {
            return Err(ProtocolError::MalformedRequest(
                "header line too long".to_string(),
            ));
        }
        i += 1;
    }

    if buf.len() - start > MAX_LINE_LEN {
        return Err(ProtocolError::MalformedRequest(
            "header line too long".to_string(),
        ));
    }

    Ok(None)
}

/// Parses a non-negative length field.
fn parse_length(line: &[u8]) -> Option<usize> {
    std::str::from_utf8(line).ok()?.parse::<usize>().ok()
}
