//! Connection Tasks
//!
//! Each accepted connection is handled by two tasks:
//!
//! ```text
//!          socket read half                    socket write half
//!                │                                    ▲
//!                ▼                                    │
//!        ┌──────────────┐                      ┌──────────────┐
//!        │  reader task │                      │ worker task  │
//!        │  (framing)   │                      │ (execute +   │
//!        └──────┬───────┘                      │  reply)      │
//!               │ Request events               └──────▲───────┘
//!               ▼                                     │ jobs, FIFO
//!      shared dispatch queue  ──► dispatcher ──► per-connection
//!         (server module)                          sub-queue
//! ```
//!
//! The reader owns the read half and the connection's reassembly buffer. It
//! reads chunks, runs the incremental decoder, and emits one event per
//! complete command onto the shared queue. Frame reassembly has to live
//! here: partial-read state is per connection.
//!
//! The worker owns the write half and drains its sub-queue in order, so the
//! replies for one connection always come back in the order its commands
//! were sent. Workers for different connections run concurrently.
//!
//! A reader that hits EOF or a read error emits a `Disconnected` event and
//! terminates. A worker that fails to write terminates, which closes the
//! connection.

use crate::commands::Router;
use crate::protocol::{codec, encode_error, ProtocolError};
use crate::server::Event;
use bytes::{Buf, BytesMut};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, trace, warn};

/// Initial reassembly buffer capacity.
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Maximum bytes of unconsumed data one connection may buffer (64 KB).
const MAX_BUFFER_SIZE: usize = 64 * 1024;

/// Capacity of each connection's job sub-queue.
pub const JOB_QUEUE_CAPACITY: usize = 32;

/// One unit of work for a connection's worker: either decoded arguments or
/// the decode error to report back.
pub type Job = Result<Vec<String>, ProtocolError>;

/// Errors that end a connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Transport-level read or write failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection buffered too much undecodable data.
    #[error("read buffer limit exceeded")]
    BufferFull,

    /// The dispatch queue is gone; the server is shutting down.
    #[error("dispatch queue closed")]
    QueueClosed,
}

/// Reads from the connection until EOF, error, or shutdown, emitting one
/// event per complete command. Always emits a final `Disconnected`.
pub async fn read_loop(
    id: u64,
    addr: SocketAddr,
    reader: OwnedReadHalf,
    events: mpsc::Sender<Event>,
    shutdown: broadcast::Receiver<()>,
) {
    match run_reader(id, addr, reader, &events, shutdown).await {
        Ok(()) => debug!(client = %addr, id, "reader finished"),
        Err(ConnectionError::QueueClosed) => {
            debug!(client = %addr, id, "reader stopping, dispatch queue closed")
        }
        Err(e) => warn!(client = %addr, id, error = %e, "reader error, closing connection"),
    }

    let _ = events.send(Event::Disconnected { id }).await;
}

async fn run_reader(
    id: u64,
    addr: SocketAddr,
    mut reader: OwnedReadHalf,
    events: &mpsc::Sender<Event>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), ConnectionError> {
    let mut buffer = BytesMut::with_capacity(INITIAL_BUFFER_SIZE);

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                debug!(client = %addr, id, "reader stopping on shutdown signal");
                return Ok(());
            }
            read = reader.read_buf(&mut buffer) => {
                let n = read?;
                if n == 0 {
                    // EOF. Whatever partial data remains will never complete.
                    return Ok(());
                }
                trace!(client = %addr, id, bytes = n, "read data");

                drain_buffer(id, addr, &mut buffer, events).await?;

                if buffer.len() >= MAX_BUFFER_SIZE {
                    return Err(ConnectionError::BufferFull);
                }
            }
        }
    }
}

/// Decodes every complete command currently in the buffer and emits it.
///
/// A decode error is emitted as a job too (the worker turns it into an error
/// reply) and the buffer is cleared: the frame boundary is unknowable after
/// a framing failure, and discarding lets the connection serve the next
/// well-formed request.
async fn drain_buffer(
    id: u64,
    addr: SocketAddr,
    buffer: &mut BytesMut,
    events: &mpsc::Sender<Event>,
) -> Result<(), ConnectionError> {
    loop {
        match codec::decode(buffer) {
            Ok(Some((args, consumed))) => {
                buffer.advance(consumed);
                trace!(client = %addr, id, consumed, remaining = buffer.len(), "decoded command");
                send_job(events, id, Ok(args)).await?;
            }
            Ok(None) => return Ok(()),
            Err(e) => {
                warn!(client = %addr, id, error = %e, "protocol error");
                buffer.clear();
                return send_job(events, id, Err(e)).await;
            }
        }
    }
}

async fn send_job(events: &mpsc::Sender<Event>, id: u64, job: Job) -> Result<(), ConnectionError> {
    events
        .send(Event::Request { id, job })
        .await
        .map_err(|_| ConnectionError::QueueClosed)
}

/// Executes this connection's jobs in FIFO order and writes each reply back.
///
/// Runs until the sub-queue closes (disconnect or shutdown) or a write
/// fails. Dropping the write half on return closes the connection.
pub async fn write_loop(
    id: u64,
    addr: SocketAddr,
    writer: OwnedWriteHalf,
    mut jobs: mpsc::Receiver<Job>,
    router: Router,
) {
    let mut writer = BufWriter::new(writer);

    while let Some(job) = jobs.recv().await {
        let bytes = match job {
            Ok(args) => match router.handle(args) {
                Ok(reply) => reply.encode(),
                Err(e) => {
                    debug!(client = %addr, id, error = %e, "command error");
                    encode_error(&e.to_string())
                }
            },
            Err(e) => encode_error(&e.to_string()),
        };

        if let Err(e) = write_reply(&mut writer, &bytes).await {
            warn!(client = %addr, id, error = %e, "write error, closing connection");
            return;
        }
        trace!(client = %addr, id, bytes = bytes.len(), "sent reply");
    }

    trace!(client = %addr, id, "worker finished");
}

async fn write_reply(writer: &mut BufWriter<OwnedWriteHalf>, bytes: &[u8]) -> std::io::Result<()> {
    writer.write_all(bytes).await?;
    writer.flush().await
}
