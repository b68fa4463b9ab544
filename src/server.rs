//! Server Core
//!
//! The listener, the shared dispatch queue, and the dispatcher that ties
//! connections to their workers:
//!
//! ```text
//! ┌─────────────┐ accept ┌─────────────┐
//! │ TcpListener │───────>│ reader task │──┐
//! └─────────────┘        └─────────────┘  │ events
//!                        ┌─────────────┐  │
//!                        │ reader task │──┤
//!                        └─────────────┘  ▼
//!                              ┌──────────────────────┐
//!                              │ shared bounded queue │
//!                              └──────────┬───────────┘
//!                                         │ single consumer
//!                                         ▼
//!                                  ┌────────────┐  per-connection
//!                                  │ dispatcher │────sub-queues────► workers
//!                                  └────────────┘
//! ```
//!
//! ## Ordering
//!
//! Commands from one connection execute and reply in the order they were
//! sent. Each reader pushes onto the shared queue in read order, the single
//! dispatcher forwards in arrival order, and each worker drains its
//! sub-queue in order. No ordering is guaranteed across connections; their
//! workers run concurrently.
//!
//! ## Failure policy
//!
//! Accept errors are logged and the loop continues. A connection's failure
//! terminates only that connection. No error propagates far enough to stop
//! the dispatcher or the listener.
//!
//! ## Shutdown
//!
//! [`Server::run`] takes a caller-supplied shutdown future. When it
//! resolves, the server stops accepting, signals every reader to stop,
//! closes the shared queue, lets the dispatcher drain what was already
//! queued, and joins every worker before returning.

use crate::commands::Router;
use crate::connection::{self, Job, JOB_QUEUE_CAPACITY};
use crate::storage::Store;
use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace};

/// Capacity of the shared event queue, sized to absorb bursts across all
/// connections.
pub const DISPATCH_QUEUE_CAPACITY: usize = 100;

/// Everything that flows from the connection tasks to the dispatcher.
#[derive(Debug)]
pub enum Event {
    /// A connection was accepted; `jobs` feeds its worker.
    Connected {
        id: u64,
        addr: SocketAddr,
        jobs: mpsc::Sender<Job>,
        worker: JoinHandle<()>,
    },
    /// One decoded command (or the decode error to report) from `id`.
    Request { id: u64, job: Job },
    /// The reader for `id` terminated.
    Disconnected { id: u64 },
}

/// A bound listener plus the store and router shared by every connection.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    /// Binds the listen address and creates the store that will live for the
    /// process lifetime.
    pub async fn bind(addr: &str) -> io::Result<Server> {
        let listener = TcpListener::bind(addr).await?;
        let store = Arc::new(Store::new());
        Ok(Server {
            listener,
            router: Router::new(store),
        })
    }

    /// Returns the bound address. Useful when binding port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves connections until `shutdown` resolves, then drains and
    /// returns.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> io::Result<()> {
        let (events_tx, events_rx) = mpsc::channel(DISPATCH_QUEUE_CAPACITY);
        let (stop_tx, _) = broadcast::channel(1);

        let dispatcher = tokio::spawn(dispatch_loop(events_rx));

        tokio::select! {
            _ = accept_loop(&self.listener, &self.router, &events_tx, &stop_tx) => {}
            _ = shutdown => {
                info!("shutdown signal received, stopping server");
            }
        }

        // Stop accepting, then signal every reader to stop.
        drop(self.listener);
        let _ = stop_tx.send(());

        // Once the readers drop their queue handles the dispatcher drains
        // the remaining events and joins the workers.
        drop(events_tx);
        if let Err(e) = dispatcher.await {
            error!(error = %e, "dispatcher task failed");
        }

        info!("server shutdown complete");
        Ok(())
    }
}

/// Accepts connections forever. Each one gets a reader task, a worker task,
/// and a bounded sub-queue between dispatcher and worker.
async fn accept_loop(
    listener: &TcpListener,
    router: &Router,
    events: &mpsc::Sender<Event>,
    stop: &broadcast::Sender<()>,
) {
    let mut next_id: u64 = 0;

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let id = next_id;
                next_id += 1;
                info!(client = %addr, id, "accepted connection");

                let (read_half, write_half) = stream.into_split();
                let (jobs_tx, jobs_rx) = mpsc::channel(JOB_QUEUE_CAPACITY);

                let worker = tokio::spawn(connection::write_loop(
                    id,
                    addr,
                    write_half,
                    jobs_rx,
                    router.clone(),
                ));

                // Registration must reach the dispatcher before the first
                // request event, so send it before the reader starts.
                let registered = events
                    .send(Event::Connected {
                        id,
                        addr,
                        jobs: jobs_tx,
                        worker,
                    })
                    .await;
                if registered.is_err() {
                    debug!("dispatcher gone, accept loop stopping");
                    return;
                }

                tokio::spawn(connection::read_loop(
                    id,
                    addr,
                    read_half,
                    events.clone(),
                    stop.subscribe(),
                ));
            }
            Err(e) => {
                // Never fatal; keep serving the other connections.
                error!(error = %e, "failed to accept connection");
            }
        }
    }
}

struct ConnectionEntry {
    jobs: mpsc::Sender<Job>,
    worker: JoinHandle<()>,
}

/// The single consumer of the shared queue. Forwards each request to the
/// originating connection's sub-queue in arrival order.
async fn dispatch_loop(mut events: mpsc::Receiver<Event>) {
    let mut connections: HashMap<u64, ConnectionEntry> = HashMap::new();

    while let Some(event) = events.recv().await {
        match event {
            Event::Connected {
                id,
                addr,
                jobs,
                worker,
            } => {
                trace!(client = %addr, id, "connection registered");
                connections.insert(id, ConnectionEntry { jobs, worker });
            }
            Event::Request { id, job } => {
                let worker_gone = match connections.get(&id) {
                    Some(entry) => entry.jobs.send(job).await.is_err(),
                    None => false,
                };
                if worker_gone {
                    // The worker stopped on a write failure.
                    connections.remove(&id);
                }
            }
            Event::Disconnected { id } => {
                trace!(id, "connection removed");
                // Dropping the sub-queue sender lets the worker drain its
                // remaining jobs and exit.
                connections.remove(&id);
            }
        }
    }

    // Queue closed: the server is shutting down. Close every sub-queue,
    // then wait for the workers to flush their remaining replies.
    let entries: Vec<ConnectionEntry> = connections.into_values().collect();
    let mut workers = Vec::with_capacity(entries.len());
    for ConnectionEntry { jobs, worker } in entries {
        drop(jobs);
        workers.push(worker);
    }
    for worker in workers {
        let _ = worker.await;
    }

    debug!("dispatcher drained and stopped");
}
