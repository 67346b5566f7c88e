//! Stop signal shared by the listener and the visitor sweeper.
//!
//! The signal handler triggers it once; `HttpServer::run` and the sweeper each
//! hold a receiver. The notification worker is not a subscriber: it stops when
//! the last `Dispatcher` handle is dropped.

use tokio::sync::broadcast;

/// Cloneable handle to the stop signal.
///
/// A receiver created after `trigger` never sees the signal, so subscribe
/// before spawning the task that waits on it.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the signal. A no-op when nothing is subscribed.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Number of tasks still listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
