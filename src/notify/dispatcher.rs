//! Fire-and-forget notification dispatch.
//!
//! Request handlers push messages onto a bounded queue and return at once.
//! A background worker pops each message and fans it out to every target on
//! its own task, so one slow or failing endpoint never holds up another and
//! nothing is tied to the originating request's lifetime.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::NotifyConfig;
use crate::notify::targets::{targets_from_config, NotifyError, Target};
use crate::observability::metrics;

/// Handle used to submit notifications.
#[derive(Clone)]
pub struct Dispatcher {
    tx: Option<mpsc::Sender<String>>,
}

impl Dispatcher {
    /// A dispatcher with no targets; every notification is discarded.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Build targets from config and start the worker.
    ///
    /// Returns a disabled dispatcher and no worker when no target is
    /// configured. Must be called inside a Tokio runtime.
    pub fn spawn(config: &NotifyConfig) -> Result<(Self, Option<JoinHandle<()>>), NotifyError> {
        let targets = targets_from_config(config);
        if targets.is_empty() {
            tracing::info!("No notification targets configured");
            return Ok((Self::disabled(), None));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let (dispatcher, handle) = Self::with_targets(targets, client, config.queue_capacity);
        Ok((dispatcher, Some(handle)))
    }

    /// Start a worker for explicit targets.
    pub fn with_targets(
        targets: Vec<Target>,
        client: reqwest::Client,
        queue_capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));

        tracing::info!(
            targets = ?targets.iter().map(Target::name).collect::<Vec<_>>(),
            queue_capacity,
            "Notification dispatcher started"
        );

        let handle = tokio::spawn(run_worker(rx, Arc::new(targets), client));
        (Self { tx: Some(tx) }, handle)
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Queue `message` for delivery. Never blocks; a full queue drops the
    /// message with a warning.
    pub fn notify(&self, message: String) {
        let Some(tx) = &self.tx else {
            return;
        };

        match tx.try_send(message) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Notification queue full, dropping message");
                metrics::record_notification_dropped();
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Notification worker stopped, dropping message");
                metrics::record_notification_dropped();
            }
        }
    }
}

/// Drain the queue until every `Dispatcher` handle is dropped.
async fn run_worker(
    mut rx: mpsc::Receiver<String>,
    targets: Arc<Vec<Target>>,
    client: reqwest::Client,
) {
    let mut inflight = tokio::task::JoinSet::new();

    while let Some(message) = rx.recv().await {
        let message: Arc<str> = message.into();
        for index in 0..targets.len() {
            let targets = targets.clone();
            let client = client.clone();
            let message = message.clone();
            inflight.spawn(async move {
                deliver(&targets[index], &client, &message).await;
            });
        }
        // Reap finished deliveries so the set does not grow unbounded.
        while inflight.try_join_next().is_some() {}
    }

    while inflight.join_next().await.is_some() {}
    tracing::debug!("Notification worker stopped");
}

async fn deliver(target: &Target, client: &reqwest::Client, message: &str) {
    match target.send(client, message).await {
        Ok(()) => {
            tracing::debug!(endpoint = target.name(), "Notification delivered");
            metrics::record_notification(target.name(), "ok");
        }
        Err(e) => {
            tracing::warn!(endpoint = target.name(), error = %e, "Notification failed");
            metrics::record_notification(target.name(), "error");
        }
    }
}
