//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the owned service state (limiter, log writer, dispatcher)
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve with graceful shutdown and drain background work

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    http::StatusCode,
    routing::{any, get},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::handlers::{health_handler, login_handler};
use crate::notify::{Dispatcher, NotifyError};
use crate::security::rate_limit::{run_sweeper, RateLimiter};
use crate::storage::AppendLog;

/// Errors raised while building or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to start notification dispatcher: {0}")]
    Notify(#[from] NotifyError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
///
/// Every component is constructed once per server; tests build their own.
#[derive(Clone)]
pub struct AppState {
    pub limiter: RateLimiter,
    pub log: AppendLog,
    pub dispatcher: Dispatcher,
    pub max_body_bytes: usize,
}

/// HTTP server for the API logger.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    limiter: RateLimiter,
    notify_worker: Option<JoinHandle<()>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Starts the notification worker, so it must run inside a Tokio runtime.
    pub fn new(config: AppConfig) -> Result<Self, ServerError> {
        let limiter = RateLimiter::from_config(&config.rate_limit);
        let log = AppendLog::from_config(&config.storage);
        let (dispatcher, notify_worker) = Dispatcher::spawn(&config.notify)?;

        let state = AppState {
            limiter: limiter.clone(),
            log,
            dispatcher,
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            limiter,
            notify_worker,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            // Any method, so the handler can answer 405 before admission.
            .route("/login", any(login_handler))
            .with_state(state)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// A clone of the configured router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            rate_limit = self.limiter.limit(),
            rate_window_secs = self.limiter.window().as_secs(),
            log_path = %self.config.storage.log_path,
            "HTTP server starting"
        );

        let sweeper = tokio::spawn(run_sweeper(
            self.limiter.clone(),
            Duration::from_secs(self.config.rate_limit.sweep_interval_secs),
            shutdown.resubscribe(),
        ));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        let _ = sweeper.await;

        // The router (and its dispatcher handles) is gone, so the worker
        // finishes once queued deliveries complete or time out.
        if let Some(worker) = self.notify_worker {
            let grace = Duration::from_secs(self.config.notify.timeout_secs + 1);
            if tokio::time::timeout(grace, worker).await.is_err() {
                tracing::warn!("Notification worker did not drain before shutdown");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
