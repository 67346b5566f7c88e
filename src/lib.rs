//! Login event logger.
//!
//! Accepts client connection metadata over HTTP, redacts sensitive fields,
//! enriches it with server-observed attributes, appends it to a JSON Lines
//! file and sends best-effort chat notifications.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod notify;
pub mod observability;
pub mod security;
pub mod storage;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
