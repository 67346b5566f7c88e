//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, tracing)
//!     → handlers.rs (/health, /login orchestration)
//!     → response.rs (status codes, JSON bodies, Retry-After)
//!     → Send to client
//! ```

pub mod handlers;
pub mod response;
pub mod server;

pub use response::{ApiError, LoginResponse};
pub use server::{AppState, HttpServer, ServerError};
