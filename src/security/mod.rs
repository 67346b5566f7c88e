//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming /login request:
//!     → client_ip.rs (resolve caller address)
//!     → rate_limit.rs (per-IP fixed-window admission)
//!     → [body decoded by handler]
//!     → redact.rs (strip sensitive fields before persistence)
//! ```
//!
//! # Design Decisions
//! - Admission state lives in an injected `RateLimiter`, not a global
//! - Redaction happens before anything is written or forwarded

pub mod client_ip;
pub mod rate_limit;
pub mod redact;

pub use client_ip::resolve_client_ip;
pub use rate_limit::{Admission, RateLimiter};
pub use redact::{is_sensitive_key, redact, redact_in_place, PLACEHOLDER, SENSITIVE_KEYS};
