//! Notification subsystem.
//!
//! # Data Flow
//! ```text
//! login handler
//!     → message.rs (summary from redacted payload)
//!     → dispatcher.rs (bounded queue, returns immediately)
//!     → worker task fans out per target
//!     → targets.rs (webhook / bot POST with bounded timeout)
//! ```
//!
//! # Design Decisions
//! - Best effort: one attempt per target, no retries
//! - Failures go to logs and metrics only, never to the caller
//! - Unconfigured targets are simply absent

pub mod dispatcher;
pub mod message;
pub mod targets;

pub use dispatcher::Dispatcher;
pub use message::LoginSummary;
pub use targets::{NotifyError, Target};
