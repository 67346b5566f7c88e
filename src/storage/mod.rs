//! Persistence subsystem.
//!
//! # Data Flow
//! ```text
//! redacted payload + server metadata
//!     → record.rs (ConnectionRecord, id, timestamp)
//!     → log_writer.rs (one JSON line per record, serialized appends)
//!     → logs.jsonl
//! ```
//!
//! # Design Decisions
//! - Append-only: no rotation, compaction or reads
//! - Each append is flushed before the call returns
//! - Appends run on the blocking pool, never on async workers

pub mod log_writer;
pub mod record;

pub use log_writer::{AppendLog, LogError};
pub use record::{new_record_id, utc_timestamp, ConnectionRecord};
