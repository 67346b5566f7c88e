//! Persisted connection records and their identifiers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{SecondsFormat, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Builder;

/// One line of the append-only log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub id: String,
    pub timestamp: String,
    pub ip: String,
    pub path: String,
    pub method: String,
    /// Caller payload, already redacted.
    pub client: Value,
}

static FALLBACK_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generate a record ID from OS entropy.
pub fn new_record_id() -> String {
    record_id_from(&mut OsRng)
}

/// Generate a version-4 UUID from `rng`.
///
/// If the entropy source fails the ID degrades to
/// `fallback-<unix-nanos>-<seq>` instead of failing the request.
pub fn record_id_from<R: RngCore>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    match rng.try_fill_bytes(&mut bytes) {
        Ok(()) => Builder::from_random_bytes(bytes)
            .into_uuid()
            .hyphenated()
            .to_string(),
        Err(e) => {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos();
            let seq = FALLBACK_SEQ.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(error = %e, "Entropy source unavailable, using fallback record id");
            format!("fallback-{}-{}", nanos, seq)
        }
    }
}

/// Current UTC time as RFC 3339 with second precision, e.g. `2024-05-01T12:00:00Z`.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
