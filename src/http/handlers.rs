//! Request handlers.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Method, Request},
    Json,
};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use crate::http::response::{ApiError, LoginResponse};
use crate::http::server::AppState;
use crate::notify::{Dispatcher, LoginSummary};
use crate::observability::metrics;
use crate::security::{redact_in_place, resolve_client_ip};
use crate::storage::{new_record_id, utc_timestamp, AppendLog, ConnectionRecord, LogError};

/// Liveness check.
pub async fn health_handler() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Ingest one login event.
///
/// Steps run in order and stop at the first failure: method check, caller
/// address, admission, body decode, redaction, enrichment, append. The
/// notification is queued only after the record is durable, and the append
/// and notification outlive a dropped request.
pub async fn login_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Json<LoginResponse>, ApiError> {
    let start = Instant::now();
    let result = ingest(&state, request).await;

    let status = match &result {
        Ok(_) => 200,
        Err(e) => e.status().as_u16(),
    };
    metrics::record_request("/login", status, start);
    result
}

async fn ingest(state: &AppState, request: Request<Body>) -> Result<Json<LoginResponse>, ApiError> {
    if *request.method() != Method::POST {
        return Err(ApiError::MethodNotAllowed);
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = resolve_client_ip(request.headers(), peer);

    let admission = state.limiter.admit(&ip);
    if !admission.allowed {
        let retry_after_secs = admission.retry_after_secs();
        tracing::warn!(client = %ip, retry_after_secs, "Rate limit exceeded");
        metrics::record_rate_limited();
        return Err(ApiError::RateLimited { retry_after_secs });
    }

    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let bytes = axum::body::to_bytes(request.into_body(), state.max_body_bytes)
        .await
        .map_err(|e| {
            tracing::debug!(client = %ip, error = %e, "Rejected request body");
            ApiError::InvalidJson
        })?;
    let mut client: Value = serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!(client = %ip, error = %e, "Malformed JSON body");
        ApiError::InvalidJson
    })?;
    if !client.is_object() {
        return Err(ApiError::InvalidJson);
    }

    redact_in_place(&mut client);

    let id = new_record_id();
    let timestamp = utc_timestamp();
    let summary = LoginSummary::from_payload(&client, &ip, &timestamp);

    let record = ConnectionRecord {
        id: id.clone(),
        timestamp: timestamp.clone(),
        ip,
        path,
        method,
        client,
    };

    spawn_commit(
        state.log.clone(),
        state.dispatcher.clone(),
        record,
        summary.compose(),
    )
    .await
    .map_err(LogError::Task)??;

    tracing::debug!(id = %id, "Connection record appended");

    Ok(Json(LoginResponse {
        status: "ok",
        id,
        timestamp,
    }))
}

/// Append `record`, then queue `message`, on a task of its own.
///
/// Dropping the returned handle does not cancel the task.
pub fn spawn_commit(
    log: AppendLog,
    dispatcher: Dispatcher,
    record: ConnectionRecord,
    message: String,
) -> JoinHandle<Result<(), LogError>> {
    tokio::spawn(async move {
        let appended = log.append_async(record).await;
        metrics::record_log_append(appended.is_ok());
        appended?;
        dispatcher.notify(message);
        Ok(())
    })
}
