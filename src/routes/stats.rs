// Stats ingest and query handlers

use axum::{
    Json,
    extract::{State, rejection::BytesRejection},
};
use bytes::Bytes;
use serde::Serialize;

use super::AppState;
use crate::error::ApiError;
use crate::models::Sample;

#[derive(Debug, Serialize)]
pub(super) struct IngestResponse {
    message: &'static str,
    stored: usize,
}

/// Parse an ingest body into a sample. With `require_timestamp`, the sample
/// must carry a non-empty string `timestamp`.
pub fn parse_sample(body: &[u8], require_timestamp: bool) -> Result<Sample, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::InvalidBody("No JSON body received".into()));
    }
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::InvalidBody(format!("Invalid JSON body: {}", e)))?;
    let sample = Sample::try_from(value)?;
    if require_timestamp && sample.timestamp().is_none() {
        return Err(ApiError::InvalidBody(
            "Invalid data format. Timestamp is required.".into(),
        ));
    }
    Ok(sample)
}

/// POST /stats — validate and append one sample.
pub(super) async fn ingest(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<IngestResponse>, ApiError> {
    let body = body.map_err(ApiError::from).inspect_err(|e| {
        tracing::warn!(error = %e, "rejected stats body");
    })?;
    let sample = parse_sample(&body, state.require_timestamp).inspect_err(|e| {
        tracing::warn!(error = %e, body_len = body.len(), "rejected stats body");
    })?;
    let appended = state.history_repo.append(sample);
    tracing::debug!(
        stored = appended.stored,
        evicted = appended.evicted,
        "stats received"
    );
    Ok(Json(IngestResponse {
        message: "Stats received",
        stored: appended.stored,
    }))
}

/// GET /stats, GET /stats/history — every stored sample in canonical order.
pub(super) async fn query_all(State(state): State<AppState>) -> Json<Vec<Sample>> {
    Json(state.history_repo.all())
}

/// GET /stats/latest — most recent sample, 404 when nothing has been received.
pub(super) async fn query_latest(State(state): State<AppState>) -> Result<Json<Sample>, ApiError> {
    state
        .history_repo
        .latest()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No stats available yet.".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection(body: &str, strict: bool) -> String {
        match parse_sample(body.as_bytes(), strict) {
            Err(ApiError::InvalidBody(m)) => m,
            other => panic!("expected InvalidBody, got {:?}", other),
        }
    }

    #[test]
    fn empty_and_blank_bodies() {
        assert_eq!(rejection("", false), "No JSON body received");
        assert_eq!(rejection(" \n\t", false), "No JSON body received");
    }

    #[test]
    fn malformed_json() {
        assert!(rejection("{\"cpu\":", false).starts_with("Invalid JSON body"));
        assert!(rejection("not json", false).starts_with("Invalid JSON body"));
    }

    #[test]
    fn non_object_and_empty_object() {
        assert!(rejection("{}", false).contains("non-empty JSON object"));
        assert!(rejection("[1,2]", false).contains("non-empty JSON object"));
        assert!(rejection("42", false).contains("non-empty JSON object"));
    }

    #[test]
    fn strict_mode_requires_timestamp() {
        let msg = "Invalid data format. Timestamp is required.";
        assert_eq!(rejection(r#"{"cpu":{"usage":1.0}}"#, true), msg);
        assert_eq!(rejection(r#"{"timestamp":""}"#, true), msg);
        assert_eq!(rejection(r#"{"timestamp":null}"#, true), msg);
        assert!(parse_sample(br#"{"timestamp":"2024-01-01T00:00:00Z"}"#, true).is_ok());
    }

    #[test]
    fn lenient_mode_accepts_any_object() {
        assert!(parse_sample(br#"{"cpu":{"usage":1.0}}"#, false).is_ok());
        assert!(parse_sample(br#"{"timestamp":""}"#, false).is_ok());
    }
}
