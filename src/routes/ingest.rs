use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::state::SharedState;
use crate::submission::parser;

/// Run the pipeline for one notification posted to the local trigger.
pub async fn ingest(State(state): State<SharedState>, body: Bytes) -> Response {
    let invocation_id = Uuid::now_v7();

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Invalid JSON: {e}") })),
            )
                .into_response();
        }
    };

    let submission = match parser::from_payload(payload) {
        Ok(submission) => submission,
        Err(e) => {
            tracing::warn!(%invocation_id, "Rejected notification: {e}");
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
                .into_response();
        }
    };

    let report = state.pipeline.run(&submission).await;

    let mut body = report.to_json();
    body["invocation_id"] = json!(invocation_id);

    let status = if report.is_success() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };

    (status, Json(body)).into_response()
}
