//! Batch submission endpoint.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::api::{ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: String,
}

/// `POST /api/submit` — accept a batch of visits and start processing it.
///
/// The body must be `{count, visits: [..]}` with `count` equal to the number
/// of visits; anything else is rejected before a job exists. The elements of
/// `visits` are deliberately NOT validated here — visit-shape problems are
/// asynchronous job failures observed via the status endpoint, not
/// submit-time rejections.
///
/// On success the job is registered as ongoing, the batch processor is
/// launched on its own task, and the job id is returned immediately —
/// processing continues after this response is sent.
pub async fn submit_batch(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<Value>,
) -> Response {
    let visits = match validate_submit_body(&body) {
        Ok(visits) => visits,
        Err(reason) => {
            return ApiError::new(req_id.0, "validation_error", reason).into_response();
        }
    };

    let job_id = format!("job_{}", Uuid::new_v4().simple());
    state.registry.create(&job_id).await;

    // Fire-and-forget: the handle is returned by spawn but the request
    // cycle does not wait on it.
    let _task = state.processor.spawn(job_id.clone(), visits);

    tracing::info!(%job_id, "batch submitted");

    (StatusCode::CREATED, Json(SubmitResponse { job_id })).into_response()
}

/// Check the submit body shape and pull out the visit objects.
///
/// Returns the reason string for the client error when the body is not an
/// object, `count`/`visits` are missing or ill-typed, or the declared count
/// does not match the number of visits supplied.
fn validate_submit_body(body: &Value) -> Result<Vec<Value>, String> {
    let count = body
        .get("count")
        .and_then(Value::as_u64)
        .ok_or_else(|| "count missing or not a non-negative integer".to_string())?;

    let visits = body
        .get("visits")
        .and_then(Value::as_array)
        .ok_or_else(|| "visits missing or not an array".to_string())?;

    if count != visits.len() as u64 {
        return Err(format!(
            "count ({count}) does not match number of visits ({})",
            visits.len()
        ));
    }

    Ok(visits.clone())
}
