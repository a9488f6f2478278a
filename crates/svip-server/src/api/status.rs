//! Job status endpoint.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use svip_jobs::{Job, JobErrorEntry, JobResultEntry, JobStatus};

use crate::api::{ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    jobid: Option<String>,
}

/// Wire shape of a status response.
///
/// `errors` carries the failure entries when the job failed; `results`
/// carries whatever per-image entries have been accumulated so far. Both are
/// omitted while empty.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: JobStatus,
    pub job_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JobErrorEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<JobResultEntry>,
}

impl StatusResponse {
    fn from_job(job_id: String, job: Job) -> Self {
        Self {
            status: job.status,
            job_id,
            errors: job.errors,
            results: job.results,
        }
    }
}

/// `GET /api/status?jobid=...` — report the current state of a job.
///
/// A missing/empty `jobid` is a validation error; an identifier that was
/// never issued is `not_found`. Reads race freely with in-flight batch
/// processors: an ongoing job may show partially accumulated results.
pub async fn job_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<StatusParams>,
) -> Response {
    let Some(job_id) = params.jobid.filter(|id| !id.is_empty()) else {
        return ApiError::new(
            req_id.0,
            "validation_error",
            "missing jobid query parameter",
        )
        .into_response();
    };

    match state.registry.snapshot(&job_id).await {
        Some(job) => Json(StatusResponse::from_job(job_id, job)).into_response(),
        None => ApiError::new(req_id.0, "not_found", format!("unknown job id: {job_id}"))
            .into_response(),
    }
}
