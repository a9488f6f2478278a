use serde::{Deserialize, Serialize};

/// Lifecycle of one submitted batch.
///
/// `Ongoing` is the initial state; `Completed` and `Failed` are terminal and
/// sticky — there is no transition out of either, and no cancelled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Ongoing,
    Completed,
    Failed,
}

/// One structured failure entry recorded when a batch fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobErrorEntry {
    pub store_id: String,
    pub error: String,
}

/// One per-image outcome entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResultEntry {
    pub store_id: String,
    pub store_name: String,
    pub area_code: String,
    /// The submitted visit timestamp, passed through unmodified.
    pub visit_time: serde_json::Value,
    pub image_url: String,
    pub perimeter: u64,
}

/// The tracked unit of asynchronous work for one batch.
///
/// `results` grows append-only while the job is `Ongoing` and is frozen once
/// the status turns terminal. `errors` holds at most one entry in practice:
/// processing halts at the first failure. Both sequences are omitted from
/// serialized output while empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JobErrorEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<JobResultEntry>,
}

impl Job {
    /// A freshly submitted job: ongoing, nothing accumulated.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: JobStatus::Ongoing,
            errors: Vec::new(),
            results: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, JobStatus::Completed | JobStatus::Failed)
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}
