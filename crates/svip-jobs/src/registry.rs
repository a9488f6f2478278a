use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::job::{Job, JobErrorEntry, JobResultEntry, JobStatus};

/// Concurrency-safe collection of every job submitted during the process
/// lifetime, keyed by job identifier.
///
/// Cloning the registry clones the handle, not the map: the submit handler,
/// the status handler, and every batch-processor task share one underlying
/// map behind one lock. The lock is held only for the duration of a map or
/// field mutation — never across a network fetch or the simulated delay.
///
/// Entries are never removed; job state is cleared only by process restart.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<Mutex<HashMap<String, Job>>>,
}

impl JobRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh `Ongoing` job under `job_id`.
    ///
    /// Returns `false` (leaving the existing entry untouched) if the id is
    /// already taken; ids are uuid-derived so this is never expected.
    pub async fn create(&self, job_id: &str) -> bool {
        let mut jobs = self.jobs.lock().await;
        if jobs.contains_key(job_id) {
            return false;
        }
        jobs.insert(job_id.to_owned(), Job::new());
        true
    }

    /// Clone the current state of a job for a status query.
    pub async fn snapshot(&self, job_id: &str) -> Option<Job> {
        self.jobs.lock().await.get(job_id).cloned()
    }

    /// Append one per-image result to an `Ongoing` job.
    ///
    /// No-op on a terminal or unknown job: `results` is frozen once the
    /// status leaves `Ongoing`.
    pub async fn append_result(&self, job_id: &str, entry: JobResultEntry) {
        let mut jobs = self.jobs.lock().await;
        if let Some(job) = jobs.get_mut(job_id) {
            if job.status == JobStatus::Ongoing {
                job.results.push(entry);
            }
        }
    }

    /// Transition an `Ongoing` job to `Completed`.
    pub async fn complete(&self, job_id: &str) {
        let mut jobs = self.jobs.lock().await;
        if let Some(job) = jobs.get_mut(job_id) {
            if job.status == JobStatus::Ongoing {
                job.status = JobStatus::Completed;
            }
        }
    }

    /// Transition an `Ongoing` job to `Failed`, recording the error entry.
    pub async fn fail(&self, job_id: &str, entry: JobErrorEntry) {
        let mut jobs = self.jobs.lock().await;
        if let Some(job) = jobs.get_mut(job_id) {
            if job.status == JobStatus::Ongoing {
                job.status = JobStatus::Failed;
                job.errors.push(entry);
            }
        }
    }

    /// Number of registered jobs, for diagnostics.
    pub async fn job_count(&self) -> usize {
        self.jobs.lock().await.len()
    }
}
