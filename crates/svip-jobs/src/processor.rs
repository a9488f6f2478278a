use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;

use svip_core::StoreDirectory;
use svip_inspector::ImageInspector;

use crate::error::BatchError;
use crate::job::{JobErrorEntry, JobResultEntry};
use crate::registry::JobRegistry;

/// Orchestrates the processing of one submitted batch against one job
/// record: per-visit validation, per-image inspection, result accumulation,
/// and the terminal status transition.
///
/// Visits arrive as raw JSON objects; their shape is validated here, not at
/// submit time, so a malformed visit surfaces as an asynchronous job failure
/// observed via the status endpoint.
#[derive(Clone)]
pub struct BatchProcessor {
    registry: JobRegistry,
    directory: Arc<StoreDirectory>,
    inspector: Arc<ImageInspector>,
}

impl BatchProcessor {
    #[must_use]
    pub fn new(
        registry: JobRegistry,
        directory: Arc<StoreDirectory>,
        inspector: Arc<ImageInspector>,
    ) -> Self {
        Self {
            registry,
            directory,
            inspector,
        }
    }

    /// Launch the processing of one batch on its own task.
    ///
    /// The caller gets the `JoinHandle` back but is free to drop it; the
    /// task runs to its terminal status regardless.
    pub fn spawn(&self, job_id: String, visits: Vec<Value>) -> JoinHandle<()> {
        let processor = self.clone();
        tokio::spawn(async move {
            processor.process(&job_id, visits).await;
        })
    }

    /// Process every visit of a batch, in input order, and transition the
    /// job to `completed` or `failed`.
    ///
    /// Stops at the first validation, fetch, or decode failure: the job is
    /// failed with that single error entry and no further visit or image is
    /// attempted. Results already appended stay as they are.
    pub async fn process(&self, job_id: &str, visits: Vec<Value>) {
        match self.run(job_id, &visits).await {
            Ok(()) => {
                self.registry.complete(job_id).await;
                tracing::info!(job_id, visits = visits.len(), "batch completed");
            }
            Err(err) => {
                tracing::warn!(job_id, error = %err, "batch failed");
                self.registry
                    .fail(
                        job_id,
                        JobErrorEntry {
                            store_id: err.store_id().to_owned(),
                            error: err.to_string(),
                        },
                    )
                    .await;
            }
        }
    }

    async fn run(&self, job_id: &str, visits: &[Value]) -> Result<(), BatchError> {
        for visit in visits {
            let store_id = require_store_id(visit)?;

            let store =
                self.directory
                    .lookup(store_id)
                    .ok_or_else(|| BatchError::UnknownStore {
                        store_id: store_id.to_owned(),
                    })?;

            let image_urls = require_image_urls(visit, store_id)?;
            let visit_time = visit.get("visit_time").cloned().unwrap_or(Value::Null);

            for image_url in image_urls {
                let dimensions = self.inspector.inspect(image_url).await.map_err(|source| {
                    BatchError::Inspector {
                        store_id: store_id.to_owned(),
                        source,
                    }
                })?;

                self.registry
                    .append_result(
                        job_id,
                        JobResultEntry {
                            store_id: store_id.to_owned(),
                            store_name: store.store_name.clone(),
                            area_code: store.area_code.clone(),
                            visit_time: visit_time.clone(),
                            image_url: image_url.to_owned(),
                            perimeter: dimensions.perimeter,
                        },
                    )
                    .await;
            }
        }

        Ok(())
    }
}

/// Extract a well-formed `store_id` from a raw visit object.
fn require_store_id(visit: &Value) -> Result<&str, BatchError> {
    visit
        .get("store_id")
        .and_then(Value::as_str)
        .ok_or_else(|| BatchError::MalformedVisit {
            store_id: String::new(),
            reason: "store_id missing or not a string".to_string(),
        })
}

/// Extract a well-formed `image_url` string array from a raw visit object.
///
/// An empty array is accepted and simply contributes no results.
fn require_image_urls<'a>(visit: &'a Value, store_id: &str) -> Result<Vec<&'a str>, BatchError> {
    let malformed = || BatchError::MalformedVisit {
        store_id: store_id.to_owned(),
        reason: "image_url missing or not an array of strings".to_string(),
    };

    let urls = visit
        .get("image_url")
        .and_then(Value::as_array)
        .ok_or_else(malformed)?;

    urls.iter()
        .map(|url| url.as_str().ok_or_else(malformed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn require_store_id_accepts_string() {
        let visit = json!({"store_id": "S1"});
        assert_eq!(require_store_id(&visit).expect("valid"), "S1");
    }

    #[test]
    fn require_store_id_rejects_missing_and_non_string() {
        for visit in [json!({}), json!({"store_id": 42}), json!({"store_id": null})] {
            let err = require_store_id(&visit).expect_err("malformed store_id");
            assert!(
                matches!(err, BatchError::MalformedVisit { ref store_id, .. } if store_id.is_empty()),
                "expected MalformedVisit with empty store_id, got: {err:?}"
            );
        }
    }

    #[test]
    fn require_image_urls_accepts_string_array() {
        let visit = json!({"image_url": ["http://x/a.png", "http://x/b.png"]});
        let urls = require_image_urls(&visit, "S1").expect("valid");
        assert_eq!(urls, vec!["http://x/a.png", "http://x/b.png"]);
    }

    #[test]
    fn require_image_urls_accepts_empty_array() {
        let visit = json!({"image_url": []});
        assert!(require_image_urls(&visit, "S1").expect("valid").is_empty());
    }

    #[test]
    fn require_image_urls_rejects_missing_or_mixed() {
        for visit in [
            json!({}),
            json!({"image_url": "http://x/a.png"}),
            json!({"image_url": ["http://x/a.png", 7]}),
        ] {
            let err = require_image_urls(&visit, "S1").expect_err("malformed image_url");
            assert!(
                matches!(err, BatchError::MalformedVisit { ref store_id, .. } if store_id == "S1"),
                "expected MalformedVisit attributed to S1, got: {err:?}"
            );
        }
    }
}
