use svip_inspector::InspectorError;
use thiserror::Error;

/// Reasons a batch halts and its job transitions to `failed`.
///
/// Every variant carries the store id of the offending visit so the job's
/// error entry can reference it; for a malformed `store_id` field the id is
/// whatever string value was recoverable (possibly empty).
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("unknown store_id: {store_id}")]
    UnknownStore { store_id: String },

    #[error("{reason}")]
    MalformedVisit { store_id: String, reason: String },

    #[error("{source}")]
    Inspector {
        store_id: String,
        #[source]
        source: InspectorError,
    },
}

impl BatchError {
    /// The store id the failure is attributed to.
    #[must_use]
    pub fn store_id(&self) -> &str {
        match self {
            Self::UnknownStore { store_id }
            | Self::MalformedVisit { store_id, .. }
            | Self::Inspector { store_id, .. } => store_id,
        }
    }
}
