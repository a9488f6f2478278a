pub mod error;
pub mod job;
pub mod processor;
pub mod registry;

pub use error::BatchError;
pub use job::{Job, JobErrorEntry, JobResultEntry, JobStatus};
pub use processor::BatchProcessor;
pub use registry::JobRegistry;
