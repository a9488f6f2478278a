use thiserror::Error;

/// Errors raised while loading configuration or the store master file.
///
/// All variants are fatal at startup: the server refuses to serve without a
/// complete configuration and a parseable store directory.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read store master file {path}: {source}")]
    StoreFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse store master file: {0}")]
    StoreFileParse(#[from] serde_json::Error),

    #[error("store master validation failed: {0}")]
    Validation(String),
}
