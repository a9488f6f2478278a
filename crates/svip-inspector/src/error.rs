use thiserror::Error;

#[derive(Debug, Error)]
pub enum InspectorError {
    #[error("HTTP error fetching image: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to fetch image: unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("unable to calculate image dimensions for {url}")]
    Decode { url: String },
}
