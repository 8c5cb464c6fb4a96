use thiserror::Error;

#[derive(Error, Debug)]
pub enum DragnetError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("rate limit retries exhausted after {attempts} attempts for {url}")]
    RetriesExhausted { url: String, attempts: u32 },

    #[error("unknown category keyword: {0}")]
    UnknownCategory(String),

    #[error("malformed payload from {url}: {source}")]
    Parse {
        url: String,
        source: serde_json::Error,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DragnetError>;
