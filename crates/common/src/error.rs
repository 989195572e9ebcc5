use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("Archive responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unrecognised archive response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid date selection: {0}")]
    InvalidSelection(String),

    #[error("Timestamp out of range: {0}")]
    TimestampRange(#[from] time::error::ComponentRange),

    #[error("Local time could not be resolved: {0}")]
    LocalTime(String),

    #[error("Timestamp formatting failed: {0}")]
    Format(#[from] time::error::Format),

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl ArchiveError {
    /// The request produced no usable archive body.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ArchiveError::HttpRequest(_) | ArchiveError::Status { .. } | ArchiveError::Decode(_)
        )
    }
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
