/// Errors raised while reading or writing the wiki page.
///
/// # Examples
///
/// ```rust
/// use alertbook_notify::error::PublishError;
///
/// let err = PublishError::Api { status: 409, body: "version conflict".to_string() };
/// assert!(err.to_string().contains("409"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Connection details are missing or malformed.
    #[error("Publish: invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP request could not be sent or its body could not be read.
    #[error("Publish: HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The wiki answered with a non-success status.
    #[error("Publish: wiki API error: status={status}, body={body}")]
    Api { status: u16, body: String },

    /// The wiki response did not have the expected shape.
    #[error("Publish: JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PublishError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Convenience `Result` alias for wiki operations.
pub type Result<T> = std::result::Result<T, PublishError>;
