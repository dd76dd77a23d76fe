/// Errors raised while listing or reading rule files and secrets.
///
/// # Examples
///
/// ```rust
/// use alertbook_source::error::SourceError;
///
/// let err = SourceError::Secret("ConfSecret has no string value".to_string());
/// assert!(err.to_string().contains("ConfSecret"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// An S3 call failed.
    #[error("S3 {operation} failed: {message}")]
    S3 {
        operation: &'static str,
        message: String,
    },

    /// The secret could not be fetched or has no usable value.
    #[error("Secret error: {0}")]
    Secret(String),

    /// A local file or directory could not be read.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File content is not valid UTF-8.
    #[error("{name} is not valid UTF-8: {source}")]
    Utf8 {
        name: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Source settings are unusable (e.g. an empty bucket name).
    #[error("Invalid source configuration: {0}")]
    Config(String),

    /// JSON deserialization failed (e.g. the credentials secret).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias so callers can write `error::Result<T>`.
pub type Result<T> = std::result::Result<T, SourceError>;
