/// Errors for documents that must be well-formed (variable sheets).
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document parsed but is not a list of entries.
    #[error("expected a list of alert entries, found {found}")]
    NotAList { found: &'static str },
}

pub type Result<T> = std::result::Result<T, DocumentError>;
