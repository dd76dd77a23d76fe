//! Where rule files and credentials come from.
//!
//! [`AlertSource`] abstracts the two deployments: an S3 bucket
//! ([`s3::S3Source`]) and a local directory ([`local::LocalDirSource`]).
//! [`SecretStore`] abstracts the credential lookup
//! ([`secrets::SecretsManagerStore`]).

pub mod error;
pub mod local;
pub mod s3;
pub mod secrets;

use async_trait::async_trait;
use error::Result;
use serde::de::DeserializeOwned;

/// A collection of rule files addressed by name (object key or file name).
#[async_trait]
pub trait AlertSource: Send + Sync {
    /// Human-readable location, e.g. `s3://alert-rules/prod/`.
    fn describe(&self) -> String;

    /// Names of every file in the source, qualifying or not.
    async fn list_files(&self) -> Result<Vec<String>>;

    /// Full content of one file as UTF-8 text.
    async fn read_file(&self, name: &str) -> Result<String>;

    /// Supplementary free text for a team, if the source carries any.
    async fn team_info(&self, _team: &str) -> Option<String> {
        None
    }
}

/// Resolves named secrets holding JSON documents.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn secret_string(&self, name: &str) -> Result<String>;
}

/// Fetches `name` from `store` and deserializes its JSON value.
pub async fn fetch_json_secret<T: DeserializeOwned>(
    store: &dyn SecretStore,
    name: &str,
) -> Result<T> {
    let raw = store.secret_string(name).await?;
    Ok(serde_json::from_str(&raw)?)
}

/// Decides which file names are rule files, by extension.
///
/// # Examples
///
/// ```
/// use alertbook_source::ExtensionFilter;
///
/// let filter = ExtensionFilter::default();
/// assert!(filter.matches("prod/node.yml"));
/// assert!(filter.matches("api.yaml"));
/// assert!(!filter.matches("README.md"));
/// assert!(filter.clone().with_extension("txt").matches("legacy.txt"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(["yml", "yaml"])
    }
}

impl ExtensionFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.into().trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        let extension = extension.trim_start_matches('.');
        if !self.extensions.iter().any(|e| e == extension) {
            self.extensions.push(extension.to_string());
        }
        self
    }

    pub fn matches(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| {
            name.len() > ext.len()
                && name.ends_with(ext.as_str())
                && name[..name.len() - ext.len()].ends_with('.')
        })
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}
