use alertbook_notify::publisher::{PageTitle, DEFAULT_PAGE_TITLE};
use alertbook_source::secrets::DEFAULT_SECRET_NAME;
use alertbook_source::ExtensionFilter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bucket holding the rule files (`s3` subcommand).
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    /// File extensions that qualify as rule files.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Secrets Manager secret with the Confluence credentials.
    #[serde(default = "default_secret_name")]
    pub secret_name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_page_title")]
    pub page_title: String,
    /// Reuse the page's current title instead of `page_title`.
    #[serde(default)]
    pub keep_page_title: bool,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// Per-team text shown in the "Team Information" block. Takes precedence
    /// over `{team}_info.txt` files.
    #[serde(default)]
    pub team_info: HashMap<String, String>,
    #[serde(default)]
    pub overrides: OverridesConfig,
    #[serde(default)]
    pub variables: VariablesConfig,
}

/// Settings of the `overrides` subcommand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverridesConfig {
    /// Defaults to the top-level `bucket`.
    #[serde(default)]
    pub bucket: Option<String>,
    /// Override file keys, one per environment (`env1-overrides.yml`).
    #[serde(default)]
    pub keys: Vec<String>,
    /// Defaults to the top-level `secret_name`.
    #[serde(default)]
    pub secret_name: Option<String>,
}

/// Settings of the `variables` subcommand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariablesConfig {
    /// Defaults to the top-level `bucket`.
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default = "default_variables_key")]
    pub key: String,
    /// Defaults to the top-level `secret_name`.
    #[serde(default)]
    pub secret_name: Option<String>,
}

impl Default for VariablesConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            key: default_variables_key(),
            secret_name: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            prefix: None,
            extensions: default_extensions(),
            secret_name: default_secret_name(),
            region: None,
            page_title: default_page_title(),
            keep_page_title: false,
            http_timeout_secs: default_http_timeout_secs(),
            team_info: HashMap::new(),
            overrides: OverridesConfig::default(),
            variables: VariablesConfig::default(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["yml".to_string(), "yaml".to_string()]
}

fn default_secret_name() -> String {
    DEFAULT_SECRET_NAME.to_string()
}

fn default_page_title() -> String {
    DEFAULT_PAGE_TITLE.to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_variables_key() -> String {
    "alerts.yaml".to_string()
}

impl AppConfig {
    /// Loads the TOML file at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn extension_filter(&self) -> ExtensionFilter {
        ExtensionFilter::new(self.extensions.iter().map(String::as_str))
    }

    pub fn page_title(&self) -> PageTitle {
        if self.keep_page_title {
            PageTitle::KeepExisting
        } else {
            PageTitle::Fixed(self.page_title.clone())
        }
    }

    pub fn overrides_bucket(&self) -> Option<&str> {
        self.overrides
            .bucket
            .as_deref()
            .or(self.bucket.as_deref())
    }

    pub fn overrides_secret_name(&self) -> &str {
        self.overrides
            .secret_name
            .as_deref()
            .unwrap_or(&self.secret_name)
    }

    pub fn variables_bucket(&self) -> Option<&str> {
        self.variables
            .bucket
            .as_deref()
            .or(self.bucket.as_deref())
    }

    pub fn variables_secret_name(&self) -> &str {
        self.variables
            .secret_name
            .as_deref()
            .unwrap_or(&self.secret_name)
    }
}
