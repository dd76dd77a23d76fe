use serde::{Deserialize, Serialize};

/// `GET /content/{id}` response, optionally expanded with
/// `body.storage,version`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentResponse {
    #[serde(default)]
    pub title: String,
    pub version: VersionInfo,
    #[serde(default)]
    pub body: Option<ContentBody>,
}

impl ContentResponse {
    /// Storage-format body, empty when the page has none or it was not
    /// expanded.
    pub fn storage_value(&self) -> &str {
        self.body
            .as_ref()
            .and_then(|b| b.storage.as_ref())
            .map(|s| s.value.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub number: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBody {
    #[serde(default)]
    pub storage: Option<StorageValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageValue {
    pub value: String,
}

/// `PUT /content/{id}` request.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRequest<'a> {
    pub version: VersionInfo,
    pub title: &'a str,
    #[serde(rename = "type")]
    pub content_type: &'static str,
    pub body: UpdateBody<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateBody<'a> {
    pub storage: UpdateStorage<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateStorage<'a> {
    pub value: &'a str,
    pub representation: &'static str,
}

impl<'a> UpdateRequest<'a> {
    pub fn page(version: u64, title: &'a str, content: &'a str) -> Self {
        Self {
            version: VersionInfo { number: version },
            title,
            content_type: "page",
            body: UpdateBody {
                storage: UpdateStorage {
                    value: content,
                    representation: "storage",
                },
            },
        }
    }
}
