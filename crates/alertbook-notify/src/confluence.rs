use crate::error::{PublishError, Result};
use crate::models::{ContentResponse, UpdateRequest};
use crate::utils::{truncate_string, MAX_BODY_LENGTH};
use crate::{PageSnapshot, PageUpdate, WikiApi};
use alertbook_common::types::ConfluenceCredentials;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Confluence Cloud REST client bound to one page.
pub struct ConfluenceClient {
    base_url: String,
    user: String,
    api_token: String,
    page_id: String,
    client: Client,
}

impl ConfluenceClient {
    pub fn new(credentials: &ConfluenceCredentials, timeout_secs: u64) -> Result<Self> {
        if credentials.url.trim().is_empty() {
            return Err(PublishError::InvalidConfig("CONFLUENCE_URL is empty".into()));
        }
        if credentials.page_id.trim().is_empty() {
            return Err(PublishError::InvalidConfig(
                "CONFLUENCE_PAGE_ID is empty".into(),
            ));
        }

        let client = Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: api_base_url(&credentials.url),
            user: credentials.user.clone(),
            api_token: credentials.api_token.clone(),
            page_id: credentials.page_id.trim().to_string(),
            client,
        })
    }

    fn content_url(&self) -> String {
        format!("{}/content/{}", self.base_url, self.page_id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.user, Some(&self.api_token))
            .header("Accept", "application/json")
            .send()
            .await?;
        let body = success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// REST API root for a site URL such as `https://acme.atlassian.net`.
pub fn api_base_url(site_url: &str) -> String {
    format!("{}/wiki/rest/api", site_url.trim().trim_end_matches('/'))
}

/// Reads the response body, turning non-success statuses into
/// [`PublishError::Api`].
async fn success_body(response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(PublishError::Api {
            status: status.as_u16(),
            body: truncate_string(&body, MAX_BODY_LENGTH),
        })
    }
}

#[async_trait]
impl WikiApi for ConfluenceClient {
    async fn current_version(&self) -> Result<u64> {
        let content: ContentResponse = self.get_json(&self.content_url()).await?;
        Ok(content.version.number)
    }

    async fn fetch_page(&self) -> Result<PageSnapshot> {
        let url = format!("{}?expand=body.storage,version", self.content_url());
        let content: ContentResponse = self.get_json(&url).await?;
        Ok(PageSnapshot {
            body: content.storage_value().to_string(),
            title: content.title,
            version: content.version.number,
        })
    }

    async fn update_page(&self, update: &PageUpdate) -> Result<u16> {
        let request = UpdateRequest::page(update.version, &update.title, &update.content);
        tracing::debug!(
            page_id = %self.page_id,
            version = update.version,
            bytes = update.content.len(),
            "Updating Confluence page"
        );
        let response = self
            .client
            .put(self.content_url())
            .basic_auth(&self.user, Some(&self.api_token))
            .json(&request)
            .send()
            .await?;
        let status = response.status().as_u16();
        success_body(response).await?;
        Ok(status)
    }

    fn page_id(&self) -> &str {
        &self.page_id
    }
}
