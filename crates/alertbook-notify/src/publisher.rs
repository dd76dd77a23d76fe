use crate::error::PublishError;
use crate::{PageUpdate, WikiApi};

/// Title used for catalogue page versions unless configured otherwise.
pub const DEFAULT_PAGE_TITLE: &str = "Updated Prometheus Alerts";

/// Title written with each new page version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTitle {
    Fixed(String),
    /// Reuse the title the page currently has.
    KeepExisting,
}

impl Default for PageTitle {
    fn default() -> Self {
        Self::Fixed(DEFAULT_PAGE_TITLE.to_string())
    }
}

/// How a publish attempt ended. None of these abort the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The current version or body could not be read; nothing was written.
    BaselineUnavailable,
    /// The stored body already equals the rendered content.
    Unchanged,
    Updated { version: u64, status: u16 },
    /// The update request failed; it is not retried.
    UpdateFailed { status: Option<u16> },
}

/// Writes rendered content to the wiki page when it differs from what is
/// stored there.
pub struct ReportPublisher {
    wiki: Box<dyn WikiApi>,
    title: PageTitle,
}

impl ReportPublisher {
    pub fn new(wiki: Box<dyn WikiApi>, title: PageTitle) -> Self {
        Self { wiki, title }
    }

    /// Fetches the current version and body, compares, and writes version
    /// `current + 1` only on change.
    ///
    /// A concurrent edit between the read and the write makes the server
    /// reject the update; that surfaces as [`PublishOutcome::UpdateFailed`].
    pub async fn publish(&self, content: &str) -> PublishOutcome {
        let page_id = self.wiki.page_id().to_string();

        let version = match self.wiki.current_version().await {
            Ok(version) => version,
            Err(e) => {
                tracing::error!(page_id = %page_id, error = %e, "Error fetching current page version");
                return PublishOutcome::BaselineUnavailable;
            }
        };

        let page = match self.wiki.fetch_page().await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(page_id = %page_id, error = %e, "Error fetching page content");
                return PublishOutcome::BaselineUnavailable;
            }
        };

        if page.body == content {
            tracing::info!(page_id = %page_id, version, "No changes detected. Skipping update.");
            return PublishOutcome::Unchanged;
        }

        let title = match &self.title {
            PageTitle::Fixed(title) => title.clone(),
            PageTitle::KeepExisting => page.title,
        };
        let update = PageUpdate {
            version: version + 1,
            title,
            content: content.to_string(),
        };

        match self.wiki.update_page(&update).await {
            Ok(status) => {
                tracing::info!(
                    page_id = %page_id,
                    title = %update.title,
                    version = update.version,
                    status,
                    "Page content updated"
                );
                PublishOutcome::Updated {
                    version: update.version,
                    status,
                }
            }
            Err(PublishError::Api { status, body }) => {
                tracing::error!(
                    page_id = %page_id,
                    status,
                    body = %body,
                    "Failed to update page content"
                );
                PublishOutcome::UpdateFailed {
                    status: Some(status),
                }
            }
            Err(e) => {
                tracing::error!(page_id = %page_id, error = %e, "Failed to update page content");
                PublishOutcome::UpdateFailed { status: e.status() }
            }
        }
    }
}
