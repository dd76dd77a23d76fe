//! Rendering and publishing of the alert catalogue.
//!
//! [`report_template`] turns team-grouped alerts into a Confluence storage
//! fragment. [`publisher::ReportPublisher`] compares it with the page's
//! current body and writes a new page version through a [`WikiApi`] only when
//! the content changed. [`confluence::ConfluenceClient`] is the REST
//! implementation of [`WikiApi`].

pub mod confluence;
pub mod error;
pub mod models;
pub mod publisher;
pub mod report_template;
pub mod utils;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use error::Result;

/// The page as currently stored on the wiki.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub title: String,
    pub version: u64,
    pub body: String,
}

/// A new page version to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUpdate {
    pub version: u64,
    pub title: String,
    pub content: String,
}

/// Read/write access to the single wiki page the catalogue is published to.
#[async_trait]
pub trait WikiApi: Send + Sync {
    /// Current version number of the page.
    async fn current_version(&self) -> Result<u64>;

    /// Title, version and storage-format body of the page.
    async fn fetch_page(&self) -> Result<PageSnapshot>;

    /// Writes a new version of the page, returning the HTTP status code.
    ///
    /// # Errors
    ///
    /// Fails on transport errors and on non-success responses; the server
    /// rejects updates whose version is not exactly one above the stored one.
    async fn update_page(&self, update: &PageUpdate) -> Result<u16>;

    /// Identifier of the target page, for logging.
    fn page_id(&self) -> &str;
}
