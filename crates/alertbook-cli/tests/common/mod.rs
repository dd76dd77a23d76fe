#![allow(dead_code)]

use alertbook_notify::error::{PublishError, Result as PublishResult};
use alertbook_notify::publisher::{PageTitle, ReportPublisher};
use alertbook_notify::{PageSnapshot, PageUpdate, WikiApi};
use alertbook_source::error::{Result as SourceResult, SourceError};
use alertbook_source::AlertSource;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory file listing. `None` content makes reading that file fail.
#[derive(Default)]
pub struct MemorySource {
    pub files: Vec<(String, Option<String>)>,
    pub team_info: HashMap<String, String>,
    pub fail_listing: bool,
    pub reads: Arc<Mutex<Vec<String>>>,
}

impl MemorySource {
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(name, content)| (name.to_string(), Some(content.to_string())))
                .collect(),
            ..Self::default()
        }
    }

    pub fn add_unreadable(&mut self, name: &str) {
        self.files.push((name.to_string(), None));
    }
}

#[async_trait]
impl AlertSource for MemorySource {
    fn describe(&self) -> String {
        "memory://rules".to_string()
    }

    async fn list_files(&self) -> SourceResult<Vec<String>> {
        if self.fail_listing {
            return Err(SourceError::S3 {
                operation: "ListObjectsV2",
                message: "AccessDenied".to_string(),
            });
        }
        Ok(self.files.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn read_file(&self, name: &str) -> SourceResult<String> {
        self.reads.lock().unwrap().push(name.to_string());
        match self.files.iter().find(|(n, _)| n == name) {
            Some((_, Some(content))) => Ok(content.clone()),
            _ => Err(SourceError::S3 {
                operation: "GetObject",
                message: format!("NoSuchKey: {name}"),
            }),
        }
    }

    async fn team_info(&self, team: &str) -> Option<String> {
        self.team_info.get(team).cloned()
    }
}

#[derive(Debug, Default)]
pub struct WikiCalls {
    pub version_reads: usize,
    pub page_reads: usize,
    pub updates: Vec<PageUpdate>,
}

pub struct RecordingWiki {
    pub calls: Arc<Mutex<WikiCalls>>,
    pub page: PageSnapshot,
}

#[async_trait]
impl WikiApi for RecordingWiki {
    async fn current_version(&self) -> PublishResult<u64> {
        self.calls.lock().unwrap().version_reads += 1;
        Ok(self.page.version)
    }

    async fn fetch_page(&self) -> PublishResult<PageSnapshot> {
        self.calls.lock().unwrap().page_reads += 1;
        Ok(self.page.clone())
    }

    async fn update_page(&self, update: &PageUpdate) -> PublishResult<u16> {
        self.calls.lock().unwrap().updates.push(update.clone());
        if update.version != self.page.version + 1 {
            return Err(PublishError::Api {
                status: 409,
                body: "version conflict".to_string(),
            });
        }
        Ok(200)
    }

    fn page_id(&self) -> &str {
        "98765"
    }
}

pub fn recording_publisher(
    body: &str,
    title: PageTitle,
) -> (ReportPublisher, Arc<Mutex<WikiCalls>>) {
    let calls = Arc::new(Mutex::new(WikiCalls::default()));
    let wiki = RecordingWiki {
        calls: calls.clone(),
        page: PageSnapshot {
            title: "Alert Overrides".to_string(),
            version: 41,
            body: body.to_string(),
        },
    };
    (ReportPublisher::new(Box::new(wiki), title), calls)
}

pub const PLATFORM_RULES: &str = r#"
groups:
  - name: api
    rules:
      - alert: ApiLatencyHigh
        expr: histogram_quantile(0.99, rate(http_request_duration_seconds_bucket[5m])) > 1000
        for: 10m
        labels:
          team: Platform
          sev: critical
          env: prod
        annotations:
          description: p99 latency above one second
          summary: API latency
  - name: queue
    rules:
      - alert: QueueBacklog
        expr: queue_depth > 500
        labels:
          team: Platform
          sev: warning
          env: staging
"#;
