use crate::error::{Result, SourceError};
use crate::AlertSource;
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;

/// Rule files stored as objects in one S3 bucket, optionally under a prefix.
pub struct S3Source {
    client: Client,
    bucket: String,
    prefix: Option<String>,
}

impl S3Source {
    pub fn new(client: Client, bucket: impl Into<String>, prefix: Option<String>) -> Result<Self> {
        let bucket = bucket.into();
        if bucket.trim().is_empty() {
            return Err(SourceError::Config("bucket name is empty".to_string()));
        }
        Ok(Self {
            client,
            bucket,
            prefix: prefix.filter(|p| !p.is_empty()),
        })
    }
}

fn storage_error<E>(operation: &'static str, err: E) -> SourceError
where
    E: std::error::Error,
{
    SourceError::S3 {
        operation,
        message: DisplayErrorContext(err).to_string(),
    }
}

#[async_trait]
impl AlertSource for S3Source {
    fn describe(&self) -> String {
        format!(
            "s3://{}/{}",
            self.bucket,
            self.prefix.as_deref().unwrap_or_default()
        )
    }

    async fn list_files(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_prefix(self.prefix.clone())
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| storage_error("ListObjectsV2", e))?;

            keys.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    tracing::debug!(bucket = %self.bucket, listed = keys.len(), "Fetching next listing page");
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        tracing::debug!(bucket = %self.bucket, count = keys.len(), "Listed objects");
        Ok(keys)
    }

    async fn read_file(&self, name: &str) -> Result<String> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await
            .map_err(|e| storage_error("GetObject", e))?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| storage_error("GetObject body", e))?
            .into_bytes();

        String::from_utf8(bytes.to_vec()).map_err(|source| SourceError::Utf8 {
            name: name.to_string(),
            source,
        })
    }
}
