use crate::error::{Result, SourceError};
use crate::AlertSource;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Suffix of per-team information files next to the rule files.
pub const TEAM_INFO_SUFFIX: &str = "_info.txt";

/// Rule files in a single local directory (not recursive).
///
/// Team information is read from `{team}_info.txt` in the same directory.
pub struct LocalDirSource {
    dir: PathBuf,
}

impl LocalDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn io_error(path: &Path, source: std::io::Error) -> SourceError {
        SourceError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Team names come from rule labels; anything that could leave the
/// directory is refused.
fn is_plain_file_stem(team: &str) -> bool {
    !team.is_empty() && !team.contains(['/', '\\']) && team != "." && team != ".."
}

#[async_trait]
impl AlertSource for LocalDirSource {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    async fn list_files(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| Self::io_error(&self.dir, e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Self::io_error(&self.dir, e))?
        {
            // `metadata` follows symlinks; only entries resolving to directories are skipped.
            let path = entry.path();
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_dir() => continue,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Entry metadata unavailable");
                }
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    tracing::warn!(name = ?raw, "Skipping file with non UTF-8 name");
                }
            }
        }
        names.sort();
        Ok(names)
    }

    async fn read_file(&self, name: &str) -> Result<String> {
        let path = self.dir.join(name);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| Self::io_error(&path, e))?;
        String::from_utf8(bytes).map_err(|source| SourceError::Utf8 {
            name: name.to_string(),
            source,
        })
    }

    async fn team_info(&self, team: &str) -> Option<String> {
        if !is_plain_file_stem(team) {
            tracing::warn!(team, "Team name is not usable as a file name");
            return None;
        }
        let path = self.dir.join(format!("{team}{TEAM_INFO_SUFFIX}"));
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(team, path = %path.display(), error = %e, "Team info file not available");
                None
            }
        }
    }
}
