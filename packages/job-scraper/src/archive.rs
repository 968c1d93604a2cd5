//! On-disk snapshot history.
//!
//! Layout inside the archive directory:
//!
//! ```text
//! jobs.json                    current snapshot (absent between rotate and persist)
//! jobs_20250101_060000.json    history, one per rotated run
//! jobs_20250101_120000.json
//! ```
//!
//! The current snapshot is moved into history *before* a run scrapes, so an
//! interrupted run never leaves a half-written `jobs.json` over good data.
//! History is pruned by count, newest modification time first.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{ScrapeError, ScrapeResult};
use crate::types::JobRecord;

pub const CURRENT_FILE: &str = "jobs.json";
const HISTORY_PREFIX: &str = "jobs_";
const HISTORY_SUFFIX: &str = ".json";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Owns the archive directory.
#[derive(Debug, Clone)]
pub struct ArchiveRotator {
    dir: PathBuf,
}

impl ArchiveRotator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn current_path(&self) -> PathBuf {
        self.dir.join(CURRENT_FILE)
    }

    /// Move the current snapshot into history and return the (now free)
    /// current path. Creates the archive directory when missing.
    pub async fn rotate(&self) -> ScrapeResult<PathBuf> {
        self.archive_current(Local::now()).await?;
        Ok(self.current_path())
    }

    /// Rotation with an explicit capture time. Returns the history path the
    /// current snapshot was moved to, if there was one.
    pub async fn archive_current(
        &self,
        captured_at: DateTime<Local>,
    ) -> ScrapeResult<Option<PathBuf>> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ScrapeError::io(&self.dir, e))?;

        let current = self.current_path();
        if !fs::try_exists(&current)
            .await
            .map_err(|e| ScrapeError::io(&current, e))?
        {
            debug!(path = %current.display(), "No current snapshot to rotate");
            return Ok(None);
        }

        let archived = self.free_history_path(captured_at).await?;
        fs::rename(&current, &archived)
            .await
            .map_err(|e| ScrapeError::io(&current, e))?;

        info!(path = %archived.display(), "Archived current snapshot");
        Ok(Some(archived))
    }

    /// Write `records` to `path` as indented UTF-8 JSON.
    ///
    /// The data goes to a sibling temp file first and is renamed into place,
    /// so readers see either the previous state or the complete snapshot.
    pub async fn persist(&self, path: &Path, records: &[JobRecord]) -> ScrapeResult<()> {
        let json = serde_json::to_vec_pretty(records)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &json)
            .await
            .map_err(|e| ScrapeError::io(&tmp, e))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| ScrapeError::io(path, e))?;

        info!(path = %path.display(), jobs = records.len(), "Saved snapshot");
        Ok(())
    }

    /// Delete history entries beyond the `retain_count` most recently
    /// modified. Returns the removed paths.
    pub async fn prune(&self, retain_count: usize) -> ScrapeResult<Vec<PathBuf>> {
        let history = self.history().await?;

        let mut removed = Vec::new();
        for path in history.into_iter().skip(retain_count) {
            fs::remove_file(&path)
                .await
                .map_err(|e| ScrapeError::io(&path, e))?;
            info!(path = %path.display(), "Removed old archive");
            removed.push(path);
        }

        Ok(removed)
    }

    /// History snapshots, most recently modified first.
    pub async fn history(&self) -> ScrapeResult<Vec<PathBuf>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ScrapeError::io(&self.dir, e)),
        };

        let mut history: Vec<(SystemTime, PathBuf)> = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ScrapeError::io(&self.dir, e))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !is_history_name(name) {
                continue;
            }

            let path = entry.path();
            let modified = entry
                .metadata()
                .await
                .and_then(|meta| meta.modified())
                .map_err(|e| ScrapeError::io(&path, e))?;
            history.push((modified, path));
        }

        history.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
        Ok(history.into_iter().map(|(_, path)| path).collect())
    }

    /// Read the current snapshot. A missing or blank file is an empty list.
    pub async fn load_current(&self) -> ScrapeResult<Vec<JobRecord>> {
        let path = self.current_path();
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ScrapeError::io(&path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn free_history_path(&self, captured_at: DateTime<Local>) -> ScrapeResult<PathBuf> {
        let stamp = captured_at.format(TIMESTAMP_FORMAT).to_string();

        let mut candidate = self.dir.join(format!("{HISTORY_PREFIX}{stamp}{HISTORY_SUFFIX}"));
        let mut n = 1;
        while fs::try_exists(&candidate)
            .await
            .map_err(|e| ScrapeError::io(&candidate, e))?
        {
            candidate = self
                .dir
                .join(format!("{HISTORY_PREFIX}{stamp}_{n}{HISTORY_SUFFIX}"));
            n += 1;
        }
        Ok(candidate)
    }
}

fn is_history_name(name: &str) -> bool {
    name.starts_with(HISTORY_PREFIX) && name.ends_with(HISTORY_SUFFIX)
}
