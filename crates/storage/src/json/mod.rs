//! Flat JSON files, one per user and concern, under a data directory.
//!
//! Layout:
//! - `progress/<user>_progress.json`
//! - `schedules/<user>_schedule.json`
//! - `history/<user>_history.json`
//! - `auth/users.json`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::repository::{Storage, StorageError};

mod history_repo;
mod locks;
mod progress_repo;
mod schedule_repo;
mod user_repo;

use locks::FileLocks;

const SUBDIRS: [&str; 4] = ["progress", "schedules", "history", "auth"];

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JsonInitError {
    #[error("cannot prepare data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone)]
pub struct JsonRepository {
    root: PathBuf,
    locks: FileLocks,
}

impl JsonRepository {
    /// Open a data directory, creating its sub-directories if needed.
    ///
    /// # Errors
    ///
    /// Returns `JsonInitError` if a directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, JsonInitError> {
        let root = root.into();
        for sub in SUBDIRS {
            let path = root.join(sub);
            tokio::fs::create_dir_all(&path)
                .await
                .map_err(|source| JsonInitError::CreateDir { path, source })?;
        }
        Ok(Self {
            root,
            locks: FileLocks::default(),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_file(&self, dir: &str, user: &study_core::model::UserId, suffix: &str) -> PathBuf {
        self.root.join(dir).join(format!("{user}_{suffix}.json"))
    }
}

/// How a read should treat unparsable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnCorrupt {
    /// Log and fall back to the default value.
    Default,
    /// Report `StorageError::Serialization`.
    Fail,
}

/// Read and parse `path`. A missing or blank file yields `T::default()`.
async fn read_json<T>(path: &Path, on_corrupt: OnCorrupt) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(e.into()),
    };
    if raw.trim().is_empty() {
        return Ok(T::default());
    }
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(e) if on_corrupt == OnCorrupt::Default => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt data file");
            Ok(T::default())
        }
        Err(e) => Err(StorageError::Serialization(format!("{}: {e}", path.display()))),
    }
}

/// Write `value` to a sibling temp file and rename it over `path`.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let body =
        serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

impl Storage {
    /// Build a `Storage` backed by JSON files under `root`.
    ///
    /// # Errors
    ///
    /// Returns `JsonInitError` if the data directory cannot be prepared.
    pub async fn json(root: impl Into<PathBuf>) -> Result<Self, JsonInitError> {
        let repo = JsonRepository::open(root).await?;
        Ok(Self {
            progress: Arc::new(repo.clone()),
            schedules: Arc::new(repo.clone()),
            history: Arc::new(repo.clone()),
            users: Arc::new(repo),
        })
    }
}
