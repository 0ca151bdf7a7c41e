use crate::error::{Result, SalinityError};
use crate::models::{Alert, EnvironmentalReading};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Append-only JSON array file that keeps only the most recent `capacity` entries.
///
/// Every append loads the whole array, concatenates, truncates from the
/// front and replaces the file through a sibling temp file and a rename.
/// Concurrent writers are not supported.
pub struct BoundedJsonLog<T> {
    path: PathBuf,
    capacity: usize,
    _entry: PhantomData<fn() -> T>,
}

pub type ReadingHistoryStore = BoundedJsonLog<EnvironmentalReading>;
pub type AlertLog = BoundedJsonLog<Alert>;

impl<T> BoundedJsonLog<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
            _entry: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current contents, oldest first. A missing file is an empty log.
    pub fn load(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            SalinityError::Persistence(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            SalinityError::Persistence(format!(
                "{} is not a valid JSON array: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Append entries in arrival order and return the persisted count.
    pub fn append(&self, entries: Vec<T>) -> Result<usize> {
        let mut all = self.load()?;
        all.extend(entries);

        if all.len() > self.capacity {
            let excess = all.len() - self.capacity;
            all.drain(..excess);
        }

        self.replace(&all)?;
        Ok(all.len())
    }

    fn replace(&self, entries: &[T]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SalinityError::Persistence(format!(
                        "Failed to create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.tmp_path();

        std::fs::write(&tmp_path, json).map_err(|e| {
            SalinityError::Persistence(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;

        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            SalinityError::Persistence(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
