// Submission store module
// Persists every intake submission into a single JSON array file

use chrono::Utc;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use super::error::IntakeError;
use super::payload::IntakePayload;
use super::record::SubmissionRecord;

/// JSON-array file store
///
/// Appends rewrite the whole file. Writers in this process are serialized
/// by `write_lock`; nothing guards against another process writing the
/// same file, and a crash mid-write can leave it truncated.
pub struct IntakeStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl IntakeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and an empty `[]` file if missing
    pub async fn ensure(&self) -> Result<(), IntakeError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        if !fs::try_exists(&self.path).await? {
            fs::write(&self.path, "[]").await?;
        }

        Ok(())
    }

    /// Read every entry currently in the file
    ///
    /// Empty content reads as an empty array. Entries are kept as raw JSON
    /// so a rewrite never drops fields this version does not know about.
    pub async fn load(&self) -> Result<Vec<Value>, IntakeError> {
        let raw = fs::read_to_string(&self.path).await?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(IntakeError::Corrupt)
    }

    /// Stamp `payload` and append it to the store
    pub async fn append(&self, payload: IntakePayload) -> Result<SubmissionRecord, IntakeError> {
        let _guard = self.write_lock.lock().await;

        self.ensure().await?;
        let mut entries = self.load().await?;

        let record = SubmissionRecord::new(payload, Utc::now());
        entries.push(serde_json::to_value(&record).map_err(IntakeError::Encode)?);

        let content = serde_json::to_string_pretty(&entries).map_err(IntakeError::Encode)?;
        fs::write(&self.path, content).await?;

        Ok(record)
    }

    /// All stored records in submission order; a missing file reads as empty
    pub async fn records(&self) -> Result<Vec<SubmissionRecord>, IntakeError> {
        if !fs::try_exists(&self.path).await? {
            return Ok(Vec::new());
        }
        self.load()
            .await?
            .into_iter()
            .map(|entry| serde_json::from_value(entry).map_err(IntakeError::Corrupt))
            .collect()
    }
}
