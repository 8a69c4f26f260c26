//! Fact-check session results and their JSON export.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::ProviderKind;

/// Errors from exporting a session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write session export {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One provider call made while analyzing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAttempt {
    pub provider: ProviderKind,
    pub model: String,
    /// Failure message, `None` on success.
    pub error: Option<String>,
}

/// A completed fact-check analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub subject: String,
    pub context: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Provider that produced `final_output`.
    pub provider: ProviderKind,
    pub model: String,
    pub attempts: Vec<ProviderAttempt>,
    pub final_output: String,
}

impl Session {
    /// Create a session that completed now.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        context: Option<String>,
        started_at: DateTime<Utc>,
        provider: ProviderKind,
        model: impl Into<String>,
        final_output: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: subject.into(),
            context,
            started_at,
            completed_at: Utc::now(),
            provider,
            model: model.into(),
            attempts: Vec::new(),
            final_output: final_output.into(),
        }
    }

    /// File name this session is exported under.
    #[must_use]
    pub fn export_filename(&self) -> String {
        export_filename(&self.subject, self.started_at)
    }

    /// Write the session as pretty JSON.
    ///
    /// The file is written to a temporary sibling, synced and renamed into
    /// place, so `path` either holds a complete export or does not exist.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the parent directory cannot be created or
    /// the file cannot be written.
    pub fn export_session(&self, path: &Path) -> Result<(), SessionError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SessionError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        if let Err(e) = write_then_rename(&temp_path, path, json.as_bytes()) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(SessionError::Write {
                path: path.to_path_buf(),
                source: e,
            });
        }

        tracing::debug!(path = %path.display(), session = %self.id, "Exported session");
        Ok(())
    }
}

fn write_then_rename(temp_path: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = std::fs::File::create(temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    std::fs::rename(temp_path, path)
}

/// `fact_check_<subject>_<YYYYMMDD_HHMMSS>.json`, with spaces and path
/// separators in the subject replaced by underscores.
#[must_use]
pub fn export_filename(subject: &str, started_at: DateTime<Utc>) -> String {
    let subject: String = subject
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    format!(
        "fact_check_{subject}_{}.json",
        started_at.format("%Y%m%d_%H%M%S")
    )
}
