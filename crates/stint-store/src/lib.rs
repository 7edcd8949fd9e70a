//! Ledger persistence: one record line per job in a plain text file.
//!
//! Saving writes the whole ledger to a sibling temp file and renames it
//! over the target, so the old file stays intact until the replacement
//! is complete.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use stint_core::{Job, Ledger, RecordError, record};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read ledger at {path}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },

    #[error("failed to write ledger at {path}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },

    #[error("bad record at {path}:{line}")]
    BadRecord {
        path: PathBuf,
        line: usize,
        source: RecordError,
    },
}

/// Handle to a ledger file.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the ledger. A missing file is an empty ledger, not an
    /// error; a malformed line is reported with its line number.
    pub fn load(&self) -> Result<Ledger, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no ledger file yet");
                return Ok(Ledger::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let mut jobs = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let job = record::deserialize(line).map_err(|source| StoreError::BadRecord {
                path: self.path.clone(),
                line: index + 1,
                source,
            })?;
            jobs.push(job);
        }
        tracing::debug!(path = %self.path.display(), jobs = jobs.len(), "loaded ledger");
        Ok(Ledger::from_jobs(jobs))
    }

    /// Saves all jobs, replacing the file atomically via a temp file in
    /// the same directory.
    pub fn save(&self, jobs: &[Job]) -> Result<(), StoreError> {
        let mut content = String::new();
        for job in jobs {
            content.push_str(&record::serialize(job));
            content.push('\n');
        }

        let temp = self.temp_path();
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        fs::write(&temp, content).map_err(write_err)?;
        fs::rename(&temp, &self.path).map_err(write_err)?;
        tracing::debug!(path = %self.path.display(), jobs = jobs.len(), "saved ledger");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map_or_else(
            || std::ffi::OsString::from("ledger"),
            std::borrow::ToOwned::to_owned,
        );
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
