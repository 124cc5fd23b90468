use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use dispatch_core::{Job, LogRecord};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("log directory missing or not writable: {0}")]
    LogDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the log directory exists; create if missing.
pub fn ensure_log_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::LogDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::LogDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::LogDir(e.to_string()))?;
    }
    // Writability probe; the temp file is removed on drop.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::LogDir(e.to_string()))?;
    Ok(())
}

/// Writes each job's record as one unit: temp file in the same directory,
/// then a rename over `<stem>_log.txt`.
#[derive(Debug, Clone)]
pub struct LogWriter {
    dir: PathBuf,
}

impl LogWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, job: &Job, record: &LogRecord) -> Result<PathBuf, PersistError> {
        let target = &job.log_path;
        let parent = target
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(self.dir.as_path());

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(record.render().as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Rename replaces an older log in place.
        tmp.persist(target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target.clone())
    }

    /// Content of the job's existing log, if there is one.
    pub fn read_existing(&self, job: &Job) -> Option<String> {
        fs::read_to_string(&job.log_path).ok()
    }
}
