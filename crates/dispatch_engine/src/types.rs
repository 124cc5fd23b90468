use std::path::PathBuf;

use dispatch_core::{CommandLine, ConfigError, Job, JobOutcome, LogRecord, PhaseError};
use thiserror::Error;

use crate::PersistError;

/// What the runner observed for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// The command actually executed, scheduler wrapping included.
    pub command: CommandLine,
    pub output: String,
    pub outcome: JobOutcome,
    pub started_at: String,
    pub finished_at: String,
}

impl RunReport {
    pub fn into_record(self, job: &Job) -> LogRecord {
        LogRecord {
            started_at: self.started_at,
            output: self.output,
            file: job.absolute_input.clone(),
            command: self.command,
            outcome: self.outcome,
            finished_at: self.finished_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    /// Inputs left out because a finished log already existed.
    pub skipped: usize,
    /// Jobs whose log could not be written. They still count as completed in
    /// the progress stream, so at run end the number of logs with a terminal
    /// status is `total - unrecorded`.
    pub unrecorded: usize,
    pub peak_running: usize,
    pub log_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("cannot start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {code:?}: {stderr}")]
    Status {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("{program} did not answer within {secs} seconds")]
    Timeout { program: String, secs: u64 },
}

/// Errors that abort the whole run. Per-job failures never end up here.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Phase(#[from] PhaseError),
    #[error("cannot read input list {path:?}: {source}")]
    InputList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("concurrency limiter closed while jobs were pending")]
    LimiterClosed,
}
