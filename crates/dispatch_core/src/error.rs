use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a run before (or while) jobs are enumerated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot resolve input path {path:?}: {source}")]
    UnresolvablePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("input path {0:?} has no file name to derive a log name from")]
    NoFileName(PathBuf),
    #[error("inputs {first:?} and {second:?} would share the log file {log_name}")]
    DuplicateLogName {
        log_name: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("solver command template has no argument containing {placeholder}")]
    MissingInputPlaceholder { placeholder: &'static str },
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
    #[error("cannot parse profile: {0}")]
    Parse(#[from] ron::error::SpannedError),
}
