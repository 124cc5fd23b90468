use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{CommandLine, CommandTemplate, ConfigError};

/// 1-based sequence number assigned at enumeration.
pub type JobId = u64;

/// Wall-clock budget for one solver invocation unless the profile overrides it.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(3600);

/// Suffix appended to the input's stem to name its log file.
pub const LOG_SUFFIX: &str = "_log.txt";

/// One unit of work: a single input file and everything needed to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    /// Path as discovered.
    pub input: PathBuf,
    pub absolute_input: PathBuf,
    pub log_path: PathBuf,
    pub command: CommandLine,
    pub deadline: Duration,
}

impl Job {
    pub fn display_name(&self) -> String {
        self.absolute_input.display().to_string()
    }
}

/// `<stem>_log.txt`, where the stem is the file name minus its last extension.
pub fn log_file_name(input: &Path) -> Option<String> {
    let stem = input.file_stem()?.to_string_lossy();
    Some(format!("{stem}{LOG_SUFFIX}"))
}

/// Turns discovered input paths into [`Job`]s.
#[derive(Debug, Clone)]
pub struct JobSpecBuilder {
    template: CommandTemplate,
    log_dir: PathBuf,
    deadline: Duration,
}

impl JobSpecBuilder {
    pub fn new(template: CommandTemplate, log_dir: impl Into<PathBuf>, deadline: Duration) -> Self {
        Self {
            template,
            log_dir: log_dir.into(),
            deadline,
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Log path the job for `input` would write to, without resolving anything.
    pub fn log_path_for(&self, input: &Path) -> Result<PathBuf, ConfigError> {
        let name = log_file_name(input).ok_or_else(|| ConfigError::NoFileName(input.into()))?;
        Ok(self.log_dir.join(name))
    }

    /// Failing to resolve the path is a configuration error for the whole run.
    pub fn build(&self, id: JobId, input: &Path) -> Result<Job, ConfigError> {
        let absolute_input =
            fs::canonicalize(input).map_err(|source| ConfigError::UnresolvablePath {
                path: input.to_path_buf(),
                source,
            })?;
        let log_path = self.log_path_for(input)?;
        let command = self.template.instantiate(&absolute_input);
        Ok(Job {
            id,
            input: input.to_path_buf(),
            absolute_input,
            log_path,
            command,
            deadline: self.deadline,
        })
    }

    /// Builds jobs in the given order, numbering them from 1.
    ///
    /// Spellings that resolve to a file already seen are dropped, keeping the
    /// first. Distinct files whose log names collide are rejected, since each
    /// job must own its log.
    pub fn build_all(&self, inputs: &[PathBuf]) -> Result<Vec<Job>, ConfigError> {
        let mut resolved: HashSet<PathBuf> = HashSet::with_capacity(inputs.len());
        let mut seen: HashMap<PathBuf, PathBuf> = HashMap::with_capacity(inputs.len());
        let mut jobs = Vec::with_capacity(inputs.len());
        for input in inputs {
            let job = self.build(jobs.len() as JobId + 1, input)?;
            if !resolved.insert(job.absolute_input.clone()) {
                continue;
            }
            if let Some(first) = seen.insert(job.log_path.clone(), input.clone()) {
                return Err(ConfigError::DuplicateLogName {
                    log_name: job
                        .log_path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    first,
                    second: input.clone(),
                });
            }
            jobs.push(job);
        }
        Ok(jobs)
    }
}
