use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CommandTemplate, ConfigError, JobSpecBuilder, INPUT_PLACEHOLDER};

/// Profile file read when `--profile` is not given.
pub const DEFAULT_PROFILE_PATH: &str = "solver_dispatch.ron";

/// Everything that differs between one solver campaign and another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub solver: CommandTemplate,
    #[serde(default)]
    pub inputs: Vec<PathBuf>,
    #[serde(default)]
    pub input_list: Option<PathBuf>,
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Defaults to `logs/<name>`.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    /// Admission pauses while the sampled remote backlog exceeds this.
    #[serde(default = "default_queue_ceiling")]
    pub queue_ceiling: u64,
    #[serde(default)]
    pub throttle: ThrottleSettings,
    #[serde(default)]
    pub scheduler: SchedulerKind,
    #[serde(default)]
    pub hosts_file: Option<PathBuf>,
    #[serde(default)]
    pub resume: ResumePolicy,
    #[serde(default = "default_kill_grace_secs")]
    pub kill_grace_secs: u64,
}

fn default_extension() -> String {
    "aig".to_string()
}

fn default_deadline_secs() -> u64 {
    crate::DEFAULT_DEADLINE.as_secs()
}

fn default_queue_ceiling() -> u64 {
    200
}

fn default_kill_grace_secs() -> u64 {
    5
}

/// Backoff between queue-depth samples while admission is throttled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleSettings {
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 2_000,
            max_backoff_ms: 60_000,
        }
    }
}

impl ThrottleSettings {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SchedulerKind {
    /// Run the solver directly on this machine.
    #[default]
    Local,
    Lsf(LsfSettings),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LsfSettings {
    pub submit_program: String,
    pub query_program: String,
    pub queue: Option<String>,
    /// Count pending jobs of every user, not just our own.
    pub all_users: bool,
    pub extra_submit_args: Vec<String>,
}

impl Default for LsfSettings {
    fn default() -> Self {
        Self {
            submit_program: "bsub".to_string(),
            query_program: "bjobs".to_string(),
            queue: None,
            all_users: false,
            extra_submit_args: Vec::new(),
        }
    }
}

/// What to do with inputs that already have a finished log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResumePolicy {
    #[default]
    Rerun,
    SkipLogged,
}

impl Profile {
    /// Parses and validates a RON profile.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let profile: Profile = ron::from_str(text)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidProfile("name is empty".into()));
        }
        if self.solver.program.trim().is_empty() {
            return Err(ConfigError::InvalidProfile("solver program is empty".into()));
        }
        if !self.solver.has_placeholder() {
            return Err(ConfigError::MissingInputPlaceholder {
                placeholder: INPUT_PLACEHOLDER,
            });
        }
        if self.inputs.is_empty() && self.input_list.is_none() {
            return Err(ConfigError::InvalidProfile(
                "neither inputs nor input_list is set".into(),
            ));
        }
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(ConfigError::InvalidProfile(format!(
                "extension {:?} must be non-empty and without a leading dot",
                self.extension
            )));
        }
        if self.deadline_secs == 0 {
            return Err(ConfigError::InvalidProfile("deadline_secs must be positive".into()));
        }
        if self.throttle.initial_backoff_ms == 0
            || self.throttle.initial_backoff_ms > self.throttle.max_backoff_ms
        {
            return Err(ConfigError::InvalidProfile(
                "throttle backoff must satisfy 0 < initial_backoff_ms <= max_backoff_ms".into(),
            ));
        }
        Ok(())
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| Path::new("logs").join(&self.name))
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    pub fn kill_grace(&self) -> Duration {
        Duration::from_secs(self.kill_grace_secs)
    }

    pub fn job_builder(&self) -> JobSpecBuilder {
        JobSpecBuilder::new(self.solver.clone(), self.log_dir(), self.deadline())
    }
}
