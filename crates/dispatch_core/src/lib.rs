//! Dispatch core: job descriptions, outcomes, log records and run configuration.
//!
//! Nothing in here spawns processes or sleeps; the engine crate drives these
//! types. The one filesystem touch is path resolution in [`JobSpecBuilder`].
mod command;
mod error;
mod hosts;
mod inputs;
mod job;
mod outcome;
mod profile;
mod record;
mod state;

pub use command::{CommandLine, CommandTemplate, INPUT_PLACEHOLDER};
pub use error::ConfigError;
pub use hosts::HostSet;
pub use inputs::{has_extension, parse_input_list};
pub use job::{log_file_name, Job, JobId, JobSpecBuilder, DEFAULT_DEADLINE, LOG_SUFFIX};
pub use outcome::JobOutcome;
pub use profile::{
    LsfSettings, Profile, ResumePolicy, SchedulerKind, ThrottleSettings, DEFAULT_PROFILE_PATH,
};
pub use record::{count_status_lines, has_terminal_status, LogRecord, SEPARATOR};
pub use state::{DispatchPhase, DispatchState, PhaseError};
