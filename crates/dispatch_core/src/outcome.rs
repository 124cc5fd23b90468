use std::fmt;
use std::time::Duration;

/// How a job ended. Produced exactly once per job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The wrapped command exited on its own; its exit code is not interpreted.
    Completed { exit_code: Option<i32> },
    /// The deadline elapsed and the process group was terminated.
    TimedOut { deadline: Duration },
    /// The submission command could not be started or waited on.
    SubmissionFailed { reason: String },
}

impl JobOutcome {
    /// Short label used in progress lines.
    pub fn label(&self) -> &'static str {
        match self {
            JobOutcome::Completed { .. } => "COMPLETED",
            JobOutcome::TimedOut { .. } => "TIMEOUT",
            JobOutcome::SubmissionFailed { .. } => "SUBMISSION FAILED",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, JobOutcome::TimedOut { .. })
    }
}

/// Renders the text that follows `STATUS: ` in a log record.
impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Completed { .. } => write!(f, "COMPLETED"),
            JobOutcome::TimedOut { deadline } => {
                write!(f, "TIMEOUT (exceeded {} seconds)", deadline.as_secs())
            }
            JobOutcome::SubmissionFailed { reason } => write!(f, "SUBMISSION FAILED ({reason})"),
        }
    }
}
