use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use dispatch_core::{DispatchState, Job, JobId, JobOutcome};
use dispatch_logging::{dispatch_debug, dispatch_warn};

/// One operator-facing completion line. The status travels with it for sinks
/// that want it but is not part of the printed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressLine {
    pub completed: usize,
    pub total: usize,
    pub job_id: JobId,
    pub file: String,
    pub status: &'static str,
}

impl fmt::Display for ProgressLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "completed {} of {}: {}", self.completed, self.total, self.file)
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, line: &ProgressLine);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutProgressSink;

impl ProgressSink for StdoutProgressSink {
    fn emit(&self, line: &ProgressLine) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }
}

/// Counts completions and emits one line per job. The count and the emission
/// happen under the same lock, so lines never interleave and each count value
/// is printed exactly once.
pub struct ProgressReporter {
    state: Mutex<DispatchState>,
    sink: Arc<dyn ProgressSink>,
}

impl ProgressReporter {
    pub fn new(total: usize, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            state: Mutex::new(DispatchState::new(total)),
            sink,
        }
    }

    pub fn report(&self, job: &Job, outcome: &JobOutcome) -> Option<usize> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(completed) = state.complete_one() else {
            dispatch_warn!("job {} reported after all {} jobs were counted", job.id, state.total());
            return None;
        };
        let line = ProgressLine {
            completed,
            total: state.total(),
            job_id: job.id,
            file: job.display_name(),
            status: outcome.label(),
        };
        self.sink.emit(&line);
        dispatch_debug!("{} ({})", line, line.status);
        Some(completed)
    }

    pub fn snapshot(&self) -> DispatchState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
