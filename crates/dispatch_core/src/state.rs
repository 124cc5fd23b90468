use thiserror::Error;

/// Lifecycle of one dispatcher run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    Idle,
    Enumerating,
    Dispatching,
    Draining,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal dispatch phase transition {from:?} -> {to:?}")]
pub struct PhaseError {
    pub from: DispatchPhase,
    pub to: DispatchPhase,
}

impl DispatchPhase {
    /// Phases only move forward, one step at a time.
    pub fn next(self) -> Option<DispatchPhase> {
        match self {
            DispatchPhase::Idle => Some(DispatchPhase::Enumerating),
            DispatchPhase::Enumerating => Some(DispatchPhase::Dispatching),
            DispatchPhase::Dispatching => Some(DispatchPhase::Draining),
            DispatchPhase::Draining => Some(DispatchPhase::Done),
            DispatchPhase::Done => None,
        }
    }

    pub fn advance_to(self, to: DispatchPhase) -> Result<DispatchPhase, PhaseError> {
        if self.next() == Some(to) {
            Ok(to)
        } else {
            Err(PhaseError { from: self, to })
        }
    }
}

/// Completion bookkeeping shared by all workers of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchState {
    completed: usize,
    total: usize,
}

impl DispatchState {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
        }
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_finished(&self) -> bool {
        self.completed == self.total
    }

    /// Records one completion and returns the new count.
    ///
    /// Returns `None` once every job has already been counted.
    pub fn complete_one(&mut self) -> Option<usize> {
        if self.completed >= self.total {
            return None;
        }
        self.completed += 1;
        Some(self.completed)
    }
}
