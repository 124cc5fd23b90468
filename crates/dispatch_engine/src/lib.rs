//! Dispatch engine: process execution, admission control and the run loop.
mod discover;
mod dispatcher;
mod limiter;
mod persist;
mod progress;
mod runner;
mod scheduler;
mod throttle;
mod types;

pub use discover::discover_inputs;
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use limiter::{ConcurrencyLimiter, SlotPermit};
pub use persist::{ensure_log_dir, LogWriter, PersistError};
pub use progress::{ProgressLine, ProgressReporter, ProgressSink, StdoutProgressSink};
pub use runner::{local_timestamp, JobRunner, ProcessRunner, RunnerSettings, TIMESTAMP_FORMAT};
pub use scheduler::{
    count_pending_jobs, scheduler_for, LocalScheduler, LsfScheduler, RemoteScheduler,
};
pub use throttle::{QueueThrottle, ThrottleWait};
pub use types::{DispatchError, RunReport, RunSummary, SchedulerError};
