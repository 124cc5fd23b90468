use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dispatch_core::{
    has_terminal_status, DispatchPhase, HostSet, Job, JobSpecBuilder, Profile, ResumePolicy,
    ThrottleSettings,
};
use dispatch_logging::{dispatch_debug, dispatch_error, dispatch_info};
use tokio::task::JoinSet;

use crate::{
    ensure_log_dir, scheduler_for, ConcurrencyLimiter, DispatchError, JobRunner, LogWriter,
    ProcessRunner, ProgressReporter, ProgressSink, QueueThrottle, RemoteScheduler, RunSummary,
    RunnerSettings,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub parallelism: usize,
    pub queue_ceiling: u64,
    pub throttle: ThrottleSettings,
    pub resume: ResumePolicy,
}

impl DispatcherConfig {
    pub fn from_profile(profile: &Profile, parallelism: usize) -> Self {
        Self {
            parallelism,
            queue_ceiling: profile.queue_ceiling,
            throttle: profile.throttle,
            resume: profile.resume,
        }
    }
}

/// Runs every job once: bounded by the limiter, admitted by the throttle,
/// logged by its own worker.
pub struct Dispatcher {
    builder: JobSpecBuilder,
    runner: Arc<dyn JobRunner>,
    limiter: ConcurrencyLimiter,
    throttle: QueueThrottle,
    sink: Arc<dyn ProgressSink>,
    resume: ResumePolicy,
    phase: DispatchPhase,
}

impl Dispatcher {
    pub fn new(
        builder: JobSpecBuilder,
        runner: Arc<dyn JobRunner>,
        scheduler: Arc<dyn RemoteScheduler>,
        sink: Arc<dyn ProgressSink>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            builder,
            runner,
            limiter: ConcurrencyLimiter::new(config.parallelism),
            throttle: QueueThrottle::new(scheduler, config.queue_ceiling, config.throttle),
            sink,
            resume: config.resume,
            phase: DispatchPhase::Idle,
        }
    }

    /// Wires the profile's scheduler into both the runner and the throttle.
    pub fn from_profile(
        profile: &Profile,
        parallelism: usize,
        hosts: HostSet,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        let scheduler = scheduler_for(&profile.scheduler);
        let settings = RunnerSettings {
            kill_grace: profile.kill_grace(),
            ..RunnerSettings::default()
        };
        let runner = Arc::new(ProcessRunner::new(scheduler.clone(), hosts, settings));
        Self::new(
            profile.job_builder(),
            runner,
            scheduler,
            sink,
            DispatcherConfig::from_profile(profile, parallelism),
        )
    }

    fn enter(&mut self, to: DispatchPhase) -> Result<(), DispatchError> {
        self.phase = self.phase.advance_to(to)?;
        dispatch_debug!("dispatcher phase: {:?}", to);
        Ok(())
    }

    pub async fn run(mut self, inputs: Vec<PathBuf>) -> Result<RunSummary, DispatchError> {
        self.enter(DispatchPhase::Enumerating)?;
        let log_dir = self.builder.log_dir().to_path_buf();
        ensure_log_dir(&log_dir)?;
        let writer = Arc::new(LogWriter::new(log_dir.clone()));
        let (jobs, skipped) = self.enumerate(&inputs, &writer)?;
        let total = jobs.len();
        dispatch_info!(
            "Dispatching {} jobs ({} skipped) with parallelism {}; logs in {}",
            total,
            skipped,
            self.limiter.capacity(),
            log_dir.display()
        );

        self.enter(DispatchPhase::Dispatching)?;
        let reporter = Arc::new(ProgressReporter::new(total, self.sink.clone()));
        let unrecorded = Arc::new(AtomicUsize::new(0));
        let mut workers = JoinSet::new();

        for job in jobs {
            let slot = self.limiter.acquire().await?;
            let wait = self.throttle.wait_for_headroom().await;
            if wait.samples > 1 {
                dispatch_debug!("job {} admitted after {:?}", job.id, wait.waited);
            }
            dispatch_debug!("starting job {} of {}: {}", job.id, total, job.display_name());

            let runner = self.runner.clone();
            let writer = writer.clone();
            let reporter = reporter.clone();
            let failed = unrecorded.clone();
            workers.spawn(async move {
                let report = runner.run(&job).await;
                let record = report.into_record(&job);
                if let Err(err) = writer.write(&job, &record) {
                    dispatch_error!("Cannot write log {}: {}", job.log_path.display(), err);
                    failed.fetch_add(1, Ordering::SeqCst);
                }
                reporter.report(&job, &record.outcome);
                drop(slot);
            });

            while let Some(joined) = workers.try_join_next() {
                note_worker_exit(joined, &unrecorded);
            }
        }

        self.enter(DispatchPhase::Draining)?;
        while let Some(joined) = workers.join_next().await {
            note_worker_exit(joined, &unrecorded);
        }

        self.enter(DispatchPhase::Done)?;
        let summary = RunSummary {
            total,
            skipped,
            unrecorded: unrecorded.load(Ordering::SeqCst),
            peak_running: self.limiter.peak(),
            log_dir,
        };
        dispatch_info!(
            "Processed {} files (peak {} running); logs in {}",
            summary.total,
            summary.peak_running,
            summary.log_dir.display()
        );
        Ok(summary)
    }

    /// Builds every job up front, fixing N. Skipped inputs are dropped before
    /// numbering so sequence numbers stay 1..=N.
    fn enumerate(
        &self,
        inputs: &[PathBuf],
        writer: &LogWriter,
    ) -> Result<(Vec<Job>, usize), DispatchError> {
        let jobs = self.builder.build_all(inputs)?;
        let discovered = jobs.len();
        let mut jobs: Vec<Job> = match self.resume {
            ResumePolicy::Rerun => jobs,
            ResumePolicy::SkipLogged => jobs
                .into_iter()
                .filter(|job| {
                    let done = writer
                        .read_existing(job)
                        .is_some_and(|content| has_terminal_status(&content));
                    if done {
                        dispatch_debug!("skipping {}: finished log present", job.display_name());
                    }
                    !done
                })
                .collect(),
        };
        for (index, job) in jobs.iter_mut().enumerate() {
            job.id = index as u64 + 1;
        }
        let skipped = discovered - jobs.len();
        Ok((jobs, skipped))
    }
}

fn note_worker_exit(joined: Result<(), tokio::task::JoinError>, unrecorded: &AtomicUsize) {
    if let Err(err) = joined {
        dispatch_error!("Worker ended abnormally: {}", err);
        unrecorded.fetch_add(1, Ordering::SeqCst);
    }
}
