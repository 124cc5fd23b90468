use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dispatch_core::{CommandLine, HostSet, LsfSettings, SchedulerKind};
use tokio::process::Command;

use crate::SchedulerError;

/// Upper bound on one queue-depth query; a hung query counts as a failed sample.
const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// The two primitives the dispatcher needs from a cluster scheduler.
#[async_trait]
pub trait RemoteScheduler: Send + Sync {
    /// Command line that runs `command` through the scheduler, blocking until
    /// the remote job ends.
    fn submission(&self, command: &CommandLine, hosts: &HostSet) -> CommandLine;

    /// Number of jobs currently pending in the scheduler.
    async fn queue_depth(&self) -> Result<u64, SchedulerError>;
}

pub fn scheduler_for(kind: &SchedulerKind) -> Arc<dyn RemoteScheduler> {
    match kind {
        SchedulerKind::Local => Arc::new(LocalScheduler),
        SchedulerKind::Lsf(settings) => Arc::new(LsfScheduler::new(settings.clone())),
    }
}

/// Runs commands on this machine; there is never a backlog.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalScheduler;

#[async_trait]
impl RemoteScheduler for LocalScheduler {
    fn submission(&self, command: &CommandLine, _hosts: &HostSet) -> CommandLine {
        command.clone()
    }

    async fn queue_depth(&self) -> Result<u64, SchedulerError> {
        Ok(0)
    }
}

/// IBM Spectrum LSF through `bsub -I` and `bjobs -p`.
#[derive(Debug, Clone)]
pub struct LsfScheduler {
    settings: LsfSettings,
}

impl LsfScheduler {
    pub fn new(settings: LsfSettings) -> Self {
        Self { settings }
    }

    pub fn query_command(&self) -> CommandLine {
        let mut cmd = CommandLine::new(&self.settings.query_program).args(["-p", "-noheader"]);
        if self.settings.all_users {
            cmd = cmd.args(["-u", "all"]);
        }
        if let Some(queue) = &self.settings.queue {
            cmd = cmd.arg("-q").arg(queue);
        }
        cmd
    }
}

#[async_trait]
impl RemoteScheduler for LsfScheduler {
    fn submission(&self, command: &CommandLine, hosts: &HostSet) -> CommandLine {
        let mut submit = CommandLine::new(&self.settings.submit_program).arg("-I");
        if let Some(queue) = &self.settings.queue {
            submit = submit.arg("-q").arg(queue);
        }
        if !hosts.is_empty() {
            submit = submit.arg("-m").arg(hosts.joined());
        }
        submit
            .args(self.settings.extra_submit_args.iter().cloned())
            .arg(&command.program)
            .args(command.args.iter().cloned())
    }

    async fn queue_depth(&self) -> Result<u64, SchedulerError> {
        let query = self.query_command();
        let mut cmd = Command::new(&query.program);
        cmd.args(&query.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        let output = tokio::time::timeout(QUERY_TIMEOUT, cmd.output())
            .await
            .map_err(|_| SchedulerError::Timeout {
                program: query.program.clone(),
                secs: QUERY_TIMEOUT.as_secs(),
            })?
            .map_err(|source| SchedulerError::Spawn {
                program: query.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if output.status.success() {
            return Ok(count_pending_jobs(&stdout));
        }
        // bjobs reports an empty selection as an error on some versions.
        if stdout.contains("No pending job found") || stderr.contains("No pending job found") {
            return Ok(0);
        }
        Err(SchedulerError::Status {
            program: query.program,
            code: output.status.code(),
            stderr: stderr.trim().to_string(),
        })
    }
}

/// Counts job rows in `bjobs -p` output. Pending-reason lines are indented
/// under their job and are not counted.
pub fn count_pending_jobs(stdout: &str) -> u64 {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.starts_with(char::is_whitespace))
        .filter(|line| !line.starts_with("JOBID") && !line.starts_with("No pending job"))
        .count() as u64
}
