use std::fmt;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dispatch_core::{CommandLine, HostSet, Job, JobOutcome};
use dispatch_logging::{dispatch_debug, dispatch_warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{RemoteScheduler, RunReport};

/// Timestamp layout of the `Started at:` / `Finished at:` lines.
pub const TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

pub fn local_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Clone)]
pub struct RunnerSettings {
    /// Time between SIGTERM and SIGKILL when a deadline expires.
    pub kill_grace: Duration,
    /// How long to keep reading output after the process exits, for
    /// descendants that inherited the pipes.
    pub output_linger: Duration,
    pub max_output_bytes: usize,
    pub clock: Arc<dyn Fn() -> String + Send + Sync>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            kill_grace: Duration::from_secs(5),
            output_linger: Duration::from_secs(5),
            max_output_bytes: 64 * 1024 * 1024,
            clock: Arc::new(local_timestamp),
        }
    }
}

impl fmt::Debug for RunnerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnerSettings")
            .field("kill_grace", &self.kill_grace)
            .field("output_linger", &self.output_linger)
            .field("max_output_bytes", &self.max_output_bytes)
            .finish_non_exhaustive()
    }
}

/// Executes one job to an outcome. Never fails: every problem becomes part of
/// the returned report.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, job: &Job) -> RunReport;
}

/// Runs the job's command through a scheduler submission under the job's
/// wall-clock deadline.
pub struct ProcessRunner {
    scheduler: Arc<dyn RemoteScheduler>,
    hosts: HostSet,
    settings: RunnerSettings,
}

impl ProcessRunner {
    pub fn new(scheduler: Arc<dyn RemoteScheduler>, hosts: HostSet, settings: RunnerSettings) -> Self {
        Self {
            scheduler,
            hosts,
            settings,
        }
    }

    async fn execute(&self, command: &CommandLine, deadline: Duration) -> (JobOutcome, String) {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so a timeout can take down every descendant.
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                let reason = format!("cannot start {}: {err}", command.program);
                return (JobOutcome::SubmissionFailed { reason }, String::new());
            }
        };

        let capture = OutputCapture::start(&mut child, self.settings.max_output_bytes);

        // The outcome comes straight from this wait; nothing runs in between.
        let waited = tokio::time::timeout(deadline, child.wait()).await;
        let outcome = match waited {
            Ok(Ok(status)) => JobOutcome::Completed {
                exit_code: status.code(),
            },
            Ok(Err(err)) => JobOutcome::SubmissionFailed {
                reason: format!("waiting on {} failed: {err}", command.program),
            },
            Err(_elapsed) => {
                self.terminate(&mut child).await;
                JobOutcome::TimedOut { deadline }
            }
        };

        let output = capture.finish(self.settings.output_linger).await;
        (outcome, output)
    }

    async fn terminate(&self, child: &mut Child) {
        #[cfg(unix)]
        if let Some(pid) = child.id() {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            let group = Pid::from_raw(pid as i32);
            let _ = killpg(group, Signal::SIGTERM);
            let exited = tokio::time::timeout(self.settings.kill_grace, child.wait())
                .await
                .is_ok();
            // Stragglers in the group get no grace.
            let _ = killpg(group, Signal::SIGKILL);
            if exited {
                return;
            }
        }
        if let Err(err) = child.start_kill() {
            dispatch_debug!("kill after deadline: {}", err);
        }
        if let Err(err) = child.wait().await {
            dispatch_warn!("could not reap timed-out child: {}", err);
        }
    }
}

#[async_trait]
impl JobRunner for ProcessRunner {
    async fn run(&self, job: &Job) -> RunReport {
        let command = self.scheduler.submission(&job.command, &self.hosts);
        let started_at = (self.settings.clock)();
        dispatch_debug!("job {} running: {}", job.id, command);

        let (outcome, output) = self.execute(&command, job.deadline).await;

        let finished_at = (self.settings.clock)();
        dispatch_debug!("job {} finished: {}", job.id, outcome);
        RunReport {
            command,
            output,
            outcome,
            started_at,
            finished_at,
        }
    }
}

const TRUNCATION_MARKER: &str = "[output truncated]\n";
const CUT_OFF_MARKER: &str = "[output capture stopped: pipes still held open]\n";
/// Longest piece forwarded at once; longer lines arrive split.
const MAX_CHUNK: u64 = 64 * 1024;

/// stdout and stderr merged line by line in arrival order.
struct OutputCapture {
    readers: Vec<JoinHandle<()>>,
    collector: JoinHandle<String>,
}

impl OutputCapture {
    fn start(child: &mut Child, limit: usize) -> Self {
        let (tx, rx) = mpsc::channel(64);
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(forward_lines(stdout, tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(forward_lines(stderr, tx.clone())));
        }
        drop(tx);
        let collector = tokio::spawn(collect(rx, limit));
        Self { readers, collector }
    }

    async fn finish(mut self, linger: Duration) -> String {
        let drained = tokio::time::timeout(linger, async {
            for reader in &mut self.readers {
                let _ = reader.await;
            }
        })
        .await
        .is_ok();
        for reader in &self.readers {
            reader.abort();
        }
        let mut output = self.collector.await.unwrap_or_default();
        if !drained {
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(CUT_OFF_MARKER);
        }
        output
    }
}

async fn forward_lines<R>(stream: R, tx: mpsc::Sender<Vec<u8>>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    loop {
        let mut chunk = Vec::new();
        match (&mut reader)
            .take(MAX_CHUNK)
            .read_until(b'\n', &mut chunk)
            .await
        {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                if tx.send(chunk).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Keeps at most `limit` bytes but drains everything, so a chatty child never
/// blocks on a full pipe.
async fn collect(mut rx: mpsc::Receiver<Vec<u8>>, limit: usize) -> String {
    let mut output = Vec::new();
    let mut truncated = false;
    while let Some(chunk) = rx.recv().await {
        if truncated {
            continue;
        }
        if output.len() + chunk.len() > limit {
            truncated = true;
            continue;
        }
        output.extend_from_slice(&chunk);
    }
    let mut output = String::from_utf8_lossy(&output).into_owned();
    if truncated {
        if !output.ends_with('\n') && !output.is_empty() {
            output.push('\n');
        }
        output.push_str(TRUNCATION_MARKER);
    }
    output
}
