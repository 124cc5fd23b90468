use std::sync::Arc;
use std::time::Duration;

use dispatch_core::ThrottleSettings;
use dispatch_logging::{dispatch_debug, dispatch_info, dispatch_warn};

use crate::RemoteScheduler;

/// How an admission wait went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleWait {
    pub samples: u32,
    pub waited: Duration,
    /// The last sample failed and admission went ahead anyway.
    pub failed_open: bool,
}

/// Delays admission while the scheduler's pending backlog is above a ceiling.
///
/// Advisory only: jobs already admitted are never held back, and a failed
/// sample lets the job through.
pub struct QueueThrottle {
    scheduler: Arc<dyn RemoteScheduler>,
    ceiling: u64,
    settings: ThrottleSettings,
}

impl QueueThrottle {
    pub fn new(scheduler: Arc<dyn RemoteScheduler>, ceiling: u64, settings: ThrottleSettings) -> Self {
        Self {
            scheduler,
            ceiling,
            settings,
        }
    }

    /// Returns once a sample is at or below the ceiling, or a sample fails.
    pub async fn wait_for_headroom(&self) -> ThrottleWait {
        let mut backoff = self.settings.initial_backoff();
        let max_backoff = self.settings.max_backoff();
        let mut wait = ThrottleWait {
            samples: 0,
            waited: Duration::ZERO,
            failed_open: false,
        };

        loop {
            wait.samples += 1;
            match self.scheduler.queue_depth().await {
                Ok(depth) if depth > self.ceiling => {
                    if wait.samples == 1 {
                        dispatch_info!(
                            "Remote queue has {} pending jobs (ceiling {}); holding admission",
                            depth,
                            self.ceiling
                        );
                    } else {
                        dispatch_debug!("Remote queue still at {}; next sample in {:?}", depth, backoff);
                    }
                    tokio::time::sleep(backoff).await;
                    wait.waited += backoff;
                    backoff = (backoff * 2).min(max_backoff);
                }
                Ok(_) => return wait,
                Err(err) => {
                    dispatch_warn!("Queue depth sample failed, admitting anyway: {}", err);
                    wait.failed_open = true;
                    return wait;
                }
            }
        }
    }
}
