//! Waiting on a run to leave the queued / in-progress states.

use std::time::Duration;

use bon::Builder;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::agents::{AgentService, Run};
use crate::error::BridgeError;
use crate::util::timeout::with_deadline;

/// How to poll a run until it reaches a terminal status.
///
/// The default polls every second with no growth and gives up after five
/// minutes. Policies are checked with [`PollPolicy::validate`] before use.
#[derive(Debug, Clone, Builder)]
pub struct PollPolicy {
    /// Delay before the first re-fetch.
    #[builder(default = Duration::from_secs(1))]
    pub interval: Duration,
    /// Upper bound for the delay between re-fetches.
    #[builder(default = Duration::from_secs(1))]
    pub max_interval: Duration,
    /// Growth factor applied to the delay after each re-fetch.
    #[builder(default = 1.0)]
    pub multiplier: f64,
    /// Total time allowed for the run to finish.
    #[builder(default = Duration::from_secs(300))]
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PollPolicy {
    /// Reject policies that would spin without pausing or shrink the delay.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.interval.is_zero() {
            return Err(BridgeError::Configuration(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(BridgeError::Configuration(format!(
                "poll multiplier must be a number >= 1.0, got {}",
                self.multiplier
            )));
        }
        if self.max_interval < self.interval {
            return Err(BridgeError::Configuration(format!(
                "poll max interval {:?} is below interval {:?}",
                self.max_interval, self.interval
            )));
        }
        if self.timeout.is_zero() {
            return Err(BridgeError::Configuration(
                "poll timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Poll `run` until its status is no longer pending.
    ///
    /// Returns [`BridgeError::RunTimedOut`] if the run is still pending when
    /// the policy's timeout elapses, and [`BridgeError::Configuration`] for an
    /// invalid policy.
    pub async fn wait_for_terminal(
        &self,
        service: &dyn AgentService,
        mut run: Run,
    ) -> Result<Run, BridgeError> {
        self.validate()?;

        let deadline = after(Instant::now(), self.timeout);
        let mut delay = self.interval;
        let mut polls = 0u32;

        while run.status.is_pending() {
            if Instant::now() >= deadline {
                return Err(self.gave_up(&run, polls));
            }
            tokio::time::sleep_until(deadline.min(after(Instant::now(), delay))).await;

            run = match with_deadline(deadline, service.get_run(&run.thread_id, &run.id)).await {
                Ok(next) => next,
                Err(BridgeError::Timeout(_)) => return Err(self.gave_up(&run, polls)),
                Err(e) => return Err(e),
            };
            polls += 1;
            debug!(run_id = %run.id, status = %run.status, polls, "polled run");
            delay = self.next_delay(delay);
        }

        Ok(run)
    }

    fn gave_up(&self, run: &Run, polls: u32) -> BridgeError {
        let timeout_ms = self.timeout.as_millis() as u64;
        warn!(run_id = %run.id, status = %run.status, polls, timeout_ms, "gave up waiting for run");
        BridgeError::RunTimedOut {
            run_id: run.id.clone(),
            last_status: run.status.to_string(),
            polls,
            timeout_ms,
        }
    }

    fn next_delay(&self, current: Duration) -> Duration {
        let grown = (current.as_secs_f64() * self.multiplier.max(1.0))
            .min(self.max_interval.as_secs_f64());
        Duration::from_secs_f64(grown).max(self.interval)
    }
}

/// `start + wait`, saturating at roughly thirty years out.
fn after(start: Instant, wait: Duration) -> Instant {
    start
        .checked_add(wait)
        .unwrap_or_else(|| start + Duration::from_secs(86_400 * 365 * 30))
}
