//! Background refresh cycle for the dashboard.
//!
//! The poller fetches everything once on start, then waits for whichever
//! comes first of shutdown, a reconcile request (followed by a short settle
//! delay) and the poll delay, checked in that order. The delay is the base
//! interval unless the last cycle failed for every collection, in which case
//! it grows exponentially with jitter up to `max_backoff`. One good cycle
//! resets it.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::TraceId;
use super::dashboard::DashboardService;

/// Default base poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
/// Default settle delay between a reconcile request and the re-fetch.
pub const DEFAULT_RECONCILE_DELAY: Duration = Duration::from_millis(1000);
/// Default ceiling for the backoff delay.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Timing parameters for [`RefreshPoller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Delay between cycles while the CRM answers.
    pub interval: Duration,
    /// Delay between a reconcile request and the re-fetch.
    pub reconcile_delay: Duration,
    /// Upper bound for backed-off delays.
    pub max_backoff: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            reconcile_delay: DEFAULT_RECONCILE_DELAY,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl PollerConfig {
    /// Delay before the next cycle after `failed_cycles` consecutive
    /// total-failure cycles.
    ///
    /// ```
    /// use std::time::Duration;
    /// use nightdesk::domain::PollerConfig;
    ///
    /// let config = PollerConfig::default();
    /// assert_eq!(config.backoff_base(0), Duration::from_secs(30));
    /// assert_eq!(config.backoff_base(2), Duration::from_secs(120));
    /// assert_eq!(config.backoff_base(9), Duration::from_secs(300));
    /// ```
    pub fn backoff_base(&self, failed_cycles: u32) -> Duration {
        if failed_cycles == 0 {
            return self.interval;
        }
        let factor = 2_u32.saturating_pow(failed_cycles.min(16));
        self.interval
            .saturating_mul(factor)
            .min(self.max_backoff.max(self.interval))
    }

    fn next_delay(&self, failed_cycles: u32, jitter: &dyn BackoffJitter) -> Duration {
        let base = self.backoff_base(failed_cycles);
        if failed_cycles == 0 {
            return base;
        }
        jitter
            .jittered_delay(base, failed_cycles)
            .min(self.max_backoff.max(self.interval))
    }
}

/// Async sleep abstraction so tests control time.
#[async_trait]
pub trait PollSleeper: Send + Sync {
    /// Suspend for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Jitter applied to backed-off delays.
pub trait BackoffJitter: Send + Sync {
    /// Return a delay derived from `base` for the given failure streak.
    fn jittered_delay(&self, base: Duration, attempt: u32) -> Duration;
}

/// Tokio-based sleeper.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl PollSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Adds up to a quarter of the base delay, drawn from a small PRNG.
pub struct RandomJitter {
    rng: Mutex<SmallRng>,
}

impl Default for RandomJitter {
    fn default() -> Self {
        Self {
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }
}

impl BackoffJitter for RandomJitter {
    fn jittered_delay(&self, base: Duration, _attempt: u32) -> Duration {
        let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        let max_extra = base_ms / 4;
        if max_extra == 0 {
            return base;
        }
        let extra = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(0..=max_extra);
        Duration::from_millis(base_ms.saturating_add(extra))
    }
}

/// Drives [`DashboardService::refresh_all`] on a schedule.
pub struct RefreshPoller {
    dashboard: Arc<DashboardService>,
    config: PollerConfig,
    sleeper: Arc<dyn PollSleeper>,
    jitter: Arc<dyn BackoffJitter>,
}

impl RefreshPoller {
    /// Build a poller with Tokio sleeps and random jitter.
    pub fn new(dashboard: Arc<DashboardService>, config: PollerConfig) -> Self {
        Self::with_runtime(
            dashboard,
            config,
            Arc::new(TokioSleeper),
            Arc::new(RandomJitter::default()),
        )
    }

    /// Build a poller with explicit sleep and jitter strategies.
    pub fn with_runtime(
        dashboard: Arc<DashboardService>,
        config: PollerConfig,
        sleeper: Arc<dyn PollSleeper>,
        jitter: Arc<dyn BackoffJitter>,
    ) -> Self {
        Self {
            dashboard,
            config,
            sleeper,
            jitter,
        }
    }

    /// Start the loop on the current Tokio runtime.
    pub fn spawn(self) -> PollerHandle {
        let (shutdown, receiver) = watch::channel(false);
        let task = tokio::spawn(self.run(receiver));
        PollerHandle { shutdown, task }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            "dashboard poller started"
        );
        let mut failed_cycles = 0_u32;
        while !*shutdown.borrow() {
            let report = TraceId::scope(TraceId::generate(), self.dashboard.refresh_all()).await;
            failed_cycles = if report.all_failed() {
                failed_cycles.saturating_add(1)
            } else {
                0
            };
            let delay = self.config.next_delay(failed_cycles, self.jitter.as_ref());
            if failed_cycles > 0 {
                warn!(
                    failed_cycles,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "CRM unreachable; backing off"
                );
            }

            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                () = self.dashboard.reconcile_requested() => {
                    debug!("reconcile requested");
                    tokio::select! {
                        biased;
                        _ = shutdown.changed() => break,
                        () = self.sleeper.sleep(self.config.reconcile_delay) => {}
                    }
                }
                () = self.sleeper.sleep(delay) => {}
            }
        }
        info!("dashboard poller stopped");
    }
}

/// Handle to a running poller.
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Signal the loop to stop and wait for it. In-flight CRM calls of the
    /// current cycle are not cancelled.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(error) = self.task.await {
            warn!(%error, "dashboard poller task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{DisconnectedCrmGateway, MockCrmGateway};
    use crate::test_support::{MutableClock, NoJitter, RecordingSleeper, start_of_shift};
    use rstest::rstest;

    fn config() -> PollerConfig {
        PollerConfig::default()
    }

    fn dashboard(crm: impl crate::domain::ports::CrmGateway + 'static) -> Arc<DashboardService> {
        Arc::new(DashboardService::new(
            Arc::new(crm),
            Arc::new(MutableClock::new(start_of_shift())),
        ))
    }

    #[rstest]
    #[case(0, 30)]
    #[case(1, 60)]
    #[case(3, 240)]
    #[case(4, 300)]
    #[case(u32::MAX, 300)]
    fn backoff_doubles_until_capped(#[case] failed_cycles: u32, #[case] expected_secs: u64) {
        assert_eq!(
            config().backoff_base(failed_cycles),
            Duration::from_secs(expected_secs)
        );
    }

    #[test]
    fn jitter_never_exceeds_the_cap() {
        let jitter = RandomJitter::default();
        for _ in 0..32 {
            let delay = config().next_delay(8, &jitter);
            assert!(delay <= DEFAULT_MAX_BACKOFF);
        }
    }

    #[test]
    fn random_jitter_stays_within_a_quarter() {
        let jitter = RandomJitter::default();
        let base = Duration::from_secs(40);
        for attempt in 1..32 {
            let delay = jitter.jittered_delay(base, attempt);
            assert!(delay >= base && delay <= Duration::from_secs(50));
        }
    }

    #[tokio::test]
    async fn unreachable_crm_backs_off_between_cycles() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let handle = RefreshPoller::with_runtime(
            dashboard(DisconnectedCrmGateway),
            config(),
            sleeper.clone(),
            Arc::new(NoJitter),
        )
        .spawn();

        let delays = sleeper.wait_for(3).await;
        handle.shutdown().await;

        assert_eq!(
            delays,
            [
                Duration::from_secs(60),
                Duration::from_secs(120),
                Duration::from_secs(240)
            ]
        );
    }

    #[tokio::test]
    async fn healthy_cycles_use_the_base_interval() {
        let mut crm = MockCrmGateway::new();
        crm.expect_query().returning(|_| Ok(Vec::new()));
        let sleeper = Arc::new(RecordingSleeper::default());
        let handle = RefreshPoller::with_runtime(
            dashboard(crm),
            config(),
            sleeper.clone(),
            Arc::new(NoJitter),
        )
        .spawn();

        let delays = sleeper.wait_for(2).await;
        handle.shutdown().await;

        assert_eq!(delays, [DEFAULT_POLL_INTERVAL, DEFAULT_POLL_INTERVAL]);
    }

    #[tokio::test]
    async fn reconcile_request_triggers_refetch_after_settle_delay() {
        let mut crm = MockCrmGateway::new();
        crm.expect_query().returning(|_| Ok(Vec::new()));
        let service = dashboard(crm);
        service.request_reconcile();
        let sleeper = Arc::new(RecordingSleeper::default());
        let handle = RefreshPoller::with_runtime(
            service,
            config(),
            sleeper.clone(),
            Arc::new(NoJitter),
        )
        .spawn();

        let delays = sleeper.wait_for(2).await;
        handle.shutdown().await;

        assert_eq!(delays, [DEFAULT_RECONCILE_DELAY, DEFAULT_POLL_INTERVAL]);
    }
}
