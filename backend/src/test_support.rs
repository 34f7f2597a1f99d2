//! Shared test doubles for unit tests inside the crate.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use tokio::sync::Notify;
use url::Url;

use crate::domain::ports::AccessGrant;
use crate::domain::{BackoffJitter, PollSleeper};

/// Fixed instant used as "now" across tests.
pub fn start_of_shift() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 3, 14, 22, 0, 0).single() {
        Some(now) => now,
        None => panic!("valid fixture timestamp"),
    }
}

/// Grant for a fake org.
pub fn sample_grant(token: &str) -> AccessGrant {
    let url = match Url::parse("https://nightdesk-dev.my.salesforce.com") {
        Ok(url) => url,
        Err(error) => panic!("fixture url: {error}"),
    };
    AccessGrant::new(token, url)
}

/// Clock whose time only moves when a test says so.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => panic!("failed to convert Duration to TimeDelta: {error}"),
        };
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Sleeper that records every requested delay and returns after one yield.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
    recorded: Notify,
}

impl RecordingSleeper {
    /// Wait until `count` delays were recorded and return the first `count`.
    pub async fn wait_for(&self, count: usize) -> Vec<Duration> {
        loop {
            {
                let delays = self.lock_delays();
                if delays.len() >= count {
                    return delays[..count].to_vec();
                }
            }
            self.recorded.notified().await;
        }
    }

    fn lock_delays(&self) -> std::sync::MutexGuard<'_, Vec<Duration>> {
        match self.delays.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("sleeper mutex"),
        }
    }
}

#[async_trait]
impl PollSleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.lock_delays().push(duration);
        self.recorded.notify_one();
        tokio::task::yield_now().await;
    }
}

/// Jitter strategy returning the base delay unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl BackoffJitter for NoJitter {
    fn jittered_delay(&self, base: Duration, _attempt: u32) -> Duration {
        base
    }
}
