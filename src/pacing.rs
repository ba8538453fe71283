//! Request pacing.
//!
//! The remote search portal blocks clients that hammer it, so every page,
//! day and article is followed by a pause. [`Pacer`] enforces a minimum
//! interval per [`Pause`] kind: time already spent since the previous pause
//! counts toward the wait.

use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Configured pause lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Wait before retrying a request that failed at the transport level.
    pub transport_cooldown: Duration,
    /// Between two result pages of the same day.
    pub page_delay: Duration,
    /// After the last result page of a day.
    pub day_delay: Duration,
    /// After every article fetch, successful or not.
    pub article_delay: Duration,
}

impl PacingPolicy {
    /// No pauses at all.
    #[cfg(test)]
    pub fn none() -> Self {
        Self {
            transport_cooldown: Duration::ZERO,
            page_delay: Duration::ZERO,
            day_delay: Duration::ZERO,
            article_delay: Duration::ZERO,
        }
    }

    pub fn delay_for(&self, pause: Pause) -> Duration {
        match pause {
            Pause::Page => self.page_delay,
            Pause::Day => self.day_delay,
            Pause::Article => self.article_delay,
        }
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            transport_cooldown: Duration::from_secs(300),
            page_delay: Duration::from_secs(10),
            day_delay: Duration::from_secs(10),
            article_delay: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    Page,
    Day,
    Article,
}

/// Minimum-interval limiter driven by a [`PacingPolicy`].
#[derive(Debug)]
pub struct Pacer {
    policy: PacingPolicy,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(policy: PacingPolicy) -> Self {
        Self { policy, last: None }
    }

    /// Wait out whatever remains of the interval for `pause`.
    pub async fn pause(&mut self, pause: Pause) {
        let wait = self.remaining(pause, Instant::now());
        if !wait.is_zero() {
            debug!(?pause, ?wait, "Pausing");
            sleep(wait).await;
        }
        self.last = Some(Instant::now());
    }

    fn remaining(&self, pause: Pause, now: Instant) -> Duration {
        let delay = self.policy.delay_for(pause);
        match self.last {
            Some(last) => delay.saturating_sub(now.saturating_duration_since(last)),
            None => delay,
        }
    }
}
