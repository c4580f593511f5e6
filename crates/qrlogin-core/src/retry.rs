//! Fixed-interval retry bounded by a deadline.

use std::{future::Future, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::time::{Instant, sleep};

/// Delay between consecutive poll attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(2);

/// How long a challenge stays pollable before it is regenerated.
pub const DEFAULT_POLL_WINDOW: Duration = Duration::from_secs(60);

/// Retry cadence and window for polling a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    /// Sleep after each attempt returns.
    pub interval: Duration,
    /// Measured from the first attempt, never reset.
    pub window: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RETRY_INTERVAL,
            window: DEFAULT_POLL_WINDOW,
        }
    }
}

/// Outcome of [`PollPolicy::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    /// An attempt produced a value.
    Ready { value: T, attempts: u32 },
    /// The window elapsed first.
    DeadlineElapsed { attempts: u32 },
}

impl PollPolicy {
    /// Override the retry interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Override the polling window.
    #[must_use]
    pub const fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Call `attempt` until it yields a value or the window elapses.
    ///
    /// `attempt` receives the 1-based attempt number and returns
    /// `Ok(None)` for "not yet". The window is checked before every attempt,
    /// so no attempt starts after it has elapsed; an attempt already in
    /// flight is allowed to finish. The interval is slept after each attempt
    /// returns, so slow attempts stretch the cadence instead of piling up.
    ///
    /// # Errors
    /// Returns the first error produced by `attempt`, without retrying.
    pub async fn run<T, E, F, Fut>(&self, mut attempt: F) -> Result<RetryOutcome<T>, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        let started = Instant::now();
        let mut attempts = 0_u32;

        loop {
            if started.elapsed() >= self.window {
                return Ok(RetryOutcome::DeadlineElapsed { attempts });
            }

            attempts += 1;
            if let Some(value) = attempt(attempts).await? {
                return Ok(RetryOutcome::Ready { value, attempts });
            }

            sleep(self.interval).await;
        }
    }
}
