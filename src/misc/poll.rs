use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Interval and attempt cap for a loop that waits on the fan by polling it.
#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct PollSettings {
    #[serde(with = "super::serde::millis", rename = "interval_ms")]
    pub interval: Duration,
    pub max_attempts: u32,
}

/// Bounds a "sleep, observe, repeat" loop.
///
/// The caller owns the loop condition and the observation, the poller only
/// sleeps between iterations and gives up once the attempt cap is reached.
///
/// ```ignore
/// let mut poller = Poller::new(settings);
/// while fan.state().door_in_process {
///     poller.tick().await?;
///     fan.refresh_state().await?;
/// }
/// ```
#[derive(Debug)]
pub struct Poller {
    settings: PollSettings,
    attempts: u32,
}

impl PollSettings {
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

impl Poller {
    pub fn new(settings: PollSettings) -> Self {
        Self {
            settings,
            attempts: 0,
        }
    }

    /// Sleeps for one interval, failing with [`Error::Unsettled`] instead if the
    /// attempt cap has already been used up.
    pub async fn tick(&mut self) -> Result<()> {
        self.attempt()?;
        self.wait().await;
        Ok(())
    }

    /// Counts one attempt without sleeping.
    pub fn attempt(&mut self) -> Result<()> {
        if self.attempts >= self.settings.max_attempts {
            return Err(Error::Unsettled {
                attempts: self.attempts,
            });
        }

        self.attempts += 1;
        tracing::trace!("Poll {}/{}", self.attempts, self.settings.max_attempts);

        Ok(())
    }

    pub async fn wait(&self) {
        tokio::time::sleep(self.settings.interval).await;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
