use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::misc::poll::PollSettings;

/// Connection and timing settings for a single fan.
///
/// Designed to be embedded in a host application's own configuration file,
/// every field except `host` has a default:
///
/// ```yaml
/// host: 192.168.1.40
/// timeout_ms: 5000
/// door:
///   interval_ms: 250
///   max_attempts: 240
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct FanConfig {
    pub host: String,

    #[serde(
        default = "default_timeout",
        with = "crate::misc::serde::millis",
        rename = "timeout_ms"
    )]
    pub timeout: Duration,

    /// Waiting for the damper doors after powering on.
    #[serde(default = "default_door")]
    pub door: PollSettings,

    /// Waiting for the fan to report each single speed step.
    #[serde(default = "default_speed_step")]
    pub speed_step: PollSettings,
}

impl FanConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// About one minute of door polling.
    pub const DEFAULT_DOOR: PollSettings = PollSettings::new(Duration::from_millis(250), 240);

    /// Enough steps to cross the full speed range several times over.
    pub const DEFAULT_SPEED_STEP: PollSettings =
        PollSettings::new(Duration::from_millis(750), 40);

    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            timeout: Self::DEFAULT_TIMEOUT,
            door: Self::DEFAULT_DOOR,
            speed_step: Self::DEFAULT_SPEED_STEP,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_door(mut self, door: PollSettings) -> Self {
        self.door = door;
        self
    }

    pub fn with_speed_step(mut self, speed_step: PollSettings) -> Self {
        self.speed_step = speed_step;
        self
    }
}

const fn default_timeout() -> Duration {
    FanConfig::DEFAULT_TIMEOUT
}

const fn default_door() -> PollSettings {
    FanConfig::DEFAULT_DOOR
}

const fn default_speed_step() -> PollSettings {
    FanConfig::DEFAULT_SPEED_STEP
}
