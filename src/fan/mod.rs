use std::{fmt, time::Duration};

use crate::{
    Error, Result,
    config::FanConfig,
    misc::poll::{PollSettings, Poller},
};

use self::{defs::*, protocol::Link};

pub mod defs;
pub mod protocol;

/// Proxy for one AirScape fan.
///
/// Holds the last status snapshot reported by the fan. Accessors read that
/// snapshot without touching the network, every command replaces it with a
/// fresh one from the status page.
///
/// All operations take `&mut self` and run one request at a time. To share a
/// fan between tasks, wrap it in a `tokio::sync::Mutex`.
pub struct Fan {
    host: String,
    link: Link,
    state: DeviceState,

    door: PollSettings,
    speed_step: PollSettings,
}

impl Fan {
    pub async fn connect(host: &str, timeout: Duration) -> Result<Self> {
        Self::connect_from_config(&FanConfig::new(host).with_timeout(timeout)).await
    }

    /// Connects and fetches the initial status. Fails if the fan can't be reached.
    pub async fn connect_from_config(config: &FanConfig) -> Result<Self> {
        let link = Link::try_new(&config.host, config.timeout)?;
        let state = link.fetch_status().await?;

        tracing::debug!(
            "Connected to fan {} (model \"{}\", speed {})",
            config.host,
            state.model,
            state.fan_speed
        );

        Ok(Fan {
            host: config.host.clone(),
            link,
            state,
            door: config.door,
            speed_step: config.speed_step,
        })
    }

    /* == Public API == */

    pub async fn command(&mut self, instruction: FanInstruction) -> Result<()> {
        match instruction {
            FanInstruction::SetPower(on) => self.set_power(on).await,
            FanInstruction::SetSpeed(speed) => self.set_speed(speed).await,
            FanInstruction::SpeedUp => self.speed_up().await,
            FanInstruction::SlowDown => self.slow_down().await,
            FanInstruction::AddTimerHour => self.add_timer_hour().await,
            FanInstruction::Refresh => self.refresh_state().await.map(drop),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn is_on(&self) -> bool {
        self.state.is_on()
    }

    pub fn speed(&self) -> u8 {
        self.state.fan_speed
    }

    pub fn max_speed(&self) -> u8 {
        self.state.max_speed()
    }

    pub fn time_remaining(&self) -> Option<u32> {
        self.state.time_remaining
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Powers the fan on or off.
    ///
    /// Powering on waits until the damper doors have opened, the fan reports
    /// speed 0 until then. Powering off is a dedicated command, stepping the
    /// speed down stops at 1.
    pub async fn set_power(&mut self, on: bool) -> Result<()> {
        if !on {
            self.send_command(Command::PowerOff).await?;
            return Ok(());
        }

        if self.is_on() {
            return Ok(());
        }

        self.send_command(Command::SpeedUp).await?;

        let mut poller = Poller::new(self.door);

        while self.state.door_in_process {
            poller.tick().await?;
            self.refresh_state().await?;
        }

        tracing::debug!("Damper doors open after {} polls", poller.attempts());
        Ok(())
    }

    /// Steps the fan to `speed`, one command per step. Speed 0 powers off.
    ///
    /// A fan that is off is powered on first. Stepping stops early if the fan
    /// turns itself off.
    pub async fn set_speed(&mut self, speed: u8) -> Result<()> {
        if speed == 0 {
            return self.set_power(false).await;
        }

        let max = self.max_speed();
        if speed > max {
            return Err(Error::SpeedOutOfRange { speed, max });
        }

        if !self.is_on() {
            self.set_power(true).await?;
        }

        let command = if speed < self.speed() {
            Command::SlowDown
        } else {
            Command::SpeedUp
        };

        let mut poller = Poller::new(self.speed_step);

        while self.speed() != speed && self.speed() != 0 {
            poller.attempt()?;
            self.send_command(command).await?;

            // Give the fan time to apply the step before the next one
            poller.wait().await;
        }

        Ok(())
    }

    /// Raises the speed by one. Does nothing when off or at maximum speed.
    pub async fn speed_up(&mut self) -> Result<()> {
        if (1..self.max_speed()).contains(&self.speed()) {
            self.send_command(Command::SpeedUp).await?;
        }

        Ok(())
    }

    /// Lowers the speed by one. Does nothing at speed 1 or below.
    pub async fn slow_down(&mut self) -> Result<()> {
        if self.speed() > 1 {
            self.send_command(Command::SlowDown).await?;
        }

        Ok(())
    }

    /// Adds one hour to the shutoff timer.
    pub async fn add_timer_hour(&mut self) -> Result<()> {
        self.send_command(Command::AddHour).await?;
        Ok(())
    }

    /* == Device access == */

    /// Fetches the status page and replaces the cached snapshot.
    ///
    /// The snapshot is left untouched if the request or parsing fails.
    pub async fn refresh_state(&mut self) -> Result<&DeviceState> {
        self.state = self.link.fetch_status().await?;

        tracing::trace!(
            "Fan status: speed {}, door moving {}",
            self.state.fan_speed,
            self.state.door_in_process
        );

        Ok(&self.state)
    }

    /// Sends a raw command, then refreshes the snapshot.
    ///
    /// If the command goes through but the refresh fails, the error is
    /// returned even though the fan may have acted on the command.
    pub async fn send_command(&mut self, command: Command) -> Result<&DeviceState> {
        tracing::debug!("Sending {command} (dir={}) to {}", command.code(), self.host);

        self.link.send_command(command).await?;
        self.refresh_state().await
    }
}

impl fmt::Display for Fan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.state.model, self.host)
    }
}

impl fmt::Debug for Fan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fan")
            .field("host", &self.host)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
