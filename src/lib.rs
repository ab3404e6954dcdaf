//! Client for AirScape whole house fans.
//!
//! The fan exposes a status page and a command endpoint over plain HTTP on the
//! local network. [`Fan`] keeps the last status it read and layers on/off and
//! speed control on top of the raw command codes, waiting out the damper doors
//! and the time the fan takes to apply each speed step.
//!
//! ```no_run
//! # async fn demo() -> airscape::Result<()> {
//! use std::time::Duration;
//!
//! let mut fan = airscape::Fan::connect("192.168.1.40", Duration::from_secs(5)).await?;
//!
//! fan.set_speed(3).await?;
//! fan.add_timer_hour().await?;
//!
//! println!("{fan} running at {}/{}", fan.speed(), fan.max_speed());
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod fan;
mod misc;

pub use config::FanConfig;
pub use error::{Error, Result};
pub use fan::{
    Fan,
    defs::{Command, DeviceState, FALLBACK_MAX_SPEED, FanInstruction, MAX_SPEEDS, Phase, max_speed},
    protocol::{parse_status, sanitize_status},
};
pub use misc::poll::PollSettings;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
