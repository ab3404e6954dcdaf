use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, FromRepr};

use crate::misc::serde::deserialize_flag;

/// Highest speed for models that are missing from [`MAX_SPEEDS`].
pub const FALLBACK_MAX_SPEED: u8 = 10;

/// Highest supported speed, keyed by the `model` string reported by the fan.
pub const MAX_SPEEDS: [(&str, u8); 7] = [
    ("1.6e", 7),
    ("2.5e", 7),
    ("3.2e", 7),
    ("3.5e", 10),
    ("4.4e", 7),
    ("5.0e", 10),
    ("5.5e", 10),
];

/// Raw command codes accepted by `fanspd.cgi?dir=`.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Display, Eq, FromRepr, PartialEq)]
pub enum Command {
    /// Also powers the fan on when it is off.
    SpeedUp = 1,
    /// Adds one hour to the shutoff timer.
    AddHour = 2,
    /// Never goes below speed 1.
    SlowDown = 3,
    PowerOff = 4,
}

/// High-level operations, for hosts that drive the fan from data.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum FanInstruction {
    SetPower(bool),
    SetSpeed(u8),
    SpeedUp,
    SlowDown,
    AddTimerHour,
    Refresh,
}

/// Snapshot of `status.json.cgi`.
///
/// Only the fields the client acts on are typed, the rest of the payload is
/// kept as-is in `extra`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DeviceState {
    #[serde(rename = "fanspd")]
    pub fan_speed: u8,
    #[serde(rename = "doorinprocess", deserialize_with = "deserialize_flag", default)]
    pub door_in_process: bool,
    #[serde(default)]
    pub model: String,
    /// Minutes until the shutoff timer turns the fan off.
    #[serde(rename = "timeremaining", default)]
    pub time_remaining: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Where the fan sits in its power-on sequence, as seen by the last snapshot.
///
/// Speed adjustments are not visible here, they only exist while
/// [`Fan::set_speed`](super::Fan::set_speed) is stepping.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    Off,
    DoorOpening,
    Running(u8),
}

impl Command {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Command::from_repr(code).ok_or(code)
    }
}

impl DeviceState {
    /// Free-text field that the firmware fills with unescaped debug output.
    pub const DIAGNOSTIC_FIELD: &str = "server_response";

    pub fn is_on(&self) -> bool {
        self.fan_speed != 0
    }

    pub fn max_speed(&self) -> u8 {
        max_speed(&self.model)
    }

    pub fn phase(&self) -> Phase {
        if self.door_in_process {
            Phase::DoorOpening
        } else if self.fan_speed == 0 {
            Phase::Off
        } else {
            Phase::Running(self.fan_speed)
        }
    }
}

pub fn max_speed(model: &str) -> u8 {
    MAX_SPEEDS
        .iter()
        .find(|(name, _)| *name == model)
        .map_or(FALLBACK_MAX_SPEED, |(_, max)| *max)
}
