use std::{sync::LazyLock, time::Duration};

use regex::Regex;
use reqwest::Client;

use crate::Result;

use super::defs::{Command, DeviceState};

/* === Definitions === */

/// HTTP endpoints of a single fan.
#[derive(Debug)]
pub struct Link {
    client: Client,
    status_url: String,
    command_url: String,
}

/// A status line worth keeping: `"identifier": value`.
static FIELD_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*"\w+"\s*:\s*\S"#).expect("valid field pattern"));

/* === Implementations === */

impl Link {
    const STATUS_PATH: &str = "/status.json.cgi";
    const COMMAND_PATH: &str = "/fanspd.cgi";

    pub fn try_new(host: &str, timeout: Duration) -> Result<Self> {
        // The firmware serves one connection at a time, don't hold any open
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            client,
            status_url: format!("http://{host}{}", Self::STATUS_PATH),
            command_url: format!("http://{host}{}", Self::COMMAND_PATH),
        })
    }

    pub async fn fetch_status(&self) -> Result<DeviceState> {
        let text = self
            .client
            .get(&self.status_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_status(&text)
    }

    /// Issues a command. The reply is not JSON and carries nothing the client
    /// needs, so it is discarded along with its status code. Only transport
    /// failures are errors.
    pub async fn send_command(&self, command: Command) -> Result<()> {
        let url = format!("{}?dir={}", self.command_url, command.code());

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            tracing::debug!("Ignoring status {} from {url}", response.status());
        }

        Ok(())
    }
}

/// Reduces the near-JSON status page to a JSON object.
///
/// Keeps the lines shaped like `"identifier": value` and drops the
/// `server_response` diagnostic line whatever it contains, since the firmware
/// writes raw control characters and unescaped quotes into it.
pub fn sanitize_status(raw: &str) -> String {
    let fields: Vec<&str> = raw
        .lines()
        .filter(|line| FIELD_LINE.is_match(line))
        .filter(|line| !line.contains(DeviceState::DIAGNOSTIC_FIELD))
        .map(|line| line.trim().trim_end_matches(',').trim_end())
        .collect();

    format!("{{\n{}\n}}", fields.join(",\n"))
}

pub fn parse_status(raw: &str) -> Result<DeviceState> {
    let state: DeviceState = serde_json::from_str(&sanitize_status(raw))?;

    if state.fan_speed > state.max_speed() {
        tracing::warn!(
            "Fan reports speed {} above the maximum of {} for model \"{}\"",
            state.fan_speed,
            state.max_speed(),
            state.model
        );
    }

    Ok(state)
}
