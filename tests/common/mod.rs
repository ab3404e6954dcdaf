#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use airscape::{FanConfig, PollSettings, max_speed};
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tokio::{net::TcpListener, task::JoinHandle};

type Shared = Arc<Mutex<Device>>;

/// Emulated fan firmware, serving the same two pages as the real device.
pub struct MockFan {
    addr: SocketAddr,
    device: Shared,
    task: JoinHandle<()>,
}

#[derive(Debug)]
pub struct Device {
    pub model: String,
    pub speed: u8,
    pub door_in_process: bool,
    /// Status reads that still report the doors moving once powered on.
    pub door_polls: u32,
    pub opening_polls: u32,
    pub timer: u32,
    /// Ignore speed commands, as if the fan had stalled.
    pub frozen: bool,
    /// Turn off after this many commands, like someone pressing the wall switch.
    pub off_after: Option<usize>,
    pub status_delay: Option<Duration>,
    /// Status page delay that kicks in once a command has been received.
    pub stall_after_command: Option<Duration>,
    /// HTTP status the firmware answers commands with.
    pub command_status: StatusCode,
    pub commands: Vec<u8>,
    pub status_reads: u32,
}

#[derive(Deserialize)]
struct Dir {
    dir: u8,
}

impl MockFan {
    pub async fn start(device: Device) -> Self {
        let device = Arc::new(Mutex::new(device));

        let app = Router::new()
            .route("/status.json.cgi", get(status))
            .route("/fanspd.cgi", get(command))
            .with_state(device.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, device, task }
    }

    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    /// Short intervals so that the tests don't wait on real device timings.
    pub fn config(&self) -> FanConfig {
        FanConfig::new(self.host())
            .with_timeout(Duration::from_secs(2))
            .with_door(PollSettings::new(Duration::from_millis(1), 50))
            .with_speed_step(PollSettings::new(Duration::from_millis(1), 20))
    }

    pub fn commands(&self) -> Vec<u8> {
        self.device.lock().unwrap().commands.clone()
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut Device) -> R) -> R {
        f(&mut *self.device.lock().unwrap())
    }

    /// Stops listening, further requests are refused.
    pub async fn shutdown(self) {
        self.task.abort();
        let _ = self.task.await;
    }
}

impl Device {
    pub fn new(model: &str, speed: u8) -> Self {
        Self {
            model: model.to_owned(),
            speed,
            door_in_process: false,
            door_polls: 0,
            opening_polls: 2,
            timer: 0,
            frozen: false,
            off_after: None,
            status_delay: None,
            stall_after_command: None,
            command_status: StatusCode::OK,
            commands: Vec::new(),
            status_reads: 0,
        }
    }

    fn apply(&mut self, dir: u8) {
        self.commands.push(dir);

        let max = max_speed(&self.model);

        match dir {
            1 if self.speed == 0 && !self.door_in_process => {
                self.door_in_process = true;
                self.door_polls = self.opening_polls;
            }
            1 if !self.frozen && self.speed > 0 => self.speed = (self.speed + 1).min(max),
            2 => self.timer += 60,
            3 if !self.frozen && self.speed > 1 => self.speed -= 1,
            4 => {
                self.speed = 0;
                self.door_in_process = false;
            }
            _ => {}
        }

        if self.off_after == Some(self.commands.len()) {
            self.speed = 0;
        }

        if let Some(delay) = self.stall_after_command {
            self.status_delay = Some(delay);
        }
    }

    fn read_status(&mut self) -> String {
        self.status_reads += 1;

        if self.door_in_process {
            if self.door_polls == 0 {
                self.door_in_process = false;
                self.speed = 1;
            } else {
                self.door_polls -= 1;
            }
        }

        format!(
            "{{\n  \"fanspd\":{},\n  \"doorinprocess\":{},\n  \"timeremaining\":{},\n  \
             \"macaddr\":\"60:CB:FB:A0:00:01\",\n  \"model\":\"{}\",\n  \
             \"server_response\":\"\x00\x1b[1m\"stuck\"\\ <b>,\n  \"cfm\":0,\n  \
             \"DIPS\":\"11100\"\n}}\n",
            self.speed,
            self.door_in_process as u8,
            self.timer,
            self.model,
        )
    }
}

async fn status(State(device): State<Shared>) -> String {
    let delay = device.lock().unwrap().status_delay;

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    device.lock().unwrap().read_status()
}

async fn command(
    State(device): State<Shared>,
    Query(Dir { dir }): Query<Dir>,
) -> (StatusCode, &'static str) {
    let mut device = device.lock().unwrap();
    device.apply(dir);

    (device.command_status, "<response><fanspd>ok</fanspd></response>")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("airscape=trace")
        .with_test_writer()
        .try_init();
}
