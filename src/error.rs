use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Could not connect to fan")]
    Connection(#[source] reqwest::Error),

    #[error("Fan did not respond in time")]
    Timeout(#[source] reqwest::Error),

    #[error("HTTP request failed")]
    Http(#[source] reqwest::Error),

    #[error("Failed to parse fan status")]
    Parse(#[from] serde_json::Error),

    #[error("Speed {speed} exceeds the maximum of {max}")]
    SpeedOutOfRange { speed: u8, max: u8 },

    #[error("Fan did not settle after {attempts} polls")]
    Unsettled { attempts: u32 },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err)
        } else if err.is_connect() {
            Error::Connection(err)
        } else {
            Error::Http(err)
        }
    }
}
