use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("environment error: {0}")]
    Environment(String),
}

pub type Result<T> = std::result::Result<T, DashError>;

impl From<octocrab::Error> for DashError {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::Serde { source, .. } => DashError::Decode(source.to_string()),
            octocrab::Error::Json { source, .. } => DashError::Decode(source.to_string()),
            other => DashError::Transport(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for DashError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DashError::Decode(err.to_string())
        } else {
            DashError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DashError {
    fn from(err: serde_json::Error) -> Self {
        DashError::Decode(err.to_string())
    }
}
