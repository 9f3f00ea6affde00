use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BorgvaultError {
    #[error("{0}")]
    Message(String),
    #[error("{0}")]
    Config(ConfigError),
    #[error("{0}")]
    State(StateError),
    #[error("{0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parse config: {0}")]
    Parse(String),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("read state {0}: {1}")]
    Read(String, String),
    #[error("parse state {0}: {1}")]
    Parse(String, String),
    #[error("write state {0}: {1}")]
    Write(String, String),
    #[error("last success for {unit} is {ahead}s in the future; refusing to schedule")]
    ClockSkew { unit: String, ahead: i64 },
}

pub type Result<T> = std::result::Result<T, BorgvaultError>;

impl BorgvaultError {
    pub fn message(msg: impl Into<String>) -> Self {
        BorgvaultError::Message(msg.into())
    }
}

impl From<ConfigError> for BorgvaultError {
    fn from(err: ConfigError) -> Self {
        BorgvaultError::Config(err)
    }
}

impl From<StateError> for BorgvaultError {
    fn from(err: StateError) -> Self {
        BorgvaultError::State(err)
    }
}
