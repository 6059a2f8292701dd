//! Error types for the Discord exporter

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Discord API error: {0}")]
    DiscordError(String),

    #[error("Channel with ID {0} not found")]
    ChannelNotFound(u64),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("You need {0} permissions to use this command.")]
    PermissionDenied(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serenity::Error> for Error {
    fn from(err: serenity::Error) -> Self {
        Error::DiscordError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}
