use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: String, value: String },

    #[error("Missing required property: {0}")]
    MissingField(&'static str),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
