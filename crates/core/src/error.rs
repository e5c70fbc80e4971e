use crate::location::LocationError;
use thiserror::Error;

pub use lodestar_api::error::{CloseError, LoaderError};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid location: {0}")]
    Location(#[from] LocationError),
}

pub type Result<T> = std::result::Result<T, LoaderError>;
