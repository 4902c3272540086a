use std::io;

use config::ConfigError;
use runway_allocator::{AirportError, SnapshotError};
use thiserror::Error;

pub(crate) type ApplicationResult<T> = Result<T, ApplicationError>;

#[derive(Debug, Error)]
pub(crate) enum ApplicationError {
    #[error("Error regarding config: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("System input/output error: {0}")]
    IoError(#[from] io::Error),
    #[error("{0}")]
    AirportError(#[from] AirportError),
    #[error("Failed to save or restore airport state: {0}")]
    SnapshotError(#[from] SnapshotError),
    #[error("Failed to render board: {0}")]
    TemplateError(#[from] askama::Error),
    #[error("Failed to write config file: {0}")]
    TomlError(#[from] toml::ser::Error),
    #[error("Could not understand command: {0}")]
    CommandError(String),
    #[error("{0} must not be empty")]
    MissingInput(&'static str),
    #[error("No directory available for {0}")]
    NoProjectDirectory(&'static str),
}
