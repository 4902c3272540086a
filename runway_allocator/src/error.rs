use std::io;

use thiserror::Error;

use crate::{flight::FlightStatus, runway::RunwayId};

pub type AirportResult<T> = Result<T, AirportError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AirportError {
    #[error("An airport needs at least one runway, got {0}")]
    InvalidRunwayCount(u32),
    #[error("Flight {0} is already registered")]
    DuplicateFlight(String),
    #[error("Flight {0} is not registered")]
    UnknownFlight(String),
    #[error("Flight {flight} cannot leave status {status}")]
    InvalidTransition {
        flight: String,
        status: FlightStatus,
    },
    #[error("Flight {flight} is already assigned to runway {runway}")]
    AlreadyInSystem { flight: String, runway: RunwayId },
    #[error("Flight {flight} has already landed (status {status})")]
    AlreadyLanded {
        flight: String,
        status: FlightStatus,
    },
    #[error("Flight {0} has already reported its arrival")]
    AlreadyArrived(String),
    #[error("Flight {0} is already waiting for departure")]
    AlreadyDeparting(String),
    #[error("Flight {flight} is cleared for runway {assigned}, not runway {requested}")]
    WrongRunway {
        flight: String,
        requested: RunwayId,
        assigned: RunwayId,
    },
    #[error("Flight {0} has not landed")]
    NotLanded(String),
    #[error("Flight {0} has not been cleared to a runway")]
    NeverArrived(String),
    #[error("Boarding has not been announced for flight {0}")]
    NoDepartureAnnounced(String),
    #[error("Runway conflict: {0}")]
    ResourceConflict(#[from] RunwayConflict),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunwayConflict {
    #[error("runway {0} is already booked")]
    AlreadyBooked(RunwayId),
    #[error("runway {0} is already vacant")]
    AlreadyVacant(RunwayId),
    #[error("runway {0} does not exist")]
    UnknownRunway(RunwayId),
    #[error("flight {0} holds no runway")]
    NoRunwayHeld(String),
    #[error("flight {0} is queued but not waiting for a runway")]
    StaleQueueEntry(String),
}

/// Coarse classification of [`AirportError`], one entry per rejection reason a
/// caller may want to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidConfiguration,
    DuplicateFlight,
    UnknownFlight,
    InvalidTransition,
    AlreadyInSystem,
    AlreadyLanded,
    AlreadyArrived,
    AlreadyDeparting,
    WrongRunway,
    NotLanded,
    NeverArrived,
    NoDepartureAnnounced,
    ResourceConflict,
}

impl AirportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRunwayCount(_) => ErrorKind::InvalidConfiguration,
            Self::DuplicateFlight(_) => ErrorKind::DuplicateFlight,
            Self::UnknownFlight(_) => ErrorKind::UnknownFlight,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::AlreadyInSystem { .. } => ErrorKind::AlreadyInSystem,
            Self::AlreadyLanded { .. } => ErrorKind::AlreadyLanded,
            Self::AlreadyArrived(_) => ErrorKind::AlreadyArrived,
            Self::AlreadyDeparting(_) => ErrorKind::AlreadyDeparting,
            Self::WrongRunway { .. } => ErrorKind::WrongRunway,
            Self::NotLanded(_) => ErrorKind::NotLanded,
            Self::NeverArrived(_) => ErrorKind::NeverArrived,
            Self::NoDepartureAnnounced(_) => ErrorKind::NoDepartureAnnounced,
            Self::ResourceConflict(_) => ErrorKind::ResourceConflict,
        }
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("System input/output error: {0}")]
    IoError(#[from] io::Error),
    #[error("Failed to encode or decode snapshot: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Unsupported snapshot format version {0}")]
    UnsupportedVersion(u32),
    #[error("Snapshot is inconsistent: {0}")]
    Inconsistent(String),
}
