//! Tracks flights through arrival, landing, boarding and take-off, and hands
//! out a fixed pool of runways first come, first served.

pub mod airport;
pub mod error;
pub mod flight;
pub mod runway;
pub mod shared;
pub mod snapshot;
pub mod waiting_queue;

pub use airport::{Airport, ArrivalClearance};
pub use error::{AirportError, AirportResult, ErrorKind, RunwayConflict, SnapshotError};
pub use flight::{Flight, FlightPhase, FlightStatus};
pub use runway::{Runway, RunwayId, RunwayRegistry};
pub use shared::SharedAirport;
pub use snapshot::AirportSnapshot;
pub use waiting_queue::WaitingQueue;
