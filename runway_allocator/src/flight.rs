use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{AirportError, AirportResult, RunwayConflict},
    runway::{Runway, RunwayId, RunwayRegistry},
};

/// Coarse lifecycle status as shown to operators. Ordered: a flight only ever
/// moves forward through `Due < Waiting < Landed < Departing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlightStatus {
    Due,
    Waiting,
    Landed,
    Departing,
}

impl FlightStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Due => "DUE",
            Self::Waiting => "WAITING",
            Self::Landed => "LANDED",
            Self::Departing => "DEPARTING",
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a flight is in its lifecycle. Both `Queued` and `Holding` report
/// [`FlightStatus::Waiting`]; only `Holding` owns a runway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "phase", content = "runway", rename_all = "snake_case")]
pub enum FlightPhase {
    Due,
    Queued,
    Holding(RunwayId),
    Landed(RunwayId),
    Departing(RunwayId),
}

impl FlightPhase {
    pub fn status(self) -> FlightStatus {
        match self {
            Self::Due => FlightStatus::Due,
            Self::Queued | Self::Holding(_) => FlightStatus::Waiting,
            Self::Landed(_) => FlightStatus::Landed,
            Self::Departing(_) => FlightStatus::Departing,
        }
    }

    pub fn runway(self) -> Option<RunwayId> {
        match self {
            Self::Due | Self::Queued => None,
            Self::Holding(runway) | Self::Landed(runway) | Self::Departing(runway) => Some(runway),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    flight_id: String,
    city: String,
    phase: FlightPhase,
}

impl Flight {
    pub fn new(flight_id: impl Into<String>, city_of_origin: impl Into<String>) -> Self {
        Self {
            flight_id: flight_id.into(),
            city: city_of_origin.into(),
            phase: FlightPhase::Due,
        }
    }

    pub fn flight_id(&self) -> &str {
        &self.flight_id
    }

    /// Origin while arriving, destination once boarding has been announced.
    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    pub fn status(&self) -> FlightStatus {
        self.phase.status()
    }

    pub fn runway(&self) -> Option<RunwayId> {
        self.phase.runway()
    }

    pub fn is_queued(&self) -> bool {
        self.phase == FlightPhase::Queued
    }

    pub(crate) fn advance_status(&mut self) -> AirportResult<FlightStatus> {
        self.phase = match self.phase {
            FlightPhase::Due => FlightPhase::Queued,
            FlightPhase::Holding(runway) => FlightPhase::Landed(runway),
            FlightPhase::Landed(runway) => FlightPhase::Departing(runway),
            FlightPhase::Queued | FlightPhase::Departing(_) => {
                return Err(AirportError::InvalidTransition {
                    flight: self.flight_id.clone(),
                    status: self.status(),
                });
            }
        };
        Ok(self.status())
    }

    /// Books `runway` for this flight. A due flight moves straight to waiting.
    pub(crate) fn assign_runway(&mut self, runway: &mut Runway) -> AirportResult<()> {
        if self.status() > FlightStatus::Waiting {
            return Err(AirportError::AlreadyLanded {
                flight: self.flight_id.clone(),
                status: self.status(),
            });
        }
        if let FlightPhase::Holding(held) = self.phase {
            return Err(AirportError::AlreadyInSystem {
                flight: self.flight_id.clone(),
                runway: held,
            });
        }
        runway.book()?;
        self.phase = FlightPhase::Holding(runway.id());
        Ok(())
    }

    pub(crate) fn release_runway(&mut self, runways: &mut RunwayRegistry) -> AirportResult<()> {
        let runway = self
            .runway()
            .ok_or_else(|| RunwayConflict::NoRunwayHeld(self.flight_id.clone()))?;
        runways.release(runway)?;
        Ok(())
    }

    pub(crate) fn change_city(&mut self, city: impl Into<String>) {
        self.city = city.into();
    }
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.flight_id, self.city, self.status())?;
        if let Some(runway) = self.runway() {
            write!(f, " runway {runway}")?;
        }
        Ok(())
    }
}
