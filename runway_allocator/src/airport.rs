use indexmap::{IndexMap, map::Entry};
use itertools::Itertools;
use tracing::{debug, info};

use crate::{
    error::{AirportError, AirportResult, RunwayConflict},
    flight::{Flight, FlightPhase, FlightStatus},
    runway::{RunwayId, RunwayRegistry},
    waiting_queue::WaitingQueue,
};

/// Answer to a flight asking to land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalClearance {
    Cleared(RunwayId),
    /// No runway was free; the flight circles at `position` in the queue.
    Queued { position: usize },
}

impl ArrivalClearance {
    /// Runway number handed to the flight, 0 while it is circling.
    pub fn runway_number(self) -> RunwayId {
        match self {
            Self::Cleared(runway) => runway,
            Self::Queued { .. } => 0,
        }
    }
}

/// All mutable state of one airport: its runways, the flights it tracks and the
/// flights circling for a runway.
#[derive(Debug, Clone)]
pub struct Airport {
    pub(crate) flights: IndexMap<String, Flight>,
    pub(crate) waiting: WaitingQueue,
    pub(crate) runways: RunwayRegistry,
}

// Registration order and queue order are part of the state.
impl PartialEq for Airport {
    fn eq(&self, other: &Self) -> bool {
        self.runways == other.runways
            && self.waiting == other.waiting
            && self.flights.iter().eq(other.flights.iter())
    }
}

impl Eq for Airport {}

impl Airport {
    pub fn new(runway_count: u32) -> AirportResult<Self> {
        let runways = RunwayRegistry::new(runway_count)?;
        info!(runway_count, "airport opened");
        Ok(Self {
            flights: IndexMap::new(),
            waiting: WaitingQueue::new(),
            runways,
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn register_flight(&mut self, flight_id: &str, city_of_origin: &str) -> AirportResult<()> {
        match self.flights.entry(flight_id.to_string()) {
            Entry::Occupied(_) => Err(AirportError::DuplicateFlight(flight_id.to_string())),
            Entry::Vacant(vacant) => {
                vacant.insert(Flight::new(flight_id, city_of_origin));
                info!("flight registered");
                Ok(())
            }
        }
    }

    /// Clears the flight to the lowest numbered free runway, or puts it at the
    /// back of the waiting queue when every runway is booked.
    #[tracing::instrument(skip(self))]
    pub fn request_arrival(&mut self, flight_id: &str) -> AirportResult<ArrivalClearance> {
        let free_runway = self.runways.find_free();
        let flight = self
            .flights
            .get_mut(flight_id)
            .ok_or_else(|| AirportError::UnknownFlight(flight_id.to_string()))?;

        match free_runway {
            Some(runway_id) => {
                let was_queued = flight.is_queued();
                flight.assign_runway(self.runways.get_mut(runway_id)?)?;
                if was_queued {
                    self.waiting.remove(flight_id);
                }
                info!(runway = runway_id, "cleared to land");
                Ok(ArrivalClearance::Cleared(runway_id))
            }
            None => {
                if flight.status() != FlightStatus::Due {
                    return Err(AirportError::AlreadyArrived(flight_id.to_string()));
                }
                flight.advance_status()?;
                let position = self.waiting.enqueue(flight_id);
                info!(position, "no free runway, circling");
                Ok(ArrivalClearance::Queued { position })
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn confirm_landing(&mut self, flight_id: &str, runway_id: RunwayId) -> AirportResult<()> {
        let flight = self
            .flights
            .get_mut(flight_id)
            .ok_or_else(|| AirportError::UnknownFlight(flight_id.to_string()))?;

        match flight.phase() {
            FlightPhase::Due | FlightPhase::Queued => {
                Err(AirportError::NeverArrived(flight_id.to_string()))
            }
            FlightPhase::Holding(assigned)
            | FlightPhase::Landed(assigned)
            | FlightPhase::Departing(assigned)
                if assigned != runway_id =>
            {
                Err(AirportError::WrongRunway {
                    flight: flight_id.to_string(),
                    requested: runway_id,
                    assigned,
                })
            }
            FlightPhase::Holding(_) => {
                flight.advance_status()?;
                info!("landed");
                Ok(())
            }
            FlightPhase::Landed(_) | FlightPhase::Departing(_) => Err(AirportError::AlreadyLanded {
                flight: flight_id.to_string(),
                status: flight.status(),
            }),
        }
    }

    /// Announces boarding. The flight keeps its number and runway but from now
    /// on its city is the destination of the outbound leg.
    #[tracing::instrument(skip(self))]
    pub fn ready_for_departure(&mut self, flight_id: &str, destination: &str) -> AirportResult<()> {
        let flight = self
            .flights
            .get_mut(flight_id)
            .ok_or_else(|| AirportError::UnknownFlight(flight_id.to_string()))?;

        match flight.status() {
            FlightStatus::Due | FlightStatus::Waiting => {
                Err(AirportError::NotLanded(flight_id.to_string()))
            }
            FlightStatus::Departing => Err(AirportError::AlreadyDeparting(flight_id.to_string())),
            FlightStatus::Landed => {
                flight.advance_status()?;
                flight.change_city(destination);
                info!("boarding announced");
                Ok(())
            }
        }
    }

    /// Removes a departing flight, frees its runway and hands that runway to
    /// the head of the waiting queue. Returns the flight that is next to land.
    #[tracing::instrument(skip(self))]
    pub fn process_takeoff(&mut self, flight_id: &str) -> AirportResult<Option<Flight>> {
        let flight = self.flight_or_err(flight_id)?;
        match flight.status() {
            FlightStatus::Due | FlightStatus::Waiting => {
                return Err(AirportError::NotLanded(flight_id.to_string()));
            }
            FlightStatus::Landed => {
                return Err(AirportError::NoDepartureAnnounced(flight_id.to_string()));
            }
            FlightStatus::Departing => {}
        }
        if let Some(next) = self.waiting.front()
            && !self.flights.get(next).is_some_and(Flight::is_queued)
        {
            return Err(RunwayConflict::StaleQueueEntry(next.to_string()).into());
        }

        if let Some(flight) = self.flights.get_mut(flight_id) {
            flight.release_runway(&mut self.runways)?;
        }
        self.flights.shift_remove(flight_id);
        info!("took off");

        let Some(next_id) = self.waiting.dequeue_front() else {
            debug!("nobody circling");
            return Ok(None);
        };
        let runway_id = self
            .runways
            .find_free()
            .ok_or_else(|| RunwayConflict::StaleQueueEntry(next_id.clone()))?;
        let next = self
            .flights
            .get_mut(&next_id)
            .ok_or_else(|| RunwayConflict::StaleQueueEntry(next_id.clone()))?;
        next.assign_runway(self.runways.get_mut(runway_id)?)?;
        info!(next = %next_id, runway = runway_id, "next to land");
        Ok(Some(next.clone()))
    }

    /// Flights on their way in or on the ground before boarding.
    pub fn arrivals(&self) -> impl Iterator<Item = &Flight> {
        self.flights
            .values()
            .filter(|flight| flight.status() != FlightStatus::Departing)
    }

    pub fn departures(&self) -> impl Iterator<Item = &Flight> {
        self.flights
            .values()
            .filter(|flight| flight.status() == FlightStatus::Departing)
    }

    pub fn runway_count(&self) -> usize {
        self.runways.len()
    }

    pub fn runways(&self) -> &RunwayRegistry {
        &self.runways
    }

    pub fn waiting_queue(&self) -> &WaitingQueue {
        &self.waiting
    }

    pub fn flight(&self, flight_id: &str) -> Option<&Flight> {
        self.flights.get(flight_id)
    }

    /// Every tracked flight in registration order.
    pub fn flights(&self) -> impl Iterator<Item = &Flight> {
        self.flights.values()
    }

    fn flight_or_err(&self, flight_id: &str) -> AirportResult<&Flight> {
        self.flights
            .get(flight_id)
            .ok_or_else(|| AirportError::UnknownFlight(flight_id.to_string()))
    }

    /// Lists every broken invariant between flights, runways and the waiting
    /// queue. Empty for any airport driven only through its public operations.
    pub fn inconsistencies(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.runways.is_empty() {
            problems.push("airport has no runways".to_string());
        }
        for (expected, runway) in (1..).zip(self.runways.iter()) {
            if runway.id() != expected {
                problems.push(format!(
                    "runway at position {expected} is numbered {}",
                    runway.id()
                ));
            }
        }

        for (key, flight) in &self.flights {
            if key != flight.flight_id() {
                problems.push(format!("flight {} stored as {key}", flight.flight_id()));
            }
            if let Some(runway) = flight.runway()
                && self.runways.get(runway).is_none()
            {
                problems.push(format!("flight {key} holds unknown runway {runway}"));
            }
        }

        let holders = self
            .flights
            .values()
            .filter_map(|flight| flight.runway().map(|runway| (runway, flight.flight_id())))
            .into_group_map();
        for runway in self.runways.iter() {
            let held_by = holders.get(&runway.id()).map(Vec::as_slice).unwrap_or(&[]);
            match (runway.is_occupied(), held_by) {
                (true, [_]) | (false, []) => {}
                (true, []) => problems.push(format!("runway {} is booked by nobody", runway.id())),
                (false, _) => problems.push(format!(
                    "runway {} is vacant but held by {}",
                    runway.id(),
                    held_by.iter().join(", ")
                )),
                (true, _) => problems.push(format!(
                    "runway {} is held by {}",
                    runway.id(),
                    held_by.iter().join(", ")
                )),
            }
        }

        for flight_id in self.waiting.iter() {
            match self.flights.get(flight_id) {
                Some(flight) if flight.is_queued() => {}
                Some(flight) => problems.push(format!(
                    "flight {flight_id} is queued with phase {:?}",
                    flight.phase()
                )),
                None => problems.push(format!("unknown flight {flight_id} is queued")),
            }
        }
        for flight in self.flights.values().filter(|flight| flight.is_queued()) {
            if !self.waiting.contains(flight.flight_id()) {
                problems.push(format!(
                    "flight {} is circling outside the queue",
                    flight.flight_id()
                ));
            }
        }

        problems
    }
}
