use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    airport::{Airport, ArrivalClearance},
    error::AirportResult,
    flight::Flight,
    runway::RunwayId,
};

/// Cloneable handle that lets several callers drive one [`Airport`]. Each
/// operation runs to completion under a single lock.
#[derive(Debug, Clone)]
pub struct SharedAirport {
    inner: Arc<Mutex<Airport>>,
}

impl SharedAirport {
    pub fn new(airport: Airport) -> Self {
        Self {
            inner: Arc::new(Mutex::new(airport)),
        }
    }

    /// Runs `f` with exclusive access. Operations never leave the airport half
    /// updated, so a poisoned lock is still safe to use.
    pub fn with<T>(&self, f: impl FnOnce(&mut Airport) -> T) -> T {
        f(&mut self.lock())
    }

    pub fn register_flight(&self, flight_id: &str, city_of_origin: &str) -> AirportResult<()> {
        self.lock().register_flight(flight_id, city_of_origin)
    }

    pub fn request_arrival(&self, flight_id: &str) -> AirportResult<ArrivalClearance> {
        self.lock().request_arrival(flight_id)
    }

    pub fn confirm_landing(&self, flight_id: &str, runway_id: RunwayId) -> AirportResult<()> {
        self.lock().confirm_landing(flight_id, runway_id)
    }

    pub fn ready_for_departure(&self, flight_id: &str, destination: &str) -> AirportResult<()> {
        self.lock().ready_for_departure(flight_id, destination)
    }

    pub fn process_takeoff(&self, flight_id: &str) -> AirportResult<Option<Flight>> {
        self.lock().process_takeoff(flight_id)
    }

    pub fn arrivals(&self) -> Vec<Flight> {
        self.lock().arrivals().cloned().collect()
    }

    pub fn departures(&self) -> Vec<Flight> {
        self.lock().departures().cloned().collect()
    }

    pub fn runway_count(&self) -> usize {
        self.lock().runway_count()
    }

    pub fn into_inner(self) -> Result<Airport, Self> {
        Arc::try_unwrap(self.inner)
            .map(|mutex| mutex.into_inner().unwrap_or_else(PoisonError::into_inner))
            .map_err(|inner| Self { inner })
    }

    fn lock(&self) -> MutexGuard<'_, Airport> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
