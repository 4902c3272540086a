use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{AirportError, AirportResult, RunwayConflict};

/// Runways are numbered from 1, so 0 never names a runway.
pub type RunwayId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runway {
    id: RunwayId,
    occupied: bool,
}

impl Runway {
    pub(crate) fn new(id: RunwayId) -> Self {
        Self {
            id,
            occupied: false,
        }
    }

    pub fn id(&self) -> RunwayId {
        self.id
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    pub(crate) fn book(&mut self) -> Result<(), RunwayConflict> {
        if self.occupied {
            return Err(RunwayConflict::AlreadyBooked(self.id));
        }
        trace!(runway = self.id, "booked");
        self.occupied = true;
        Ok(())
    }

    pub(crate) fn release(&mut self) -> Result<(), RunwayConflict> {
        if !self.occupied {
            return Err(RunwayConflict::AlreadyVacant(self.id));
        }
        trace!(runway = self.id, "released");
        self.occupied = false;
        Ok(())
    }
}

/// Fixed-size set of runways with ids `1..=N`, kept in ascending id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunwayRegistry {
    runways: Vec<Runway>,
}

impl RunwayRegistry {
    pub fn new(count: u32) -> AirportResult<Self> {
        if count == 0 {
            return Err(AirportError::InvalidRunwayCount(count));
        }
        Ok(Self {
            runways: (1..=count).map(Runway::new).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.runways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runways.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Runway> {
        self.runways.iter()
    }

    pub fn get(&self, id: RunwayId) -> Option<&Runway> {
        self.index_of(id).map(|index| &self.runways[index])
    }

    pub fn find_free(&self) -> Option<RunwayId> {
        self.runways
            .iter()
            .find(|runway| !runway.occupied)
            .map(Runway::id)
    }

    pub fn free_count(&self) -> usize {
        self.runways
            .iter()
            .filter(|runway| !runway.occupied)
            .count()
    }

    pub(crate) fn get_mut(&mut self, id: RunwayId) -> Result<&mut Runway, RunwayConflict> {
        let index = self.index_of(id).ok_or(RunwayConflict::UnknownRunway(id))?;
        Ok(&mut self.runways[index])
    }

    pub(crate) fn release(&mut self, id: RunwayId) -> Result<(), RunwayConflict> {
        self.get_mut(id)?.release()
    }

    fn index_of(&self, id: RunwayId) -> Option<usize> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        (index < self.runways.len()).then_some(index)
    }
}
