use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use indexmap::IndexMap;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    airport::Airport, error::SnapshotError, flight::Flight, runway::RunwayRegistry,
    waiting_queue::WaitingQueue,
};

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Everything needed to bring an [`Airport`] back exactly as it was.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirportSnapshot {
    pub format_version: u32,
    pub saved_at: Timestamp,
    pub runways: RunwayRegistry,
    /// In registration order.
    pub flights: Vec<Flight>,
    /// Head of the queue first.
    pub waiting: Vec<String>,
}

impl Airport {
    pub fn snapshot(&self) -> AirportSnapshot {
        AirportSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            saved_at: Timestamp::now(),
            runways: self.runways.clone(),
            flights: self.flights.values().cloned().collect(),
            waiting: self.waiting.iter().map(String::from).collect(),
        }
    }

    pub fn from_snapshot(snapshot: AirportSnapshot) -> Result<Self, SnapshotError> {
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.format_version));
        }

        let mut flights = IndexMap::with_capacity(snapshot.flights.len());
        for flight in snapshot.flights {
            let flight_id = flight.flight_id().to_string();
            if flights.insert(flight_id.clone(), flight).is_some() {
                return Err(SnapshotError::Inconsistent(format!(
                    "flight {flight_id} appears twice"
                )));
            }
        }

        let mut waiting = WaitingQueue::new();
        for flight_id in snapshot.waiting {
            if waiting.contains(&flight_id) {
                return Err(SnapshotError::Inconsistent(format!(
                    "flight {flight_id} queued twice"
                )));
            }
            waiting.enqueue(flight_id);
        }

        let airport = Self {
            flights,
            waiting,
            runways: snapshot.runways,
        };
        let problems = airport.inconsistencies();
        if !problems.is_empty() {
            return Err(SnapshotError::Inconsistent(problems.join("; ")));
        }
        debug!(saved_at = %snapshot.saved_at, "snapshot restored");
        Ok(airport)
    }

    pub fn save<W: Write>(&self, writer: W) -> Result<(), SnapshotError> {
        let mut writer = BufWriter::new(writer);
        serde_json::to_writer_pretty(&mut writer, &self.snapshot())?;
        writer.flush()?;
        Ok(())
    }

    pub fn load<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        let snapshot: AirportSnapshot = serde_json::from_reader(BufReader::new(reader))?;
        Self::from_snapshot(snapshot)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.save(File::create(path)?)?;
        info!(path = %path.display(), flights = self.flights.len(), "airport saved");
        Ok(())
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let airport = Self::load(File::open(path)?)?;
        info!(path = %path.display(), flights = airport.flights.len(), "airport loaded");
        Ok(airport)
    }
}
