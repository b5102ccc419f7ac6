//! CCSDS Orbit Ephemeris Message text.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::catalog::OrbitalElementSet;
use crate::state::StateVector;
use crate::time::Epoch;

pub const OEM_VERSION: &str = "2.0";

#[derive(Debug, Clone)]
pub struct OemHeader {
    pub creation_date: DateTime<Utc>,
    pub originator: String,
}

impl OemHeader {
    pub fn now(originator: &str) -> Self {
        Self { creation_date: Utc::now(), originator: originator.to_string() }
    }
}

/// Header, one metadata block and the data lines under it.
#[derive(Debug, Clone)]
pub struct OemRecord {
    header: OemHeader,
    object_name: String,
    object_id: u64,
    ref_frame: String,
    samples: Vec<(Epoch, StateVector)>,
}

impl OemRecord {
    pub fn new(header: OemHeader, set: &OrbitalElementSet, ref_frame: &str) -> Self {
        Self {
            header,
            object_name: set.name().to_string(),
            object_id: set.catalog_id(),
            ref_frame: ref_frame.to_string(),
            samples: Vec::new(),
        }
    }

    pub fn push(&mut self, epoch: Epoch, state: StateVector) {
        self.samples.push((epoch, state));
    }

    pub fn samples(&self) -> &[(Epoch, StateVector)] {
        &self.samples
    }
}

impl fmt::Display for OemRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CCSDS_OEM_VERS = {OEM_VERSION}")?;
        writeln!(f, "CREATION_DATE = {}", self.header.creation_date.format("%Y-%m-%dT%H:%M:%S"))?;
        writeln!(f, "ORIGINATOR = {}", self.header.originator)?;
        writeln!(f)?;
        writeln!(f, "META_START")?;
        writeln!(f, "OBJECT_NAME = {}", self.object_name)?;
        writeln!(f, "OBJECT_ID = {}", self.object_id)?;
        writeln!(f, "CENTER_NAME = EARTH")?;
        writeln!(f, "REF_FRAME = {}", self.ref_frame)?;
        writeln!(f, "TIME_SYSTEM = UTC")?;
        writeln!(f, "META_STOP")?;
        writeln!(f)?;
        for (epoch, state) in &self.samples {
            writeln!(f, "{}", data_line(epoch, state))?;
        }
        Ok(())
    }
}

/// `iso px py pz vx vy vz 0.0 0.0 0.0`; accelerations are not modelled.
pub fn data_line(epoch: &Epoch, state: &StateVector) -> String {
    let [px, py, pz] = state.position;
    let [vx, vy, vz] = state.velocity;
    format!(
        "{} {px:.6} {py:.6} {pz:.6} {vx:.6} {vy:.6} {vz:.6} 0.0 0.0 0.0",
        epoch.to_iso()
    )
}

/// Single-sample message.
pub fn format(
    header: OemHeader,
    set: &OrbitalElementSet,
    ref_frame: &str,
    epoch: &Epoch,
    state: &StateVector,
) -> String {
    let mut record = OemRecord::new(header, set, ref_frame);
    record.push(*epoch, *state);
    record.to_string()
}
