//! State evaluation through an ephemeris engine.

use log::debug;
use serde::Serialize;
use sgp4::{Constants, MinutesSinceEpoch};

use crate::catalog::OrbitalElementSet;
use crate::error::{Result, TrackError};
use crate::frames::{geodetic_sub_point, rotate_to_earth_fixed, FrameConverter, SubPoint};
use crate::time::Epoch;

/// Inertial position (km) and velocity (km/s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateVector {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
}

/// Boundary to whatever propagates the orbit. Implementations report
/// failures as [`TrackError::Propagation`].
pub trait Ephemeris {
    /// Name of the inertial frame `propagate` reports in.
    fn frame(&self) -> &str;

    fn propagate(&self, set: &OrbitalElementSet, epoch: &Epoch) -> Result<StateVector>;

    fn sub_point(&self, state: &StateVector, epoch: &Epoch) -> Result<SubPoint>;
}

/// SGP4/SDP4 propagation of two-line elements. The sub-point rotation uses
/// UT1 = UTC + `dut1_s`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sgp4Engine {
    pub dut1_s: f64,
}

impl Sgp4Engine {
    pub fn new(dut1_s: f64) -> Self {
        Self { dut1_s }
    }
}

impl Ephemeris for Sgp4Engine {
    fn frame(&self) -> &str {
        "TEME"
    }

    fn propagate(&self, set: &OrbitalElementSet, epoch: &Epoch) -> Result<StateVector> {
        let fail = |reason: String| TrackError::Propagation {
            object: set.name().to_string(),
            epoch: epoch.to_iso(),
            reason,
        };

        let constants = Constants::from_elements(set.elements()).map_err(|e| fail(e.to_string()))?;
        let minutes = (epoch.utc() - set.epoch().utc()).num_milliseconds() as f64 / 60_000.0;
        let prediction = constants
            .propagate(MinutesSinceEpoch(minutes))
            .map_err(|e| fail(e.to_string()))?;

        let state = StateVector {
            position: prediction.position,
            velocity: prediction.velocity,
        };
        if state.position.iter().chain(state.velocity.iter()).any(|v| !v.is_finite()) {
            return Err(fail(format!("non-finite state {state:?}")));
        }
        Ok(state)
    }

    fn sub_point(&self, state: &StateVector, epoch: &Epoch) -> Result<SubPoint> {
        // TEME (≈ECI) → ECEF with the IAU-82 sidereal angle
        let gmst = epoch.greenwich_mean_sidereal_deg(self.dut1_s);
        geodetic_sub_point(rotate_to_earth_fixed(state.position, gmst))
    }
}

/// Propagated state and sub-point of `set` at `epoch`. Any engine failure
/// comes back as [`TrackError::Propagation`].
pub fn evaluate<E: Ephemeris + ?Sized>(
    engine: &E,
    set: &OrbitalElementSet,
    epoch: &Epoch,
) -> Result<(StateVector, SubPoint)> {
    let state = engine
        .propagate(set, epoch)
        .map_err(|e| as_propagation(e, set, epoch))?;
    let sub_point = engine
        .sub_point(&state, epoch)
        .map_err(|e| as_propagation(e, set, epoch))?;
    debug!(
        "[evaluate] {} at {}: r = {:?} km, lon {:.4}, lat {:.4}",
        set.name(),
        epoch,
        state.position,
        sub_point.longitude_deg,
        sub_point.latitude_deg
    );
    Ok((state, sub_point))
}

fn as_propagation(err: TrackError, set: &OrbitalElementSet, epoch: &Epoch) -> TrackError {
    match err {
        e @ TrackError::Propagation { .. } => e,
        other => TrackError::Propagation {
            object: set.name().to_string(),
            epoch: epoch.to_iso(),
            reason: other.to_string(),
        },
    }
}

/// One evaluation plus the frame converter's Earth-fixed cross-check.
#[derive(Debug, Clone, Copy)]
pub struct Evaluation {
    pub epoch: Epoch,
    pub state: StateVector,
    pub sub_point: SubPoint,
    pub gst_deg: f64,
    pub earth_fixed: [f64; 3],
}

impl Evaluation {
    pub fn compute<E: Ephemeris + ?Sized>(
        engine: &E,
        converter: &FrameConverter,
        set: &OrbitalElementSet,
        epoch: Epoch,
    ) -> Result<Self> {
        let (state, sub_point) = evaluate(engine, set, &epoch)?;
        let (earth_fixed, gst_deg) = converter.to_earth_fixed(state.position, &epoch)?;
        Ok(Self { epoch, state, sub_point, gst_deg, earth_fixed })
    }
}
