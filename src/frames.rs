//! Greenwich sidereal time, inertial to Earth-fixed rotation and the
//! geodetic sub-point of an Earth-fixed position.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};
use crate::time::{Epoch, DAYS_PER_JULIAN_CENTURY};

// ---------- Constants ----------
#[cfg(not(feature = "wgs72"))]
const EARTH_RADIUS_KM: f64 = 6378.137;                 // WGS-84 equatorial
#[cfg(not(feature = "wgs72"))]
const EARTH_FLATTENING: f64 = 1.0 / 298.257_223_563;   // WGS-84

#[cfg(feature = "wgs72")]
const EARTH_RADIUS_KM: f64 = 6378.135;                 // WGS-72 equatorial
#[cfg(feature = "wgs72")]
const EARTH_FLATTENING: f64 = 1.0 / 298.26;            // WGS-72

const GST_C0: f64 = 100.460_618_4;
const GST_C1: f64 = 36_000.770_053_61;
const GST_C2: f64 = 0.000_387_93;
const GST_C3: f64 = -2.6e-8;

const SIDEREAL_DEG_PER_DAY: f64 = 360.985_647_24;

const GEODETIC_ITERATIONS: usize = 6;

// ---------- GST models ----------

/// Polynomial used to turn UT1 into Greenwich sidereal time.
///
/// The two models take different arguments and are not numerically
/// interchangeable; a run uses exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GstModel {
    /// Cubic in UT1 Julian centuries since J2000.0. The polynomial gives
    /// GMST at 0h UT1; [`FrameConverter`] adds the rotation since midnight.
    #[default]
    Cubic,
    /// Constant sidereal rate applied to UT1 days since J2000.0.
    ///
    /// There is no 280.46° offset at J2000.0, so the result trails true GMST
    /// by roughly 80° at all times. Only useful for reproducing the bare
    /// rate formula, not for locating a sub-point.
    Linear,
}

impl GstModel {
    /// The UT1 value this model expects for `epoch`.
    pub fn ut1_argument(&self, epoch: &Epoch, dut1_s: f64) -> f64 {
        match self {
            GstModel::Cubic => epoch.ut1_centuries_since_j2000(dut1_s),
            GstModel::Linear => epoch.ut1_days_since_j2000(dut1_s),
        }
    }
}

impl FromStr for GstModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cubic" => Ok(GstModel::Cubic),
            "linear" => Ok(GstModel::Linear),
            other => Err(format!("unknown GST model '{other}' (expected 'cubic' or 'linear')")),
        }
    }
}

impl fmt::Display for GstModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GstModel::Cubic => f.write_str("cubic"),
            GstModel::Linear => f.write_str("linear"),
        }
    }
}

/// Greenwich sidereal time in degrees, reduced to [0, 360).
pub fn compute_gst(ut1: f64, model: GstModel) -> Result<f64> {
    check_ut1(ut1)?;
    let gst_deg = match model {
        GstModel::Cubic => cubic_gst_deg(ut1),
        GstModel::Linear => ut1 * SIDEREAL_DEG_PER_DAY,
    };
    Ok(unwind_deg(gst_deg))
}

fn check_ut1(ut1: f64) -> Result<()> {
    if !ut1.is_finite() || ut1 < 0.0 {
        return Err(TrackError::InvalidInput(format!(
            "UT1 must be a non-negative finite value, got {ut1}"
        )));
    }
    Ok(())
}

fn cubic_gst_deg(t: f64) -> f64 {
    GST_C0 + GST_C1 * t + GST_C2 * t * t + GST_C3 * t * t * t
}

/// Passive rotation of an inertial position about the polar axis by `gst_deg`.
pub fn rotate_to_earth_fixed(position: [f64; 3], gst_deg: f64) -> [f64; 3] {
    let theta = unwind_deg(gst_deg).to_radians();
    let (st, ct) = theta.sin_cos();
    [
        ct * position[0] + st * position[1],
        -st * position[0] + ct * position[1],
        position[2],
    ]
}

/// GST model plus the DUT1 offset it is evaluated with.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameConverter {
    pub model: GstModel,
    pub dut1_s: f64,
}

impl FrameConverter {
    pub fn new(model: GstModel, dut1_s: f64) -> Self {
        Self { model, dut1_s }
    }

    /// GST at `epoch`. The cubic model is evaluated at 0h UT1 of the day
    /// and advanced by the sidereal rate over the elapsed day fraction.
    pub fn gst_at(&self, epoch: &Epoch) -> Result<f64> {
        let ut1 = self.model.ut1_argument(epoch, self.dut1_s);
        match self.model {
            GstModel::Linear => compute_gst(ut1, GstModel::Linear),
            GstModel::Cubic => {
                check_ut1(ut1)?;
                let day_fraction = epoch.ut1_day_fraction(self.dut1_s);
                let t0 = ut1 - day_fraction / DAYS_PER_JULIAN_CENTURY;
                Ok(unwind_deg(cubic_gst_deg(t0) + SIDEREAL_DEG_PER_DAY * day_fraction))
            }
        }
    }

    /// Returns the Earth-fixed position together with the GST used.
    pub fn to_earth_fixed(&self, position: [f64; 3], epoch: &Epoch) -> Result<([f64; 3], f64)> {
        let gst = self.gst_at(epoch)?;
        Ok((rotate_to_earth_fixed(position, gst), gst))
    }
}

// ---------- Geodetic ----------

/// Point on the reference ellipsoid directly below a satellite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubPoint {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    pub altitude_km: f64,
}

impl SubPoint {
    pub fn new(longitude_deg: f64, latitude_deg: f64) -> Self {
        Self { longitude_deg, latitude_deg, altitude_km: 0.0 }
    }
}

pub fn geodetic_sub_point(ecef: [f64; 3]) -> Result<SubPoint> {
    let [x, y, z] = ecef;
    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return Err(TrackError::InvalidInput(format!("non-finite Earth-fixed position {ecef:?}")));
    }
    let p = x.hypot(y);
    if p == 0.0 && z == 0.0 {
        return Err(TrackError::InvalidInput("position at the geocenter has no sub-point".into()));
    }

    let a = EARTH_RADIUS_KM;
    let e2 = EARTH_FLATTENING * (2.0 - EARTH_FLATTENING);

    let mut lat = z.atan2(p * (1.0 - e2));
    for _ in 0..GEODETIC_ITERATIONS {
        let s = lat.sin();
        let n = a / (1.0 - e2 * s * s).sqrt();
        lat = (z + n * e2 * s).atan2(p);
    }

    let (sin_lat, cos_lat) = lat.sin_cos();
    let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let altitude_km = if cos_lat.abs() > 1e-10 {
        p / cos_lat - n
    } else {
        z.abs() - n * (1.0 - e2)
    };

    Ok(SubPoint {
        longitude_deg: y.atan2(x).to_degrees(),
        latitude_deg: lat.to_degrees(),
        altitude_km,
    })
}

/// Map window `[left, right, bottom, top]` around a sub-point, clamped to the globe.
pub fn view_extent(sub_point: &SubPoint, zoom_deg: f64) -> [f64; 4] {
    [
        (sub_point.longitude_deg - zoom_deg).max(-180.0),
        (sub_point.longitude_deg + zoom_deg).min(180.0),
        (sub_point.latitude_deg - zoom_deg).max(-90.0),
        (sub_point.latitude_deg + zoom_deg).min(90.0),
    ]
}

// ---------- Utility math ----------

pub fn unwind_deg(x: f64) -> f64 {
    let x = x.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360
    if x >= 360.0 { 0.0 } else { x }
}

pub fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}
