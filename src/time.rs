//! Epochs and time scales.
//!
//! UT1 is approximated as UTC plus a caller-supplied DUT1 offset in seconds.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::error::{Result, TrackError};
use crate::frames::unwind_deg;

pub const J2000_JD: f64 = 2_451_545.0;
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// An absolute instant, stored in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(DateTime<Utc>);

impl Epoch {
    pub fn from_utc(utc: DateTime<Utc>) -> Self {
        Self(utc)
    }

    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_unix_seconds(seconds: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp(seconds, 0).map(Self)
    }

    /// Accepts RFC 3339 (`2024-01-01T00:00:00Z`) or a bare `2024-01-01T00:00:00`, read as UTC.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if let Ok(t) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self(t.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(text, ISO_FORMAT)
            .map(|t| Self(t.and_utc()))
            .map_err(|e| TrackError::InvalidInput(format!("unrecognised epoch '{text}': {e}")))
    }

    pub fn utc(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn naive_utc(&self) -> NaiveDateTime {
        self.0.naive_utc()
    }

    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    pub fn checked_add(&self, offset: Duration) -> Option<Self> {
        self.0.checked_add_signed(offset).map(Self)
    }

    pub fn julian_date(&self) -> f64 {
        UNIX_EPOCH_JD + self.unix_seconds_f64() / SECONDS_PER_DAY
    }

    fn unix_seconds_f64(&self) -> f64 {
        self.0.timestamp() as f64 + self.0.timestamp_subsec_nanos() as f64 / 1.0e9
    }

    /// Fraction of the UT1 day elapsed since 0h UT1, in [0, 1).
    pub fn ut1_day_fraction(&self, dut1_s: f64) -> f64 {
        (self.unix_seconds_f64() + dut1_s).rem_euclid(SECONDS_PER_DAY) / SECONDS_PER_DAY
    }

    pub fn ut1_days_since_j2000(&self, dut1_s: f64) -> f64 {
        self.julian_date() - J2000_JD + dut1_s / SECONDS_PER_DAY
    }

    pub fn ut1_centuries_since_j2000(&self, dut1_s: f64) -> f64 {
        self.ut1_days_since_j2000(dut1_s) / DAYS_PER_JULIAN_CENTURY
    }

    /// IAU 1982 GMST in degrees, reduced to [0, 360), with UT1 = UTC + `dut1_s`.
    pub fn greenwich_mean_sidereal_deg(&self, dut1_s: f64) -> f64 {
        let d = self.ut1_days_since_j2000(dut1_s);
        let t = d / DAYS_PER_JULIAN_CENTURY;
        let gmst = 280.46061837 + 360.98564736629 * d + 0.000387933 * t * t - t * t * t / 38_710_000.0;
        unwind_deg(gmst)
    }

    /// `YYYY-MM-DDTHH:MM:SS`, whole seconds.
    pub fn to_iso(&self) -> String {
        self.0.format(ISO_FORMAT).to_string()
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())
    }
}

impl From<DateTime<Utc>> for Epoch {
    fn from(utc: DateTime<Utc>) -> Self {
        Self(utc)
    }
}
