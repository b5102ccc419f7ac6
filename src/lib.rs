use std::ffi::{CStr, CString, c_char};
use std::sync::Once;

use log::{info, debug, error};
use serde::Serialize;

pub mod catalog;
pub mod config;
pub mod error;
pub mod frames;
pub mod oem;
pub mod render;
pub mod state;
pub mod time;
pub mod trajectory;

pub use catalog::{parse_selection, select_by_index, Catalog, OrbitalElementSet};
pub use config::TrackerConfig;
pub use error::{Result, TrackError};
pub use frames::{compute_gst, rotate_to_earth_fixed, FrameConverter, GstModel, SubPoint};
pub use oem::{OemHeader, OemRecord};
pub use render::{GroundStation, Renderer};
pub use state::{evaluate, Ephemeris, Evaluation, Sgp4Engine, StateVector};
pub use time::Epoch;
pub use trajectory::{advance, Animation, CancelToken, TrajectoryHistory};

use render::LogRenderer;

// ---------- Output model ----------
#[derive(Serialize)]
struct TrackSample {
    t_epoch: i64,          // UTC seconds since epoch
    satellite: String,
    longitude_deg: f64,
    latitude_deg: f64,
    altitude_km: f64,
    position_km: [f64; 3], // TEME
    velocity_km_s: [f64; 3],
    gst_deg: f64,
}

// ---------- Logging ----------

static INIT_LOGGER: Once = Once::new();

#[cfg(target_os = "android")]
pub fn init_logger() {
    use android_logger::Config;
    use log::LevelFilter;
    INIT_LOGGER.call_once(|| {
        android_logger::init_once(
            Config::default()
                .with_max_level(LevelFilter::Info)
                .with_tag("groundtrack")
        );
    });
}

#[cfg(not(target_os = "android"))]
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        // RUST_LOG overrides the Info default
        let _ = env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .try_init();
    });
}

// ---------- C ABI ----------
#[no_mangle]
pub extern "C" fn free_json(ptr: *mut c_char) {
    if ptr.is_null() { return; }
    unsafe { let _ = CString::from_raw(ptr); }
}

/// Ground track of one TLE as a JSON array, `steps` samples `step_minutes`
/// apart starting at `start_epoch` (UTC seconds). Any failure yields `[]`.
/// The returned string must be released with [`free_json`].
#[no_mangle]
pub extern "C" fn ground_track_json(
    tle1: *const c_char,
    tle2: *const c_char,
    start_epoch: i64,
    steps: u32,
    step_minutes: i64,
) -> *mut c_char {
    init_logger();
    info!("[ground_track_json] Starting ground track");
    if tle1.is_null() || tle2.is_null() {
        error!("[ground_track_json] null TLE line");
        return into_c_json("[]".to_string());
    }

    // Read C strings safely
    let tle1 = unsafe { CStr::from_ptr(tle1) }.to_string_lossy().into_owned();
    let tle2 = unsafe { CStr::from_ptr(tle2) }.to_string_lossy().into_owned();
    debug!("  tle1: {}", tle1);
    debug!("  tle2: {}", tle2);
    debug!("  start_epoch: {}, steps: {}, step_minutes: {}", start_epoch, steps, step_minutes);

    match ground_track_samples(&tle1, &tle2, start_epoch, steps as usize, step_minutes) {
        Ok(samples) => {
            info!("[ground_track_json] {} samples", samples.len());
            let json = serde_json::to_string(&samples).unwrap_or_else(|_| "[]".to_string());
            into_c_json(json)
        }
        Err(e) => {
            error!("[ground_track_json] {}", e);
            into_c_json("[]".to_string())
        }
    }
}

fn ground_track_samples(
    tle1: &str,
    tle2: &str,
    start_epoch: i64,
    steps: usize,
    step_minutes: i64,
) -> Result<Vec<TrackSample>> {
    let set = OrbitalElementSet::from_tle(None, tle1, tle2)?;
    let base = Epoch::from_unix_seconds(start_epoch)
        .ok_or_else(|| TrackError::InvalidInput(format!("start epoch {start_epoch} out of range")))?;
    if step_minutes <= 0 {
        return Err(TrackError::InvalidInput(format!("step_minutes must be positive, got {step_minutes}")));
    }

    let engine = Sgp4Engine::default();
    let animation = Animation {
        engine: &engine,
        converter: FrameConverter::default(),
        set: &set,
        base,
        step_minutes,
        max_steps: steps,
        stations: &[],
    };

    let mut history = TrajectoryHistory::with_capacity(steps);
    let mut samples = Vec::with_capacity(steps.min(4096));
    let mut renderer: Option<LogRenderer> = None;
    animation.run(&mut history, &mut renderer, &CancelToken::new(), |eval| {
        samples.push(TrackSample {
            t_epoch: eval.epoch.unix_seconds(),
            satellite: set.name().to_string(),
            longitude_deg: eval.sub_point.longitude_deg,
            latitude_deg: eval.sub_point.latitude_deg,
            altitude_km: eval.sub_point.altitude_km,
            position_km: eval.state.position,
            velocity_km_s: eval.state.velocity,
            gst_deg: eval.gst_deg,
        });
        Ok(())
    })?;
    Ok(samples)
}

fn into_c_json(json: String) -> *mut c_char {
    CString::new(json).unwrap_or_default().into_raw()
}
