//! Map surfaces for sub-points, trajectories and ground stations.
//!
//! Drawing is presentation only. The GeoJSON surface leaves coastlines to
//! whatever basemap the viewer puts underneath.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;
use crate::frames::{view_extent, SubPoint};
use crate::time::Epoch;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundStation {
    pub name: String,
    pub longitude_deg: f64,
    pub latitude_deg: f64,
}

impl GroundStation {
    pub fn new(name: &str, longitude_deg: f64, latitude_deg: f64) -> Self {
        Self { name: name.to_string(), longitude_deg, latitude_deg }
    }
}

pub fn default_ground_stations() -> Vec<GroundStation> {
    vec![
        GroundStation::new("CBU", -80.142578, 39.485085),
        GroundStation::new("WCDAS", -75.439339, 37.883255),
    ]
}

/// Everything one frame of the map shows.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub title: &'a str,
    pub epoch: &'a Epoch,
    pub sub_point: &'a SubPoint,
    pub trajectory: &'a [SubPoint],
    pub stations: &'a [GroundStation],
}

pub trait Renderer {
    fn draw(&mut self, frame: &Frame<'_>) -> Result<()>;

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn draw(&mut self, frame: &Frame<'_>) -> Result<()> {
        (**self).draw(frame)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

impl<A: Renderer, B: Renderer> Renderer for (A, B) {
    fn draw(&mut self, frame: &Frame<'_>) -> Result<()> {
        self.0.draw(frame)?;
        self.1.draw(frame)
    }

    fn finish(&mut self) -> Result<()> {
        self.0.finish()?;
        self.1.finish()
    }
}

impl<R: Renderer> Renderer for Option<R> {
    fn draw(&mut self, frame: &Frame<'_>) -> Result<()> {
        match self {
            Some(r) => r.draw(frame),
            None => Ok(()),
        }
    }

    fn finish(&mut self) -> Result<()> {
        match self {
            Some(r) => r.finish(),
            None => Ok(()),
        }
    }
}

// ---------- Log surface ----------

#[derive(Debug, Default)]
pub struct LogRenderer {
    frames: usize,
}

impl Renderer for LogRenderer {
    fn draw(&mut self, frame: &Frame<'_>) -> Result<()> {
        self.frames += 1;
        info!(
            "[render] Satellite Projection: {} | UTC {} | Longitude: {:.2} Latitude: {:.2} | trail {}",
            frame.title,
            frame.epoch,
            frame.sub_point.longitude_deg,
            frame.sub_point.latitude_deg,
            frame.trajectory.len()
        );
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        info!("[render] drew {} frames", self.frames);
        Ok(())
    }
}

// ---------- GeoJSON surface ----------

/// Keeps the latest frame and writes it as a FeatureCollection on `finish`.
#[derive(Debug)]
pub struct GeoJsonRenderer {
    path: PathBuf,
    zoom_deg: f64,
    latest: Option<Value>,
}

impl GeoJsonRenderer {
    pub fn new(path: impl Into<PathBuf>, zoom_deg: f64) -> Self {
        Self { path: path.into(), zoom_deg, latest: None }
    }

    pub fn latest(&self) -> Option<&Value> {
        self.latest.as_ref()
    }
}

impl Renderer for GeoJsonRenderer {
    fn draw(&mut self, frame: &Frame<'_>) -> Result<()> {
        self.latest = Some(feature_collection(frame, self.zoom_deg));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let Some(doc) = &self.latest else {
            warn!("[render] nothing drawn, not writing {:?}", self.path);
            return Ok(());
        };
        let mut out = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut out, doc)?;
        out.flush()?;
        info!("[render] wrote {:?}", self.path);
        Ok(())
    }
}

pub fn feature_collection(frame: &Frame<'_>, zoom_deg: f64) -> Value {
    let sp = frame.sub_point;
    let mut features = vec![json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [sp.longitude_deg, sp.latitude_deg] },
        "properties": {
            "role": "satellite",
            "name": frame.title,
            "label": format!("Longitude: {:.2}\nLatitude: {:.2}", sp.longitude_deg, sp.latitude_deg),
            "altitude_km": sp.altitude_km,
        }
    })];
    features.push(json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [sp.longitude_deg, sp.latitude_deg] },
        "properties": { "role": "beam_footprint", "label": "Beam Footprint" }
    }));

    let segments = split_at_antimeridian(frame.trajectory);
    if !segments.is_empty() {
        features.push(json!({
            "type": "Feature",
            "geometry": { "type": "MultiLineString", "coordinates": segments },
            "properties": { "role": "trajectory", "points": frame.trajectory.len() }
        }));
    }

    for station in frame.stations {
        features.push(json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [station.longitude_deg, station.latitude_deg] },
            "properties": { "role": "ground_station", "name": station.name }
        }));
    }

    json!({
        "type": "FeatureCollection",
        "bbox": view_extent(sp, zoom_deg),
        "properties": {
            "title": format!("Satellite Projection: {}", frame.title),
            "utc_timestamp": frame.epoch.to_iso(),
        },
        "features": features,
    })
}

/// Polyline pieces that never jump across ±180° longitude. Single points are dropped.
fn split_at_antimeridian(track: &[SubPoint]) -> Vec<Vec<[f64; 2]>> {
    let mut segments: Vec<Vec<[f64; 2]>> = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();
    for sp in track {
        if let Some(last) = current.last() {
            if (sp.longitude_deg - last[0]).abs() > 180.0 {
                segments.push(std::mem::take(&mut current));
            }
        }
        current.push([sp.longitude_deg, sp.latitude_deg]);
    }
    segments.push(current);
    segments.retain(|s| s.len() >= 2);
    segments
}
