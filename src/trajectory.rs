//! Time-stepped ground track accumulation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Duration;
use log::{debug, info, warn};

use crate::catalog::OrbitalElementSet;
use crate::error::{Result, TrackError};
use crate::frames::{FrameConverter, SubPoint};
use crate::render::{Frame, GroundStation, Renderer};
use crate::state::{Ephemeris, Evaluation};
use crate::time::Epoch;

/// `base + step_index * step_minutes`, in whole minutes so gaps are exact.
pub fn advance(base: &Epoch, step_index: usize, step_minutes: i64) -> Result<Epoch> {
    let overflow = || TrackError::InvalidInput(format!(
        "step {step_index} x {step_minutes} min overflows the epoch range"
    ));
    let minutes = i64::try_from(step_index)
        .ok()
        .and_then(|i| i.checked_mul(step_minutes))
        .ok_or_else(overflow)?;
    let offset = Duration::try_minutes(minutes).ok_or_else(overflow)?;
    base.checked_add(offset).ok_or_else(overflow)
}

/// Sub-points in the order they were recorded, up to a fixed capacity.
///
/// Order is call order. Nothing here sorts by epoch or drops duplicates.
#[derive(Debug, Clone)]
pub struct TrajectoryHistory {
    points: Vec<SubPoint>,
    capacity: usize,
}

impl TrajectoryHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    pub fn record(&mut self, sub_point: SubPoint) -> Result<()> {
        if self.points.len() >= self.capacity {
            return Err(TrackError::HistoryFull { capacity: self.capacity });
        }
        self.points.push(sub_point);
        Ok(())
    }

    pub fn points(&self) -> &[SubPoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&SubPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Cooperative stop flag, checked between animation steps.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub steps: usize,
    pub cancelled: bool,
    pub last: Option<Evaluation>,
}

/// Fixed-cadence ground track animation for one satellite.
pub struct Animation<'a, E: Ephemeris + ?Sized> {
    pub engine: &'a E,
    pub converter: FrameConverter,
    pub set: &'a OrbitalElementSet,
    pub base: Epoch,
    pub step_minutes: i64,
    pub max_steps: usize,
    pub stations: &'a [GroundStation],
}

impl<'a, E: Ephemeris + ?Sized> Animation<'a, E> {
    /// Steps `0..max_steps`: evaluate, record, draw, then hand the
    /// evaluation to `on_step`. The first failing step ends the run with
    /// its error; later steps are not attempted.
    pub fn run<R, F>(
        &self,
        history: &mut TrajectoryHistory,
        renderer: &mut R,
        cancel: &CancelToken,
        mut on_step: F,
    ) -> Result<RunSummary>
    where
        R: Renderer + ?Sized,
        F: FnMut(&Evaluation) -> Result<()>,
    {
        info!(
            "[animation] {}: {} steps of {} min from {}",
            self.set.name(),
            self.max_steps,
            self.step_minutes,
            self.base
        );

        let mut summary = RunSummary { steps: 0, cancelled: false, last: None };
        for step in 0..self.max_steps {
            if cancel.is_cancelled() {
                warn!("[animation] cancelled after {} steps", summary.steps);
                summary.cancelled = true;
                break;
            }

            let epoch = advance(&self.base, step, self.step_minutes)?;
            let eval = Evaluation::compute(self.engine, &self.converter, self.set, epoch)?;
            history.record(eval.sub_point)?;

            renderer.draw(&Frame {
                title: self.set.name(),
                epoch: &eval.epoch,
                sub_point: &eval.sub_point,
                trajectory: history.points(),
                stations: self.stations,
            })?;
            on_step(&eval)?;

            debug!("[animation] step {} at {} done", step, epoch);
            summary.steps += 1;
            summary.last = Some(eval);
        }

        renderer.finish()?;
        info!("[animation] finished with {} recorded sub-points", history.len());
        Ok(summary)
    }
}
