//! Cursor synchronization engine: maps a playback time to a cursor
//! position on the rendered tablature.
//!
//! Per tick the engine finds the beat sounding at the playback time,
//! looks up its rendered bounds, finds the next drawn beat on the same
//! row, and blends between the two:
//!   `x = beat.x + (next.x - beat.x) * progress`
//! with `progress` measured over the whole gap to the next drawn beat, so
//! rests between them are crossed at constant speed.
//!
//! Fallbacks, in order of preference:
//! - no drawn successor on the row → advance by a fixed spacing over the
//!   beat's own duration (estimating)
//! - current beat not drawn, or its bounds not ready → drift forward from
//!   the last position
//! - nothing resolvable → hold the last position
//!
//! Nothing here returns an error to the caller: a bad frame holds the
//! cursor and is logged.

mod beat_index;
mod bounds;
mod cache;
mod lookahead;
mod status;

use log::{debug, warn};

use crate::config::SyncConfig;
use crate::error::{Readiness, SyncError};
use crate::model::{BeatBounds, CursorPosition, TrackId};

pub use beat_index::{BeatIndex, TimeIndex};
pub use bounds::{BoundsResolver, SpatialIndex};
pub use cache::CursorPositionCache;
pub use lookahead::{find_next_valid, NextBeat};
pub use status::{SyncOutcome, SyncStatus};

/// Everything the engine reads during one tick.
pub struct SyncSources<'a> {
    pub beats: &'a dyn BeatIndex,
    pub bounds: &'a dyn BoundsResolver,
    /// Whether the renderer has finished its current pass
    pub render_complete: bool,
    /// Rendered tracks, in priority order for cross-track ties
    pub active_tracks: &'a [TrackId],
}

impl SyncSources<'_> {
    /// First unmet readiness precondition, in check order.
    pub fn readiness(&self) -> Result<(), Readiness> {
        if !self.bounds.is_populated() {
            return Err(Readiness::SpatialIndex);
        }
        if !self.render_complete {
            return Err(Readiness::RenderPass);
        }
        if !self.beats.is_populated() {
            return Err(Readiness::BeatIndex);
        }
        if self.active_tracks.is_empty() {
            return Err(Readiness::ActiveTracks);
        }
        Ok(())
    }
}

/// Fraction of `span_ms` covered by `elapsed_ms`, clamped into `[0, 1]`.
/// A zero, negative or non-finite span snaps to 1.
pub fn progress(elapsed_ms: f64, span_ms: f64) -> f64 {
    if !span_ms.is_finite() || span_ms <= 0.0 {
        return 1.0;
    }
    let p = elapsed_ms / span_ms;
    if p.is_nan() {
        return 0.0;
    }
    p.clamp(0.0, 1.0)
}

pub struct InterpolationEngine {
    config: SyncConfig,
    cache: CursorPositionCache,
    last_status: Option<SyncStatus>,
}

impl InterpolationEngine {
    pub fn new(config: SyncConfig) -> Self {
        let cache = CursorPositionCache::new(Self::initial_position(&config));
        Self { config, cache, last_status: None }
    }

    fn initial_position(config: &SyncConfig) -> CursorPosition {
        CursorPosition::new(0.0, 0.0, config.default_cursor_height)
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Last position handed out.
    pub fn position(&self) -> CursorPosition {
        self.cache.get()
    }

    /// Back to the initial position, e.g. after a score reload.
    pub fn reset(&mut self) {
        self.cache.reset(Self::initial_position(&self.config));
        self.last_status = None;
    }

    /// Compute the cursor for `time_ms`. Always returns a finite position;
    /// on any failure it is the previous one.
    pub fn sync(
        &mut self,
        sources: &SyncSources<'_>,
        time_ms: f64,
        is_playing: bool,
    ) -> SyncOutcome {
        let last = self.cache.get();

        let outcome = match self.compute(sources, time_ms, is_playing, last) {
            Ok(outcome) if outcome.position.is_finite() => outcome,
            Ok(outcome) => {
                self.report_error(&format!(
                    "non-finite cursor ({}, {}, {}) at {time_ms}ms",
                    outcome.position.x, outcome.position.y, outcome.position.height
                ));
                SyncOutcome::hold(last, SyncStatus::Error)
            }
            // The beat index may go unready between the precondition check
            // and the lookup; unready bounds never get here, they fall back
            // like missing ones.
            Err(SyncError::NotReady(r)) => SyncOutcome::hold(last, SyncStatus::NotReady(r)),
            Err(e) => {
                self.report_error(&format!("{e} at {time_ms}ms"));
                SyncOutcome::hold(last, SyncStatus::Error)
            }
        };

        self.cache.set(outcome.position);
        self.note_status(outcome.status, time_ms);
        outcome
    }

    fn compute(
        &self,
        sources: &SyncSources<'_>,
        time_ms: f64,
        is_playing: bool,
        last: CursorPosition,
    ) -> Result<SyncOutcome, SyncError> {
        if let Err(r) = sources.readiness() {
            return Ok(SyncOutcome::hold(last, SyncStatus::NotReady(r)));
        }

        let Some(beat_id) = sources.beats.find_beat(sources.active_tracks, time_ms)? else {
            return Ok(SyncOutcome::hold(last, SyncStatus::NoBeat));
        };
        let beat = sources.beats.beat(beat_id)?;

        let resolved = match sources.bounds.resolve(beat_id) {
            Ok(found) => found,
            Err(SyncError::NotReady(r)) => {
                debug!("bounds of {beat_id} not ready ({}), drifting", r.describe());
                None
            }
            Err(e) => return Err(e),
        };
        let Some(bounds) = resolved else {
            let (position, status) = self.drift(last, is_playing);
            return Ok(SyncOutcome { position, status, beat: Some(beat_id) });
        };

        let next = find_next_valid(
            sources.beats,
            sources.bounds,
            beat,
            bounds.row_y,
            self.config.max_lookahead,
        )?;

        let elapsed = time_ms - beat.start_ms;
        let (x, status) = match next {
            Some(next) => {
                let p = progress(elapsed, next.start_ms - beat.start_ms);
                (interpolate(&bounds, &next.bounds, p), SyncStatus::Interpolating)
            }
            None if beat.duration_ms > 0.0 => {
                let p = progress(elapsed, beat.duration_ms);
                (bounds.visual.x + self.config.estimate_spacing_px * p, SyncStatus::Estimating)
            }
            None => (bounds.visual.x, SyncStatus::Static),
        };

        Ok(SyncOutcome {
            position: CursorPosition::new(x, bounds.visual.y, bounds.visual.h),
            status,
            beat: Some(beat_id),
        })
    }

    /// Bounds briefly vanish while a render pass settles; keep moving
    /// slowly instead of freezing. Paused playback does not drift.
    fn drift(&self, last: CursorPosition, is_playing: bool) -> (CursorPosition, SyncStatus) {
        if !is_playing {
            return (last, SyncStatus::Static);
        }
        let x = last.x + self.config.drift_step_px();
        let position = CursorPosition::new(x, last.y, last.height);
        (position, SyncStatus::Drifting)
    }

    fn report_error(&self, message: &str) {
        if self.last_status != Some(SyncStatus::Error) {
            warn!("cursor sync failed, holding position: {message}");
        }
    }

    /// Log status transitions only; a steady state at 60 Hz stays quiet.
    fn note_status(&mut self, status: SyncStatus, time_ms: f64) {
        if self.last_status == Some(status) {
            return;
        }
        debug!("cursor status -> {status} at {time_ms}ms");
        self.last_status = Some(status);
    }
}

fn interpolate(from: &BeatBounds, to: &BeatBounds, progress: f64) -> f64 {
    from.visual.x + (to.visual.x - from.visual.x) * progress
}
