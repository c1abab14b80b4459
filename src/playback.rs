//! Playback cursor session: the bridge between the host's transport clock
//! and the cursor drawn over the rendered tablature.
//!
//! A host drives it in three phases:
//! 1. `load_score` once per score (beats and timing)
//! 2. `begin_render_pass` / `complete_render_pass` around every layout
//!    (resize, track visibility change)
//! 3. `sync` once per animation frame with the current playback time

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::SyncConfig;
use crate::error::LoadError;
use crate::model::{BeatBounds, BeatId, CursorPosition, Score, TrackId};
use crate::sync::{
    BeatIndex, InterpolationEngine, SpatialIndex, SyncOutcome, SyncSources, TimeIndex,
};

/// One drawn beat in a render pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeatLayout {
    pub beat: BeatId,
    pub bounds: BeatBounds,
}

/// Output of one render pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderLayout {
    /// Tracks the renderer actually drew. Empty keeps the current set.
    #[serde(default)]
    pub tracks: Vec<TrackId>,
    pub beats: Vec<BeatLayout>,
}

/// Owns the indices and the engine for one loaded score.
pub struct PlaybackCursor {
    engine: InterpolationEngine,
    time_index: TimeIndex,
    spatial_index: SpatialIndex,
    render_complete: bool,
    active_tracks: Vec<TrackId>,
}

impl PlaybackCursor {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            engine: InterpolationEngine::new(config),
            time_index: TimeIndex::empty(),
            spatial_index: SpatialIndex::new(),
            render_complete: false,
            active_tracks: Vec::new(),
        }
    }

    /// Replace the loaded score. Bounds from any earlier render pass are
    /// dropped and the cursor returns to its initial position.
    pub fn load_score(&mut self, score: &Score) -> Result<(), LoadError> {
        let index = TimeIndex::from_score(score)?;
        info!(
            "loaded score {:?}: {} tracks, {} beats",
            score.title.as_deref().unwrap_or("untitled"),
            score.tracks.len(),
            index.len()
        );
        self.time_index = index;
        self.active_tracks = score.track_ids();
        self.spatial_index.invalidate();
        self.render_complete = false;
        self.engine.reset();
        Ok(())
    }

    pub fn load_score_json(&mut self, json: &str) -> Result<(), LoadError> {
        let score: Score = serde_json::from_str(json)?;
        self.load_score(&score)
    }

    /// The renderer started laying out again; previous bounds are stale.
    pub fn begin_render_pass(&mut self) {
        self.spatial_index.invalidate();
        self.render_complete = false;
    }

    /// Install the bounds of a finished render pass.
    ///
    /// Every beat must belong to the loaded score and have finite bounds;
    /// otherwise the pass is rejected and the engine stays not-ready.
    pub fn complete_render_pass(&mut self, layout: RenderLayout) -> Result<(), LoadError> {
        if !self.time_index.is_populated() {
            return Err(LoadError::NoScore);
        }
        for entry in &layout.beats {
            self.time_index
                .beat(entry.beat)
                .map_err(|_| LoadError::UnknownLayoutBeat(entry.beat))?;
            let v = entry.bounds.visual;
            let finite = [v.x, v.y, v.w, v.h, entry.bounds.row_y].iter().all(|c| c.is_finite());
            if !finite {
                return Err(LoadError::InvalidBounds(entry.beat));
            }
        }

        if !layout.tracks.is_empty() {
            self.active_tracks = layout.tracks;
        }
        let drawn = layout.beats.len();
        self.spatial_index
            .populate(layout.beats.into_iter().map(|e| (e.beat, e.bounds)));
        self.render_complete = true;
        info!(
            "render pass {} complete: {} beats drawn, {} active tracks",
            self.spatial_index.generation(),
            drawn,
            self.active_tracks.len()
        );
        Ok(())
    }

    pub fn load_layout_json(&mut self, json: &str) -> Result<(), LoadError> {
        let layout: RenderLayout = serde_json::from_str(json)?;
        self.complete_render_pass(layout)
    }

    /// Restrict the cursor to these tracks; order decides ties.
    ///
    /// The selection belongs to the loaded score: `load_score` resets it to
    /// every track of the new score, so call this after loading.
    pub fn set_active_tracks(&mut self, tracks: Vec<TrackId>) {
        if tracks.is_empty() {
            warn!("active track set cleared; cursor will hold until tracks are set");
        }
        self.active_tracks = tracks;
    }

    pub fn active_tracks(&self) -> &[TrackId] {
        &self.active_tracks
    }

    /// One animation tick.
    pub fn sync(&mut self, time_ms: f64, is_playing: bool) -> SyncOutcome {
        let sources = SyncSources {
            beats: &self.time_index,
            bounds: &self.spatial_index,
            render_complete: self.render_complete,
            active_tracks: &self.active_tracks,
        };
        self.engine.sync(&sources, time_ms, is_playing)
    }

    pub fn position(&self) -> CursorPosition {
        self.engine.position()
    }

    pub fn config(&self) -> &SyncConfig {
        self.engine.config()
    }
}

impl Default for PlaybackCursor {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

/// Serialize a tick result for the host UI.
pub fn outcome_to_json(outcome: &SyncOutcome) -> String {
    serde_json::to_string(outcome).unwrap_or_else(|_| "{}".to_string())
}
