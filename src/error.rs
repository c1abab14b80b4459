//! # Error Types
//!
//! - `SyncError` - raised by the beat/bounds adapters during a sync tick.
//!   The engine absorbs these; they never reach the host as failures.
//! - `LoadError` - a score snapshot or render layout was rejected on load.
//! - `ConfigError` - engine configuration could not be parsed or is out of range.

use thiserror::Error;

use crate::model::{BeatId, TrackId};

/// Which readiness signal is missing, in the order the engine checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    SpatialIndex,
    RenderPass,
    BeatIndex,
    ActiveTracks,
}

impl Readiness {
    pub fn describe(self) -> &'static str {
        match self {
            Readiness::SpatialIndex => "spatial index not populated",
            Readiness::RenderPass => "render pass not complete",
            Readiness::BeatIndex => "beat index not populated",
            Readiness::ActiveTracks => "no active tracks",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// A collaborator is not ready yet (startup or mid re-render).
    #[error("Not ready: {}", .0.describe())]
    NotReady(Readiness),

    /// A beat id was referenced that the index does not know.
    #[error("Unknown {0}")]
    UnknownBeat(BeatId),

    /// Score data is inconsistent in a way validation could not catch
    /// (for instance a hand-written adapter returning garbage).
    #[error("Malformed score data: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate {0}")]
    DuplicateTrack(TrackId),

    #[error("Duplicate {0}")]
    DuplicateBeat(BeatId),

    #[error("Invalid {beat}: {message}")]
    InvalidBeat { beat: BeatId, message: String },

    /// Layout refers to a beat the loaded score does not contain.
    #[error("Layout references unknown {0}")]
    UnknownLayoutBeat(BeatId),

    #[error("Non-finite bounds for {0}")]
    InvalidBounds(BeatId),

    #[error("No score loaded")]
    NoScore,
}

impl LoadError {
    pub(crate) fn invalid(beat: BeatId, message: impl Into<String>) -> Self {
        LoadError::InvalidBeat { beat, message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config value `{field}` must be finite and non-negative, got {value}")]
    OutOfRange { field: &'static str, value: f64 },
}
