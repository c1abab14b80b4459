//! Diagnostic status reported alongside each cursor position.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::Readiness;
use crate::model::{BeatId, CursorPosition};

/// How the position of a tick was obtained. Purely diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Blended between the current beat and the next drawn beat on its row.
    Interpolating,
    /// No usable next beat; advanced by the assumed per-beat spacing.
    Estimating,
    /// Current beat has no bounds; drifting forward from the last position.
    Drifting,
    /// Cursor placed without motion (zero-length beat or paused drift).
    Static,
    /// No beat sounds at this time; holding.
    NoBeat,
    /// A readiness precondition failed; holding.
    NotReady(Readiness),
    /// A lookup failed or produced non-finite data; holding.
    Error,
}

impl SyncStatus {
    /// Whether this tick kept the previous position verbatim.
    pub fn is_hold(self) -> bool {
        matches!(self, SyncStatus::NoBeat | SyncStatus::NotReady(_) | SyncStatus::Error)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Interpolating => f.write_str("interpolating"),
            SyncStatus::Estimating => f.write_str("estimating"),
            SyncStatus::Drifting => f.write_str("drifting"),
            SyncStatus::Static => f.write_str("static"),
            SyncStatus::NoBeat => f.write_str("hold: no beat at time"),
            SyncStatus::NotReady(r) => write!(f, "not ready: {}", r.describe()),
            SyncStatus::Error => f.write_str("hold: error"),
        }
    }
}

impl Serialize for SyncStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of one sync tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SyncOutcome {
    #[serde(flatten)]
    pub position: CursorPosition,
    pub status: SyncStatus,
    /// Beat the position was derived from, if any
    pub beat: Option<BeatId>,
}

impl SyncOutcome {
    pub(crate) fn hold(position: CursorPosition, status: SyncStatus) -> Self {
        Self { position, status, beat: None }
    }
}
