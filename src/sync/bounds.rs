//! Beat → rendered rectangle lookup for the current render pass.

use std::collections::HashMap;

use crate::error::{Readiness, SyncError};
use crate::model::{BeatBounds, BeatId};

/// Resolves a beat to its on-screen bounds.
///
/// `Err(SyncError::NotReady(..))` means the index has not been filled for
/// this render pass; `Ok(None)` means the beat simply was not drawn.
pub trait BoundsResolver {
    fn is_populated(&self) -> bool;

    fn resolve(&self, beat: BeatId) -> Result<Option<BeatBounds>, SyncError>;
}

/// Bounds of every drawn beat in one render pass.
///
/// Must be invalidated whenever the renderer starts a new pass so that no
/// rectangle from a previous layout survives a resize or track change.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    bounds: HashMap<BeatId, BeatBounds>,
    populated: bool,
    generation: u64,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all bounds; the index reports not-ready until repopulated.
    pub fn invalidate(&mut self) {
        self.bounds.clear();
        self.populated = false;
        self.generation += 1;
    }

    /// Install the bounds of a completed render pass.
    pub fn populate(&mut self, entries: impl IntoIterator<Item = (BeatId, BeatBounds)>) {
        self.bounds.clear();
        self.bounds.extend(entries);
        self.populated = true;
        self.generation += 1;
    }

    /// Bumped on every invalidate/populate; lets callers detect stale data.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

impl BoundsResolver for SpatialIndex {
    fn is_populated(&self) -> bool {
        self.populated
    }

    fn resolve(&self, beat: BeatId) -> Result<Option<BeatBounds>, SyncError> {
        if !self.populated {
            return Err(SyncError::NotReady(Readiness::SpatialIndex));
        }
        Ok(self.bounds.get(&beat).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rect;

    fn bounds(x: f64) -> BeatBounds {
        BeatBounds { visual: Rect { x, y: 40.0, w: 10.0, h: 60.0 }, row_y: 50.0 }
    }

    #[test]
    fn not_ready_is_distinct_from_missing() {
        let mut idx = SpatialIndex::new();
        assert_eq!(
            idx.resolve(BeatId(0)),
            Err(SyncError::NotReady(Readiness::SpatialIndex))
        );

        idx.populate([(BeatId(0), bounds(100.0))]);
        assert_eq!(idx.resolve(BeatId(0)), Ok(Some(bounds(100.0))));
        assert_eq!(idx.resolve(BeatId(1)), Ok(None));
    }

    #[test]
    fn invalidate_drops_previous_pass() {
        let mut idx = SpatialIndex::new();
        idx.populate([(BeatId(0), bounds(100.0))]);
        let before = idx.generation();

        idx.invalidate();
        assert!(!idx.is_populated());
        assert!(idx.is_empty());
        assert!(idx.generation() > before);

        idx.populate([(BeatId(1), bounds(200.0))]);
        assert_eq!(idx.resolve(BeatId(0)), Ok(None));
    }
}
