//! Forward scan for the next beat that can serve as an interpolation
//! target: drawn, and on the same row as the current beat.

use log::trace;

use super::beat_index::BeatIndex;
use super::bounds::BoundsResolver;
use crate::error::SyncError;
use crate::model::{Beat, BeatBounds, BeatId};

/// A successor that has bounds on the current row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextBeat {
    pub id: BeatId,
    pub start_ms: f64,
    pub bounds: BeatBounds,
}

/// Walk `current.next` looking for a drawn beat whose row y equals
/// `row_y` exactly. Rests (no bounds), beats whose bounds are not ready
/// yet and beats on other rows are skipped. At most `max_depth` successors
/// are inspected.
pub fn find_next_valid<B, R>(
    beats: &B,
    bounds: &R,
    current: &Beat,
    row_y: f64,
    max_depth: usize,
) -> Result<Option<NextBeat>, SyncError>
where
    B: BeatIndex + ?Sized,
    R: BoundsResolver + ?Sized,
{
    let mut candidate = current.next;
    let mut depth = 0;

    while let Some(id) = candidate {
        if depth >= max_depth {
            trace!("lookahead from {} gave up after {} beats", current.id, depth);
            return Ok(None);
        }
        let beat = beats.beat(id)?;
        match bounds.resolve(id) {
            Ok(Some(b)) if b.row_y == row_y => {
                return Ok(Some(NextBeat { id, start_ms: beat.start_ms, bounds: b }));
            }
            Ok(_) => {}
            Err(SyncError::NotReady(r)) => trace!("lookahead skips {id}: {}", r.describe()),
            Err(e) => return Err(e),
        }
        candidate = beat.next;
        depth += 1;
    }

    Ok(None)
}
