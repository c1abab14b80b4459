//! Data model for the score snapshot and render-pass geometry consumed by
//! the cursor engine.
//!
//! A host exports these from its notation renderer once per score load
//! (beats) and once per render pass (bounds).

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Identifier of a track (one instrument line in the score).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u32);

/// Identifier of a beat, unique across the whole score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeatId(pub u32);

/// Hosts without unsigned ints (JVM) pass track ids as `i32`.
impl TryFrom<i32> for TrackId {
    type Error = std::num::TryFromIntError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        u32::try_from(id).map(TrackId)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track {}", self.0)
    }
}

impl fmt::Display for BeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "beat {}", self.0)
    }
}

/// The atomic playable unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beat {
    pub id: BeatId,
    /// Track this beat belongs to
    pub track: TrackId,
    /// Measure index (0-based) within the track
    #[serde(default)]
    pub measure: usize,
    /// Absolute playback start in milliseconds
    pub start_ms: f64,
    /// Playback duration in milliseconds (may be zero)
    pub duration_ms: f64,
    /// Whether this beat is a rest
    #[serde(default)]
    pub rest: bool,
    /// Next beat in playback order, `None` at the end of the piece
    #[serde(default)]
    pub next: Option<BeatId>,
}

impl Beat {
    pub fn end_ms(&self) -> f64 {
        self.start_ms + self.duration_ms
    }
}

/// One instrument line: an ordered beat sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    #[serde(default)]
    pub name: String,
    /// Beats in playback order
    pub beats: Vec<Beat>,
}

/// A loaded score snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Score {
    #[serde(default)]
    pub title: Option<String>,
    pub tracks: Vec<Track>,
}

impl Score {
    pub fn track_ids(&self) -> Vec<TrackId> {
        self.tracks.iter().map(|t| t.id).collect()
    }

    pub fn beat_count(&self) -> usize {
        self.tracks.iter().map(|t| t.beats.len()).sum()
    }

    /// Check the timing invariants every consumer relies on.
    ///
    /// - ids are unique (tracks and beats)
    /// - starts and durations are finite, durations are non-negative
    /// - starts never decrease within a track
    /// - every `next` points at an existing beat that does not start earlier
    pub fn validate(&self) -> Result<(), LoadError> {
        let mut track_ids = HashSet::new();
        let mut beat_starts = std::collections::HashMap::new();

        for track in &self.tracks {
            if !track_ids.insert(track.id) {
                return Err(LoadError::DuplicateTrack(track.id));
            }
            let mut prev_start = f64::NEG_INFINITY;
            for beat in &track.beats {
                if beat.track != track.id {
                    return Err(LoadError::invalid(beat.id, format!(
                        "listed under {} but tagged {}",
                        track.id, beat.track
                    )));
                }
                if !beat.start_ms.is_finite() {
                    return Err(LoadError::invalid(beat.id, "start is not finite"));
                }
                if !beat.duration_ms.is_finite() || beat.duration_ms < 0.0 {
                    return Err(LoadError::invalid(beat.id, format!(
                        "duration {} must be finite and non-negative",
                        beat.duration_ms
                    )));
                }
                if beat.start_ms < prev_start {
                    return Err(LoadError::invalid(beat.id, format!(
                        "start {}ms precedes previous beat start {}ms",
                        beat.start_ms, prev_start
                    )));
                }
                prev_start = beat.start_ms;
                if beat_starts.insert(beat.id, beat.start_ms).is_some() {
                    return Err(LoadError::DuplicateBeat(beat.id));
                }
            }
        }

        for beat in self.tracks.iter().flat_map(|t| &t.beats) {
            let Some(next) = beat.next else { continue };
            match beat_starts.get(&next) {
                None => {
                    let message = format!("next points at unknown {next}");
                    return Err(LoadError::invalid(beat.id, message));
                }
                Some(&next_start) if next_start < beat.start_ms => {
                    return Err(LoadError::invalid(beat.id, format!(
                        "next {next} starts at {next_start}ms, before {}ms",
                        beat.start_ms
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

/// Pixel rectangle in the current render pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Rendered bounds of one beat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeatBounds {
    /// The beat's own glyph rectangle
    pub visual: Rect,
    /// Canonical y of the row (system) containing the beat. A beat's own
    /// y drifts with stem direction and voice, so rows compare on this.
    pub row_y: f64,
}

/// Where the cursor is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: f64,
    pub y: f64,
    pub height: f64,
}

impl CursorPosition {
    pub fn new(x: f64, y: f64, height: f64) -> Self {
        Self { x, y, height }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.height.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_track_ids() {
        assert_eq!(TrackId::try_from(3), Ok(TrackId(3)));
        assert!(TrackId::try_from(-1).is_err());
    }

    fn beat(id: u32, start: f64, duration: f64, next: Option<u32>) -> Beat {
        Beat {
            id: BeatId(id),
            track: TrackId(0),
            measure: 0,
            start_ms: start,
            duration_ms: duration,
            rest: false,
            next: next.map(BeatId),
        }
    }

    fn score(beats: Vec<Beat>) -> Score {
        Score {
            title: None,
            tracks: vec![Track { id: TrackId(0), name: "Guitar".into(), beats }],
        }
    }

    #[test]
    fn validate_accepts_ties_and_zero_duration() {
        let s = score(vec![
            beat(0, 0.0, 0.0, Some(1)),
            beat(1, 0.0, 500.0, Some(2)),
            beat(2, 500.0, 500.0, None),
        ]);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn validate_rejects_negative_duration() {
        let s = score(vec![beat(0, 0.0, -1.0, None)]);
        assert!(matches!(s.validate(), Err(LoadError::InvalidBeat { .. })));
    }

    #[test]
    fn validate_rejects_dangling_next() {
        let s = score(vec![beat(0, 0.0, 100.0, Some(7))]);
        assert!(matches!(s.validate(), Err(LoadError::InvalidBeat { .. })));
    }

    #[test]
    fn validate_rejects_backward_next() {
        let s = score(vec![beat(0, 0.0, 100.0, None), beat(1, 200.0, 100.0, Some(0))]);
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_beat_ids() {
        let s = score(vec![beat(0, 0.0, 100.0, None), beat(0, 100.0, 100.0, None)]);
        assert!(matches!(s.validate(), Err(LoadError::DuplicateBeat(BeatId(0)))));
    }

    #[test]
    fn beat_json_defaults() {
        let b: Beat = serde_json::from_str(
            r#"{"id":3,"track":1,"start_ms":250.0,"duration_ms":125.0}"#,
        )
        .unwrap();
        assert_eq!(b.id, BeatId(3));
        assert_eq!(b.next, None);
        assert!(!b.rest);
        assert_eq!(b.end_ms(), 375.0);
    }
}
