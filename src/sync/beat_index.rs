//! Time → beat lookup.

use std::collections::HashMap;

use crate::error::{LoadError, SyncError};
use crate::model::{Beat, BeatId, Score, TrackId};

/// Finds the beat sounding at a playback time.
pub trait BeatIndex {
    /// Whether a score has been indexed.
    fn is_populated(&self) -> bool;

    /// The single beat active at `time_ms` among `tracks`, if any.
    fn find_beat(&self, tracks: &[TrackId], time_ms: f64) -> Result<Option<BeatId>, SyncError>;

    fn beat(&self, id: BeatId) -> Result<&Beat, SyncError>;
}

/// `BeatIndex` over a validated score snapshot.
///
/// Within a track a beat stays active from its start until the next beat
/// starts, so rests and gaps never leave a hole. The last beat of a track
/// is active until its own end. Beats sharing a start time (multiple
/// voices) resolve to the first one in sequence order. Across tracks the
/// latest start wins; ties go to the track listed first.
#[derive(Debug, Default)]
pub struct TimeIndex {
    beats: Vec<Beat>,
    by_id: HashMap<BeatId, usize>,
    /// Beat positions (into `beats`) per track, in playback order
    tracks: HashMap<TrackId, Vec<usize>>,
    populated: bool,
}

impl TimeIndex {
    /// An index with nothing loaded; reports not populated.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_score(score: &Score) -> Result<Self, LoadError> {
        score.validate()?;

        let mut beats = Vec::with_capacity(score.beat_count());
        let mut by_id = HashMap::with_capacity(score.beat_count());
        let mut tracks = HashMap::with_capacity(score.tracks.len());

        for track in &score.tracks {
            let mut order = Vec::with_capacity(track.beats.len());
            for beat in &track.beats {
                by_id.insert(beat.id, beats.len());
                order.push(beats.len());
                beats.push(beat.clone());
            }
            tracks.insert(track.id, order);
        }

        Ok(Self { beats, by_id, tracks, populated: true })
    }

    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    fn find_in_track(&self, order: &[usize], time_ms: f64) -> Option<&Beat> {
        let after = order.partition_point(|&i| self.beats[i].start_ms <= time_ms);
        if after == 0 {
            return None;
        }

        let start = self.beats[order[after - 1]].start_ms;
        let mut first = after - 1;
        while first > 0 && self.beats[order[first - 1]].start_ms == start {
            first -= 1;
        }

        // A later beat exists, so this group owns the time until it starts.
        if after < order.len() {
            return Some(&self.beats[order[first]]);
        }

        let group_end = order[first..after]
            .iter()
            .map(|&i| self.beats[i].end_ms())
            .fold(f64::NEG_INFINITY, f64::max);
        if time_ms < group_end {
            Some(&self.beats[order[first]])
        } else {
            None
        }
    }
}

impl BeatIndex for TimeIndex {
    fn is_populated(&self) -> bool {
        self.populated
    }

    fn find_beat(&self, tracks: &[TrackId], time_ms: f64) -> Result<Option<BeatId>, SyncError> {
        let mut best: Option<&Beat> = None;
        for track in tracks {
            let Some(order) = self.tracks.get(track) else { continue };
            let Some(found) = self.find_in_track(order, time_ms) else { continue };
            match best {
                Some(b) if b.start_ms >= found.start_ms => {}
                _ => best = Some(found),
            }
        }
        Ok(best.map(|b| b.id))
    }

    fn beat(&self, id: BeatId) -> Result<&Beat, SyncError> {
        self.by_id
            .get(&id)
            .map(|&i| &self.beats[i])
            .ok_or(SyncError::UnknownBeat(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Track;

    fn beat(id: u32, track: u32, start: f64, duration: f64) -> Beat {
        Beat {
            id: BeatId(id),
            track: TrackId(track),
            measure: 0,
            start_ms: start,
            duration_ms: duration,
            rest: false,
            next: None,
        }
    }

    fn index(tracks: Vec<(u32, Vec<Beat>)>) -> TimeIndex {
        let score = Score {
            title: None,
            tracks: tracks
                .into_iter()
                .map(|(id, beats)| Track { id: TrackId(id), name: String::new(), beats })
                .collect(),
        };
        TimeIndex::from_score(&score).unwrap()
    }

    #[test]
    fn empty_index_is_not_populated() {
        assert!(!TimeIndex::empty().is_populated());
    }

    #[test]
    fn finds_beat_containing_time() {
        let idx = index(vec![(0, vec![beat(0, 0, 0.0, 500.0), beat(1, 0, 500.0, 500.0)])]);
        let t = [TrackId(0)];
        assert_eq!(idx.find_beat(&t, 0.0).unwrap(), Some(BeatId(0)));
        assert_eq!(idx.find_beat(&t, 499.9).unwrap(), Some(BeatId(0)));
        assert_eq!(idx.find_beat(&t, 500.0).unwrap(), Some(BeatId(1)));
    }

    #[test]
    fn before_start_and_past_end_find_nothing() {
        let idx = index(vec![(0, vec![beat(0, 0, 100.0, 500.0)])]);
        let t = [TrackId(0)];
        assert_eq!(idx.find_beat(&t, 50.0).unwrap(), None);
        assert_eq!(idx.find_beat(&t, 600.0).unwrap(), None);
        assert_eq!(idx.find_beat(&t, f64::NAN).unwrap(), None);
    }

    #[test]
    fn gap_belongs_to_previous_beat() {
        let idx = index(vec![(0, vec![beat(0, 0, 0.0, 100.0), beat(1, 0, 400.0, 100.0)])]);
        assert_eq!(idx.find_beat(&[TrackId(0)], 250.0).unwrap(), Some(BeatId(0)));
    }

    #[test]
    fn equal_starts_pick_first_voice() {
        let idx = index(vec![(0, vec![
            beat(0, 0, 0.0, 0.0),
            beat(1, 0, 0.0, 250.0),
        ])]);
        assert_eq!(idx.find_beat(&[TrackId(0)], 100.0).unwrap(), Some(BeatId(0)));
    }

    #[test]
    fn latest_start_wins_across_tracks() {
        let idx = index(vec![
            (0, vec![beat(0, 0, 0.0, 1000.0)]),
            (1, vec![beat(1, 1, 0.0, 500.0), beat(2, 1, 500.0, 500.0)]),
        ]);
        let both = [TrackId(0), TrackId(1)];
        assert_eq!(idx.find_beat(&both, 600.0).unwrap(), Some(BeatId(2)));
        // tie at 0ms: first listed track
        assert_eq!(idx.find_beat(&both, 100.0).unwrap(), Some(BeatId(0)));
        let reversed = [TrackId(1), TrackId(0)];
        assert_eq!(idx.find_beat(&reversed, 100.0).unwrap(), Some(BeatId(1)));
    }

    #[test]
    fn inactive_tracks_are_ignored() {
        let idx = index(vec![(0, vec![beat(0, 0, 0.0, 1000.0)])]);
        assert_eq!(idx.find_beat(&[TrackId(9)], 10.0).unwrap(), None);
    }

    #[test]
    fn unknown_beat_is_an_error() {
        let idx = index(vec![(0, vec![beat(0, 0, 0.0, 1000.0)])]);
        assert_eq!(idx.beat(BeatId(42)).unwrap_err(), SyncError::UnknownBeat(BeatId(42)));
    }
}
