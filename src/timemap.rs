//! Compute absolute timestamps and durations for each beat from musical
//! durations.  Hosts whose notation engine already reports milliseconds
//! can build a `Score` directly; this is for callers that only know
//! quarter-note lengths and tempo marks.

use crate::model::{Beat, BeatId, Score, Track, TrackId};

/// Default tempo if none is specified.
pub const DEFAULT_TEMPO: f64 = 120.0;

/// One beat as written: a length in quarter notes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatSpec {
    pub quarters: f64,
    pub rest: bool,
}

impl BeatSpec {
    pub fn note(quarters: f64) -> Self {
        Self { quarters, rest: false }
    }

    pub fn rest(quarters: f64) -> Self {
        Self { quarters, rest: true }
    }
}

/// One measure: an optional tempo change followed by its beats.
#[derive(Debug, Clone, Default)]
pub struct MeasureSpec {
    /// Tempo taking effect at the start of this measure (BPM)
    pub tempo_bpm: Option<f64>,
    pub beats: Vec<BeatSpec>,
}

impl MeasureSpec {
    pub fn new(beats: Vec<BeatSpec>) -> Self {
        Self { tempo_bpm: None, beats }
    }

    pub fn with_tempo(mut self, bpm: f64) -> Self {
        self.tempo_bpm = Some(bpm);
        self
    }
}

/// Builds a `Score` with beat ids assigned in insertion order across
/// all tracks and `next` links set within each track.
#[derive(Debug, Default)]
pub struct ScoreBuilder {
    title: Option<String>,
    tracks: Vec<Track>,
    next_beat_id: u32,
}

impl ScoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a track laid out from `measures`, starting at 0 ms.
    pub fn track(mut self, name: impl Into<String>, measures: &[MeasureSpec]) -> Self {
        let id = TrackId(self.tracks.len() as u32);
        let beats = generate_beat_timings(id, measures, self.next_beat_id);
        self.next_beat_id += beats.len() as u32;
        self.tracks.push(Track { id, name: name.into(), beats });
        self
    }

    pub fn build(self) -> Score {
        Score { title: self.title, tracks: self.tracks }
    }
}

/// Walk the measures in order, carrying the active tempo forward, and
/// produce linked beats with millisecond timing.
///
/// Non-positive or non-finite tempo marks are ignored (the previous
/// tempo stays in effect); negative beat lengths are treated as zero.
pub fn generate_beat_timings(track: TrackId, measures: &[MeasureSpec], first_id: u32) -> Vec<Beat> {
    let mut beats: Vec<Beat> = Vec::new();
    let mut tempo = DEFAULT_TEMPO;
    let mut current_time_ms = 0.0;
    let mut id = first_id;

    for (measure_idx, measure) in measures.iter().enumerate() {
        if let Some(t) = measure.tempo_bpm {
            if t.is_finite() && t > 0.0 {
                tempo = t;
            }
        }
        let ms_per_quarter = 60_000.0 / tempo;

        for spec in &measure.beats {
            let duration_ms = spec.quarters.max(0.0) * ms_per_quarter;
            if let Some(prev) = beats.last_mut() {
                prev.next = Some(BeatId(id));
            }
            beats.push(Beat {
                id: BeatId(id),
                track,
                measure: measure_idx,
                start_ms: current_time_ms,
                duration_ms,
                rest: spec.rest,
                next: None,
            });
            id += 1;
            current_time_ms += duration_ms;
        }
    }

    beats
}

/// End time of the last beat in a track, in milliseconds.
pub fn total_duration_ms(track: &Track) -> f64 {
    track.beats.last().map_or(0.0, |b| b.end_ms())
}
