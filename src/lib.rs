//! cursorsync — playback cursor synchronization for scrolling tablature.
//!
//! Given the playback time of an audio transport, finds the beat being
//! played, looks up where the notation renderer drew it, and produces a
//! smoothly interpolated cursor position once per animation frame.
//!
//! # Example
//! ```
//! use cursorsync::{PlaybackCursor, RenderLayout, BeatLayout, BeatBounds, BeatId, Rect};
//! use cursorsync::timemap::{BeatSpec, MeasureSpec, ScoreBuilder};
//!
//! let score = ScoreBuilder::new()
//!     .track("Guitar", &[MeasureSpec::new(vec![BeatSpec::note(1.0), BeatSpec::note(1.0)])])
//!     .build();
//!
//! let mut cursor = PlaybackCursor::default();
//! cursor.load_score(&score).unwrap();
//!
//! let at = |beat, x| BeatLayout {
//!     beat: BeatId(beat),
//!     bounds: BeatBounds { visual: Rect { x, y: 40.0, w: 10.0, h: 70.0 }, row_y: 50.0 },
//! };
//! let layout = RenderLayout { tracks: vec![], beats: vec![at(0, 100.0), at(1, 200.0)] };
//! cursor.complete_render_pass(layout).unwrap();
//!
//! let frame = cursor.sync(250.0, true);
//! assert_eq!(frame.position.x, 150.0);
//! assert_eq!(frame.status.to_string(), "interpolating");
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod playback;
pub mod sync;
pub mod timemap;

#[cfg(target_os = "android")]
pub mod android;

pub use config::SyncConfig;
pub use error::{ConfigError, LoadError, Readiness, SyncError};
pub use model::*;
pub use playback::{outcome_to_json, BeatLayout, PlaybackCursor, RenderLayout};
pub use sync::{
    find_next_valid, progress, BeatIndex, BoundsResolver, CursorPositionCache, InterpolationEngine,
    SpatialIndex, SyncOutcome, SyncSources, SyncStatus, TimeIndex,
};

/// Build a cursor from an optional JSON config. `None` uses the defaults.
pub fn cursor_from_config_json(config_json: Option<&str>) -> Result<PlaybackCursor, ConfigError> {
    let config = match config_json {
        Some(json) => SyncConfig::from_json(json)?,
        None => SyncConfig::default(),
    };
    Ok(PlaybackCursor::new(config))
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI — for iOS (static library) and other native hosts
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Borrow a C string as UTF-8, or `None` if null or invalid.
///
/// # Safety
/// `ptr` must be null or a valid null-terminated C string.
unsafe fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Create a cursor. `config_json` may be null for defaults.
/// Returns null if the config is invalid. Free with `cursorsync_free`.
///
/// # Safety
/// `config_json` must be null or a valid null-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn cursorsync_new(config_json: *const c_char) -> *mut PlaybackCursor {
    let json = if config_json.is_null() {
        None
    } else {
        match unsafe { c_str(config_json) } {
            Some(s) => Some(s),
            None => return std::ptr::null_mut(),
        }
    };
    match cursor_from_config_json(json) {
        Ok(cursor) => Box::into_raw(Box::new(cursor)),
        Err(e) => {
            log::warn!("cursorsync_new: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Destroy a cursor created by `cursorsync_new`.
///
/// # Safety
/// `handle` must be null or a pointer returned by `cursorsync_new` that
/// has not been freed.
#[no_mangle]
pub unsafe extern "C" fn cursorsync_free(handle: *mut PlaybackCursor) {
    if !handle.is_null() {
        unsafe {
            drop(Box::from_raw(handle));
        }
    }
}

/// Load a score snapshot (JSON). Returns false on any error.
///
/// # Safety
/// `handle` must be a live cursor; `score_json` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn cursorsync_load_score(
    handle: *mut PlaybackCursor,
    score_json: *const c_char,
) -> bool {
    let Some(cursor) = (unsafe { handle.as_mut() }) else { return false };
    let Some(json) = (unsafe { c_str(score_json) }) else { return false };
    match cursor.load_score_json(json) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("cursorsync_load_score: {e}");
            false
        }
    }
}

/// Mark the start of a render pass; bounds are unavailable until
/// `cursorsync_load_layout` succeeds.
///
/// # Safety
/// `handle` must be null or a live cursor.
#[no_mangle]
pub unsafe extern "C" fn cursorsync_begin_render_pass(handle: *mut PlaybackCursor) {
    if let Some(cursor) = unsafe { handle.as_mut() } {
        cursor.begin_render_pass();
    }
}

/// Install a completed render pass (JSON `RenderLayout`).
///
/// # Safety
/// `handle` must be a live cursor; `layout_json` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn cursorsync_load_layout(
    handle: *mut PlaybackCursor,
    layout_json: *const c_char,
) -> bool {
    let Some(cursor) = (unsafe { handle.as_mut() }) else { return false };
    let Some(json) = (unsafe { c_str(layout_json) }) else { return false };
    match cursor.load_layout_json(json) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("cursorsync_load_layout: {e}");
            false
        }
    }
}

/// Set the active tracks from an array of track ids.
///
/// # Safety
/// `handle` must be a live cursor; `ids` must point to `len` values
/// (or be null with `len == 0`).
#[no_mangle]
pub unsafe extern "C" fn cursorsync_set_active_tracks(
    handle: *mut PlaybackCursor,
    ids: *const u32,
    len: usize,
) -> bool {
    let Some(cursor) = (unsafe { handle.as_mut() }) else {
        return false;
    };
    let tracks = if len == 0 {
        Vec::new()
    } else if ids.is_null() {
        return false;
    } else {
        unsafe { std::slice::from_raw_parts(ids, len) }
            .iter()
            .map(|&id| TrackId(id))
            .collect()
    };
    cursor.set_active_tracks(tracks);
    true
}

/// Run one sync tick and return the outcome as JSON
/// (`{"x","y","height","status","beat"}`).
/// The caller must free the returned string with `cursorsync_free_string`.
///
/// # Safety
/// `handle` must be null or a live cursor.
#[no_mangle]
pub unsafe extern "C" fn cursorsync_sync(
    handle: *mut PlaybackCursor,
    time_ms: f64,
    is_playing: bool,
) -> *mut c_char {
    let Some(cursor) = (unsafe { handle.as_mut() }) else {
        return std::ptr::null_mut();
    };
    let outcome = cursor.sync(time_ms, is_playing);
    CString::new(outcome_to_json(&outcome))
        .map(CString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}

/// Free a string previously returned by cursorsync functions.
///
/// # Safety
/// `ptr` must be a string previously returned by a cursorsync function, or null.
#[no_mangle]
pub unsafe extern "C" fn cursorsync_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
