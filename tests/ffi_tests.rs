//! C ABI tests: exercise the exported functions exactly as a native host
//! (iOS static library) calls them.

use std::ffi::{CStr, CString};
use std::ptr;

use cursorsync::{
    cursorsync_begin_render_pass, cursorsync_free, cursorsync_free_string, cursorsync_load_layout,
    cursorsync_load_score, cursorsync_new, cursorsync_set_active_tracks, cursorsync_sync,
};
use pretty_assertions::assert_eq;

const SCORE: &str = r#"{"tracks":[
    {"id":0,"name":"Lead","beats":[
        {"id":0,"track":0,"start_ms":1000.0,"duration_ms":500.0,"next":1},
        {"id":1,"track":0,"start_ms":1500.0,"duration_ms":500.0}
    ]},
    {"id":1,"name":"Rhythm","beats":[
        {"id":2,"track":1,"start_ms":1000.0,"duration_ms":1000.0}
    ]}
]}"#;

const LAYOUT: &str = r#"{"beats":[
    {"beat":0,"bounds":{"visual":{"x":100.0,"y":40.0,"w":10.0,"h":80.0},"row_y":50.0}},
    {"beat":1,"bounds":{"visual":{"x":180.0,"y":40.0,"w":10.0,"h":80.0},"row_y":50.0}},
    {"beat":2,"bounds":{"visual":{"x":400.0,"y":300.0,"w":10.0,"h":80.0},"row_y":310.0}}
]}"#;

fn c(s: &str) -> CString {
    CString::new(s).unwrap()
}

/// Run a sync tick and parse the returned JSON.
unsafe fn sync_json(handle: *mut cursorsync::PlaybackCursor, time_ms: f64) -> serde_json::Value {
    let raw = unsafe { cursorsync_sync(handle, time_ms, true) };
    assert!(!raw.is_null());
    let text = unsafe { CStr::from_ptr(raw) }.to_str().unwrap().to_owned();
    unsafe { cursorsync_free_string(raw) };
    serde_json::from_str(&text).unwrap()
}

#[test]
fn full_session_over_c_abi() {
    unsafe {
        let handle = cursorsync_new(ptr::null());
        assert!(!handle.is_null());

        let held = sync_json(handle, 1250.0);
        assert_eq!(held["status"], "not ready: spatial index not populated");
        assert_eq!(held["x"], 0.0);

        assert!(cursorsync_load_score(handle, c(SCORE).as_ptr()));
        assert!(cursorsync_load_layout(handle, c(LAYOUT).as_ptr()));

        let frame = sync_json(handle, 1250.0);
        assert_eq!(frame["status"], "interpolating");
        assert_eq!(frame["x"], 140.0);
        assert_eq!(frame["beat"], 0);

        // only the rhythm track
        let ids = [1u32];
        assert!(cursorsync_set_active_tracks(handle, ids.as_ptr(), ids.len()));
        let rhythm = sync_json(handle, 1250.0);
        assert_eq!(rhythm["beat"], 2);
        assert_eq!(rhythm["status"], "estimating");
        assert_eq!(rhythm["x"], 420.0);
        assert_eq!(rhythm["y"], 300.0);

        cursorsync_begin_render_pass(handle);
        let rerender = sync_json(handle, 1300.0);
        assert_eq!(rerender["x"], 420.0);

        cursorsync_free(handle);
    }
}

#[test]
fn config_json_is_applied() {
    unsafe {
        let handle = cursorsync_new(c(r#"{"estimate_spacing_px": 40.0}"#).as_ptr());
        assert!(!handle.is_null());
        assert!(cursorsync_load_score(handle, c(SCORE).as_ptr()));
        assert!(cursorsync_load_layout(handle, c(LAYOUT).as_ptr()));
        let ids = [1u32];
        assert!(cursorsync_set_active_tracks(handle, ids.as_ptr(), ids.len()));

        let frame = sync_json(handle, 1500.0);
        assert_eq!(frame["x"], 420.0);
        cursorsync_free(handle);
    }
}

#[test]
fn invalid_inputs_never_panic() {
    unsafe {
        assert!(cursorsync_new(c("{not json").as_ptr()).is_null());
        assert!(cursorsync_new(c(r#"{"frame_delta_sec": -1.0}"#).as_ptr()).is_null());

        assert!(cursorsync_sync(ptr::null_mut(), 0.0, true).is_null());
        assert!(!cursorsync_load_score(ptr::null_mut(), c(SCORE).as_ptr()));
        cursorsync_begin_render_pass(ptr::null_mut());
        cursorsync_free(ptr::null_mut());
        cursorsync_free_string(ptr::null_mut());

        let handle = cursorsync_new(ptr::null());
        assert!(!cursorsync_load_score(handle, ptr::null()));
        assert!(!cursorsync_load_score(handle, c("[]").as_ptr()));
        // layout before any score
        assert!(!cursorsync_load_layout(handle, c(LAYOUT).as_ptr()));
        assert!(!cursorsync_set_active_tracks(handle, ptr::null(), 3));
        assert!(cursorsync_set_active_tracks(handle, ptr::null(), 0));
        cursorsync_free(handle);
    }
}
