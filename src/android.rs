//! JNI bindings for Android.
//!
//! These functions are called from Kotlin via the JNI bridge. The cursor
//! lives on the Rust heap and Kotlin holds it as an opaque `Long`.

use jni::objects::{JClass, JIntArray, JString};
use jni::sys::{jboolean, jdouble, jlong, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;

use crate::{cursor_from_config_json, outcome_to_json, PlaybackCursor, TrackId};

/// # Safety
/// `handle` must be 0 or a value returned by `nativeNew` that has not been
/// passed to `nativeFree`, with no other live reference to the cursor.
unsafe fn cursor_mut<'a>(handle: jlong) -> Option<&'a mut PlaybackCursor> {
    unsafe { (handle as *mut PlaybackCursor).as_mut() }
}


fn to_jboolean(ok: bool) -> jboolean {
    if ok { JNI_TRUE } else { JNI_FALSE }
}

/// Called from Kotlin as:
///   external fun nativeNew(configJson: String?): Long
#[no_mangle]
pub extern "system" fn Java_com_tabmentor_app_CursorSync_nativeNew(
    mut env: JNIEnv,
    _class: JClass,
    config_json: JString,
) -> jlong {
    let json: Option<String> = if config_json.is_null() {
        None
    } else {
        match env.get_string(&config_json) {
            Ok(s) => Some(s.into()),
            Err(_) => return 0,
        }
    };

    match cursor_from_config_json(json.as_deref()) {
        Ok(cursor) => Box::into_raw(Box::new(cursor)) as jlong,
        Err(e) => {
            log::warn!("nativeNew: {e}");
            0
        }
    }
}

/// Called from Kotlin as:
///   external fun nativeFree(handle: Long)
#[no_mangle]
pub extern "system" fn Java_com_tabmentor_app_CursorSync_nativeFree(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) {
    if handle != 0 {
        // SAFETY: the handle came from nativeNew and Kotlin frees it once.
        unsafe {
            drop(Box::from_raw(handle as *mut PlaybackCursor));
        }
    }
}

/// Called from Kotlin as:
///   external fun nativeLoadScore(handle: Long, scoreJson: String): Boolean
#[no_mangle]
pub extern "system" fn Java_com_tabmentor_app_CursorSync_nativeLoadScore(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
    score_json: JString,
) -> jboolean {
    // SAFETY: Kotlin only passes handles from nativeNew until nativeFree.
    let Some(cursor) = (unsafe { cursor_mut(handle) }) else { return JNI_FALSE };
    let json: String = match env.get_string(&score_json) {
        Ok(s) => s.into(),
        Err(_) => return JNI_FALSE,
    };
    let result = cursor.load_score_json(&json);
    if let Err(ref e) = result {
        log::warn!("nativeLoadScore: {e}");
    }
    to_jboolean(result.is_ok())
}

/// Called from Kotlin as:
///   external fun nativeBeginRenderPass(handle: Long)
#[no_mangle]
pub extern "system" fn Java_com_tabmentor_app_CursorSync_nativeBeginRenderPass(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) {
    // SAFETY: Kotlin only passes handles from nativeNew until nativeFree.
    if let Some(cursor) = unsafe { cursor_mut(handle) } {
        cursor.begin_render_pass();
    }
}

/// Called from Kotlin as:
///   external fun nativeLoadLayout(handle: Long, layoutJson: String): Boolean
#[no_mangle]
pub extern "system" fn Java_com_tabmentor_app_CursorSync_nativeLoadLayout(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
    layout_json: JString,
) -> jboolean {
    // SAFETY: Kotlin only passes handles from nativeNew until nativeFree.
    let Some(cursor) = (unsafe { cursor_mut(handle) }) else { return JNI_FALSE };
    let json: String = match env.get_string(&layout_json) {
        Ok(s) => s.into(),
        Err(_) => return JNI_FALSE,
    };
    let result = cursor.load_layout_json(&json);
    if let Err(ref e) = result {
        log::warn!("nativeLoadLayout: {e}");
    }
    to_jboolean(result.is_ok())
}

/// Called from Kotlin as:
///   external fun nativeSetActiveTracks(handle: Long, trackIds: IntArray): Boolean
#[no_mangle]
pub extern "system" fn Java_com_tabmentor_app_CursorSync_nativeSetActiveTracks(
    env: JNIEnv,
    _class: JClass,
    handle: jlong,
    track_ids: JIntArray,
) -> jboolean {
    // SAFETY: Kotlin only passes handles from nativeNew until nativeFree.
    let Some(cursor) = (unsafe { cursor_mut(handle) }) else { return JNI_FALSE };
    let len = match env.get_array_length(&track_ids) {
        Ok(n) => n.max(0) as usize,
        Err(_) => return JNI_FALSE,
    };
    let mut ids = vec![0i32; len];
    if env.get_int_array_region(&track_ids, 0, &mut ids).is_err() {
        return JNI_FALSE;
    }
    let tracks: Result<Vec<TrackId>, _> = ids.iter().map(|&id| TrackId::try_from(id)).collect();
    let Ok(tracks) = tracks else {
        log::warn!("nativeSetActiveTracks: negative track id in {ids:?}");
        return JNI_FALSE;
    };
    cursor.set_active_tracks(tracks);
    JNI_TRUE
}

/// Called from Kotlin as:
///   external fun nativeSync(handle: Long, timeMs: Double, isPlaying: Boolean): String?
#[no_mangle]
pub extern "system" fn Java_com_tabmentor_app_CursorSync_nativeSync(
    env: JNIEnv,
    _class: JClass,
    handle: jlong,
    time_ms: jdouble,
    is_playing: jboolean,
) -> jstring {
    // SAFETY: Kotlin only passes handles from nativeNew until nativeFree.
    let Some(cursor) = (unsafe { cursor_mut(handle) }) else { return std::ptr::null_mut() };
    let outcome = cursor.sync(time_ms, is_playing != JNI_FALSE);
    match env.new_string(outcome_to_json(&outcome)) {
        Ok(js) => js.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

