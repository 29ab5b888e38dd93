//! FFI bindings for the Wellplan engine
//!
//! C-compatible entry points for mobile and web hosts. All inputs and outputs
//! are JSON in null-terminated C strings; returned strings must be freed with
//! `wellplan_free_string`. On failure a function returns NULL and the message
//! is available from `wellplan_last_error`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use serde::Serialize;

use crate::analytics::{LogEntryParser, Metric, MetricAnalytics};
use crate::engine::Engine;
use crate::error::{parse_date, EngineError};
use crate::plan::{Catalog, GeneratorOptions, PlanBundle};
use crate::profile::UserProfile;
use crate::targets::TargetSet;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Read a required string argument
unsafe fn required(ptr: *const c_char, name: &str) -> Result<String, EngineError> {
    cstr_to_string(ptr).ok_or_else(|| EngineError::ConfigError(format!("invalid {} string pointer", name)))
}

/// Serialize a result, or record its error and return NULL
fn respond<T: Serialize>(result: Result<T, EngineError>) -> *mut c_char {
    match result.and_then(|value| serde_json::to_string(&value).map_err(EngineError::from)) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&format!("{}: {}", e.code(), e));
            ptr::null_mut()
        }
    }
}

fn options_for(seed: i64) -> GeneratorOptions {
    if seed < 0 {
        GeneratorOptions::default()
    } else {
        GeneratorOptions::with_seed(seed as u64)
    }
}

unsafe fn plans_json(
    engine: &Engine,
    profile_json: *const c_char,
    targets_json: *const c_char,
    catalog_json: *const c_char,
    seed: i64,
) -> Result<PlanBundle, EngineError> {
    let profile = UserProfile::from_json(&required(profile_json, "profile")?)?;
    let targets = match cstr_to_string(targets_json) {
        Some(json) => serde_json::from_str::<TargetSet>(&json)?,
        None => engine.compute_targets(&profile)?,
    };
    let catalog = match cstr_to_string(catalog_json) {
        Some(json) => Catalog::from_json(&json)?,
        None => Catalog::builtin(),
    };
    engine.generate_plans(&profile, &targets, &catalog, options_for(seed))
}

unsafe fn analytics_json(
    engine: &Engine,
    entries_json: *const c_char,
    metric: *const c_char,
    as_of: *const c_char,
    window_days: u32,
) -> Result<MetricAnalytics, EngineError> {
    let entries = LogEntryParser::parse_validated(&required(entries_json, "entries")?)?;
    let metric = Metric::parse(&required(metric, "metric")?)?;
    let as_of = parse_date(&required(as_of, "as_of")?)?;
    engine.metric_analytics(&entries, metric, as_of, window_days)
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute daily targets for a profile.
///
/// # Safety
/// - `profile_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `wellplan_free_string`.
/// - Returns NULL on error; call `wellplan_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn wellplan_compute_targets(profile_json: *const c_char) -> *mut c_char {
    clear_last_error();
    respond(
        required(profile_json, "profile")
            .and_then(|json| UserProfile::from_json(&json))
            .and_then(|profile| Engine::default().compute_targets(&profile)),
    )
}

/// Generate nutrition, fitness and wellness plans.
///
/// `targets_json` and `catalog_json` may be NULL: targets are then computed
/// from the profile and the built-in catalog is used. A negative `seed`
/// selects the seed derived from the profile and catalog.
///
/// # Safety
/// - `profile_json` must be a valid null-terminated C string; the other
///   strings must be valid or NULL.
/// - Returns a newly allocated string that must be freed with `wellplan_free_string`.
/// - Returns NULL on error; call `wellplan_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn wellplan_generate_plans(
    profile_json: *const c_char,
    targets_json: *const c_char,
    catalog_json: *const c_char,
    seed: i64,
) -> *mut c_char {
    clear_last_error();
    respond(plans_json(&Engine::default(), profile_json, targets_json, catalog_json, seed))
}

/// Compute streak and rolling analytics for one metric.
///
/// `entries_json` is a JSON array or NDJSON of log entries; `as_of` is `YYYY-MM-DD`.
///
/// # Safety
/// - All string arguments must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `wellplan_free_string`.
/// - Returns NULL on error; call `wellplan_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn wellplan_metric_analytics(
    entries_json: *const c_char,
    metric: *const c_char,
    as_of: *const c_char,
    window_days: u32,
) -> *mut c_char {
    clear_last_error();
    respond(analytics_json(&Engine::default(), entries_json, metric, as_of, window_days))
}

// ============================================================================
// Configured Engine API
// ============================================================================

/// Opaque handle to a configured engine
pub struct WellplanEngineHandle {
    engine: Engine,
}

/// Create an engine from configuration JSON (NULL for defaults).
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string or NULL.
/// - Must be freed with `wellplan_engine_free`.
/// - Returns NULL if the configuration is invalid.
#[no_mangle]
pub unsafe extern "C" fn wellplan_engine_new(config_json: *const c_char) -> *mut WellplanEngineHandle {
    clear_last_error();

    let engine = match cstr_to_string(config_json) {
        Some(json) => Engine::from_config_json(&json),
        None => Ok(Engine::default()),
    };
    match engine {
        Ok(engine) => Box::into_raw(Box::new(WellplanEngineHandle { engine })),
        Err(e) => {
            set_last_error(&format!("{}: {}", e.code(), e));
            ptr::null_mut()
        }
    }
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a pointer returned by `wellplan_engine_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn wellplan_engine_free(engine: *mut WellplanEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Compute targets with a configured engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `wellplan_engine_new`.
/// - `profile_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `wellplan_free_string`.
#[no_mangle]
pub unsafe extern "C" fn wellplan_engine_compute_targets(
    engine: *mut WellplanEngineHandle,
    profile_json: *const c_char,
) -> *mut c_char {
    clear_last_error();
    let Some(handle) = engine.as_ref() else {
        set_last_error("Invalid engine pointer");
        return ptr::null_mut();
    };
    respond(
        required(profile_json, "profile")
            .and_then(|json| UserProfile::from_json(&json))
            .and_then(|profile| handle.engine.compute_targets(&profile)),
    )
}

/// Generate plans with a configured engine. Arguments as `wellplan_generate_plans`.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `wellplan_engine_new`.
/// - String arguments as `wellplan_generate_plans`.
#[no_mangle]
pub unsafe extern "C" fn wellplan_engine_generate_plans(
    engine: *mut WellplanEngineHandle,
    profile_json: *const c_char,
    targets_json: *const c_char,
    catalog_json: *const c_char,
    seed: i64,
) -> *mut c_char {
    clear_last_error();
    let Some(handle) = engine.as_ref() else {
        set_last_error("Invalid engine pointer");
        return ptr::null_mut();
    };
    respond(plans_json(&handle.engine, profile_json, targets_json, catalog_json, seed))
}

/// Metric analytics with a configured engine. Arguments as `wellplan_metric_analytics`.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `wellplan_engine_new`.
/// - String arguments as `wellplan_metric_analytics`.
#[no_mangle]
pub unsafe extern "C" fn wellplan_engine_metric_analytics(
    engine: *mut WellplanEngineHandle,
    entries_json: *const c_char,
    metric: *const c_char,
    as_of: *const c_char,
    window_days: u32,
) -> *mut c_char {
    clear_last_error();
    let Some(handle) = engine.as_ref() else {
        set_last_error("Invalid engine pointer");
        return ptr::null_mut();
    };
    respond(analytics_json(&handle.engine, entries_json, metric, as_of, window_days))
}

/// Wellness dashboard summary from mixed-metric entries.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `wellplan_engine_new`.
/// - `entries_json` and `as_of` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `wellplan_free_string`.
#[no_mangle]
pub unsafe extern "C" fn wellplan_engine_wellness_summary(
    engine: *mut WellplanEngineHandle,
    entries_json: *const c_char,
    as_of: *const c_char,
) -> *mut c_char {
    clear_last_error();
    let Some(handle) = engine.as_ref() else {
        set_last_error("Invalid engine pointer");
        return ptr::null_mut();
    };
    let result = (|| {
        let entries = LogEntryParser::parse_validated(&required(entries_json, "entries")?)?;
        let as_of = parse_date(&required(as_of, "as_of")?)?;
        handle.engine.wellness_summary(&entries, as_of)
    })();
    respond(result)
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Wellplan functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Wellplan function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn wellplan_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message, prefixed with its error code.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Wellplan function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn wellplan_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn wellplan_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests::sample_profile;

    fn profile_cstring() -> CString {
        CString::new(serde_json::to_string(&sample_profile()).unwrap()).unwrap()
    }

    unsafe fn take(ptr: *mut c_char) -> serde_json::Value {
        assert!(!ptr.is_null());
        let value = serde_json::from_str(CStr::from_ptr(ptr).to_str().unwrap()).unwrap();
        wellplan_free_string(ptr);
        value
    }

    #[test]
    fn test_ffi_compute_targets() {
        let profile = profile_cstring();
        unsafe {
            let targets = take(wellplan_compute_targets(profile.as_ptr()));
            let bmr = targets["bmr"].as_f64().unwrap();
            assert!((bmr - 1780.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ffi_generate_plans_defaults() {
        let profile = profile_cstring();
        unsafe {
            let bundle = take(wellplan_generate_plans(profile.as_ptr(), ptr::null(), ptr::null(), 7));
            assert_eq!(bundle["seed"], 7);
            assert_eq!(bundle["nutrition"]["meals"].as_array().unwrap().len(), 4);
            assert_eq!(bundle["user_id"], "user-1");
        }
    }

    #[test]
    fn test_ffi_metric_analytics() {
        let entries = CString::new(
            r#"[
                {"user_id": "u", "date": "2024-01-01", "metric": "water", "milliliters": 1000},
                {"user_id": "u", "date": "2024-01-03", "metric": "water", "milliliters": 2000}
            ]"#,
        )
        .unwrap();
        let metric = CString::new("water").unwrap();
        let as_of = CString::new("2024-01-07").unwrap();
        unsafe {
            let analytics = take(wellplan_metric_analytics(entries.as_ptr(), metric.as_ptr(), as_of.as_ptr(), 7));
            assert_eq!(analytics["rolling_average"].as_f64(), Some(1500.0));
            assert_eq!(analytics["days_logged"], 2);
        }
    }

    #[test]
    fn test_ffi_metric_analytics_rejects_invalid_entry() {
        let entries = CString::new(
            r#"{"user_id": "u", "date": "2024-01-01", "metric": "mood", "score": 9}"#,
        )
        .unwrap();
        let metric = CString::new("mood").unwrap();
        let as_of = CString::new("2024-01-07").unwrap();
        unsafe {
            let result = wellplan_metric_analytics(entries.as_ptr(), metric.as_ptr(), as_of.as_ptr(), 7);
            assert!(result.is_null());
            let message = CStr::from_ptr(wellplan_last_error()).to_str().unwrap();
            assert!(message.starts_with("INVALID_ENTRY"), "{}", message);
        }
    }

    #[test]
    fn test_ffi_engine_lifecycle() {
        let config = CString::new(r#"{"analytics": {"default_window_days": 14}}"#).unwrap();
        let profile = profile_cstring();
        unsafe {
            let engine = wellplan_engine_new(config.as_ptr());
            assert!(!engine.is_null());

            let targets = take(wellplan_engine_compute_targets(engine, profile.as_ptr()));
            assert!(targets["daily_calories"].as_f64().unwrap() > 1200.0);

            let bundle = take(wellplan_engine_generate_plans(
                engine,
                profile.as_ptr(),
                ptr::null(),
                ptr::null(),
                -1,
            ));
            assert!(bundle["warnings"].as_array().unwrap().is_empty());

            wellplan_engine_free(engine);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let bad = CString::new("not json").unwrap();
        unsafe {
            let result = wellplan_compute_targets(bad.as_ptr());
            assert!(result.is_null());

            let error = wellplan_last_error();
            assert!(!error.is_null());
            let message = CStr::from_ptr(error).to_str().unwrap();
            assert!(message.starts_with("INVALID_PROFILE"), "{}", message);

            let config = CString::new(r#"{"targets": {"calorie_floor_kcal": 5000}}"#).unwrap();
            let engine = wellplan_engine_new(config.as_ptr());
            assert!(engine.is_null());
            assert!(!wellplan_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = wellplan_version();
            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, env!("CARGO_PKG_VERSION"));
        }
    }
}
