//! # Certification Tracker
//!
//! An embeddable store for certification study goals. Each record holds a
//! name, an issuing provider, an optional target date, a progress status and
//! an optional study-hour goal. Two properties are derived on every read:
//! whether the certification is overdue and how many days remain.
//!
//! ## Features
//!
//! - **Explicit commit pipeline**: `trim → validate → normalize → persist`, with every
//!   failing field reported in one response
//! - **Authoritative uniqueness**: certification names are claimed in an LMDB
//!   index inside the same write transaction as the record
//! - **Substitutable clock**: date rules and derived properties take a
//!   [`Clock`], so "today" can be pinned in tests
//! - **FFI-ready**: every C-ABI call returns an [`AppResponse`] as JSON
//!
//! ## Quick Start
//!
//! ```no_run
//! use certification_tracker::{commit, CertDbState, CertificationCandidate, StoreConfig, SystemClock};
//!
//! let store = CertDbState::open(&StoreConfig::new("my_certifications")).unwrap();
//! let candidate = CertificationCandidate {
//!     name: Some("AWS Certified AI Practitioner".to_string()),
//!     provider: Some("aws".to_string()),
//!     ..Default::default()
//! };
//!
//! let record = commit::create_certification(&store, &SystemClock, candidate).unwrap();
//! assert_eq!(record.provider, "Aws");
//! ```
//!
//! ## FFI Functions
//!
//! - [`create_store`] - Open or create a certification store
//! - [`create_certification`] - Validate and commit a new certification
//! - [`get_certification_by_id`] - Read one certification with derived properties
//! - [`get_all_certifications`] - Read every certification
//! - [`update_certification`] - Validate and commit a partial update
//! - [`delete_certification`] - Remove a certification
//! - [`count_certifications`] - Number of committed certifications
//! - [`clear_all_certifications`] - Remove every certification
//! - [`health_check`] - Liveness report
//! - [`close_store`] - Release the store handle
//! - [`free_response`] - Release a response string

pub mod app_response;
pub mod cert_db_state;
pub mod certification;
pub mod clock;
pub mod commit;
pub mod config;
pub mod error;
pub mod health;
pub mod validation;

pub use crate::app_response::AppResponse;
pub use crate::cert_db_state::CertDbState;
pub use crate::certification::{
    days_until_target, is_overdue, CertificationCandidate, CertificationPatch, CertificationRecord,
    CertificationStatus, CertificationView,
};
pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::config::StoreConfig;
pub use crate::error::CertError;
pub use crate::validation::{Field, FieldError, ValidationErrors};

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};

/// Opens the certification store at `<name>.lmdb/`, creating it if needed.
///
/// # Returns
///
/// A pointer to the [`CertDbState`] on success, or a null pointer on failure.
/// Release it with [`close_store`].
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use certification_tracker::create_store;
///
/// let name = CString::new("certifications").unwrap();
/// let store = create_store(name.as_ptr());
/// assert!(!store.is_null());
/// ```
///
/// # Errors
///
/// Returns a null pointer if:
/// - The name pointer is null or not valid UTF-8
/// - The LMDB environment cannot be opened
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store(name: *const c_char) -> *mut CertDbState {
    if name.is_null() {
        warn!("Null name pointer passed to create_store");
        return std::ptr::null_mut();
    }

    let name_str = match unsafe { CStr::from_ptr(name).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in name parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    match CertDbState::open(&StoreConfig::new(name_str)) {
        Ok(store) => {
            info!("Certification store ready at {}", store.path().display());
            Box::into_raw(Box::new(store))
        }
        Err(e) => {
            warn!("Failed to open certification store: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Validates and commits a new certification.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_store`]
/// * `json_ptr` - Null-terminated JSON certification (format below)
///
/// # JSON Format
///
/// ```json
/// {
///   "name": "AWS Certified AI Practitioner",
///   "provider": "AWS",
///   "targetDate": "2026-12-31",
///   "status": "In Progress",
///   "studyHoursGoal": 50
/// }
/// ```
///
/// Only `name` and `provider` are required; `status` defaults to
/// `"Not Started"`.
///
/// # Returns
///
/// `Ok` with the committed record and its derived properties, or
/// `ValidationFailed` listing every rejected field. Nothing is stored on
/// failure. The returned string must be released with [`free_response`].
///
/// # Safety
///
/// Both parameters must be valid pointers. The JSON string must be valid UTF-8.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use certification_tracker::{create_certification, create_store, free_response};
///
/// let name = CString::new("certifications").unwrap();
/// let store = create_store(name.as_ptr());
///
/// let json = CString::new(r#"{"name":"Azure Fundamentals","provider":"azure"}"#).unwrap();
/// let response = create_certification(store, json.as_ptr());
/// free_response(response);
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_certification(state: *mut CertDbState, json_ptr: *const c_char) -> *const c_char {
    let store = match store_ref(state, "create_certification") {
        Ok(store) => store,
        Err(err) => return err,
    };

    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let candidate: CertificationCandidate = match serde_json::from_str(&json_str) {
        Ok(c) => c,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    let clock = SystemClock;
    match commit::create_certification(store, &clock, candidate) {
        Ok(record) => response_to_c_string(&AppResponse::json(&CertificationView::new(record, &clock))),
        Err(e) => {
            warn!("Rejected certification: {e}");
            response_to_c_string(&AppResponse::from(e))
        }
    }
}

/// Reads one certification by id, including `isOverdue` and
/// `daysUntilTarget` computed against the current day.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_certification_by_id(state: *mut CertDbState, id: *const c_char) -> *const c_char {
    let store = match store_ref(state, "get_certification_by_id") {
        Ok(store) => store,
        Err(err) => return err,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    let clock = SystemClock;
    match commit::get_certification(store, &id_str) {
        Ok(record) => response_to_c_string(&AppResponse::json(&CertificationView::new(record, &clock))),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Reads every certification as a JSON array of views.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_all_certifications(state: *mut CertDbState) -> *const c_char {
    let store = match store_ref(state, "get_all_certifications") {
        Ok(store) => store,
        Err(err) => return err,
    };

    let clock = SystemClock;
    match commit::list_certifications(store) {
        Ok(records) => {
            let views: Vec<CertificationView> = records
                .into_iter()
                .map(|record| CertificationView::new(record, &clock))
                .collect();
            response_to_c_string(&AppResponse::json(&views))
        }
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Applies a partial update to the certification with `id`.
///
/// Fields missing from the JSON keep their committed values. The update goes
/// through the same validation and normalization as a new certification and
/// refreshes `updatedAt`.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_store`]
/// * `id` - Id of the certification to update
/// * `json_ptr` - Null-terminated JSON with the fields to change
///
/// # Returns
///
/// `Ok` with the updated view, `NotFound` for an unknown id, or
/// `ValidationFailed`. The returned string must be released with
/// [`free_response`].
///
/// # Safety
///
/// All three parameters must be valid pointers. Both strings must be valid UTF-8.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use certification_tracker::{create_store, free_response, update_certification};
///
/// let name = CString::new("certifications").unwrap();
/// let store = create_store(name.as_ptr());
///
/// let id = CString::new("0b6f4c1e-5d1a-4f55-9a43-2a7c1c9d8e10").unwrap();
/// let patch = CString::new(r#"{"status":"Completed"}"#).unwrap();
/// let response = update_certification(store, id.as_ptr(), patch.as_ptr());
/// free_response(response);
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_certification(
    state: *mut CertDbState,
    id: *const c_char,
    json_ptr: *const c_char,
) -> *const c_char {
    let store = match store_ref(state, "update_certification") {
        Ok(store) => store,
        Err(err) => return err,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let patch: CertificationPatch = match serde_json::from_str(&json_str) {
        Ok(p) => p,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Error deserializing JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    let clock = SystemClock;
    match commit::update_certification(store, &clock, &id_str, patch) {
        Ok(record) => response_to_c_string(&AppResponse::json(&CertificationView::new(record, &clock))),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Deletes the certification with `id`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_certification(state: *mut CertDbState, id: *const c_char) -> *const c_char {
    let store = match store_ref(state, "delete_certification") {
        Ok(store) => store,
        Err(err) => return err,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    match commit::delete_certification(store, &id_str) {
        Ok(()) => response_to_c_string(&AppResponse::success("Certification deleted successfully")),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Number of committed certifications, as a decimal string in `Ok`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn count_certifications(state: *mut CertDbState) -> *const c_char {
    let store = match store_ref(state, "count_certifications") {
        Ok(store) => store,
        Err(err) => return err,
    };

    match commit::count_certifications(store) {
        Ok(count) => response_to_c_string(&AppResponse::success(count.to_string())),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Removes every certification. The store stays usable.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_all_certifications(state: *mut CertDbState) -> *const c_char {
    let store = match store_ref(state, "clear_all_certifications") {
        Ok(store) => store,
        Err(err) => return err,
    };

    match store.clear_all_records() {
        Ok(()) => response_to_c_string(&AppResponse::success("All certifications cleared successfully")),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Liveness report: `{"status":"ok","timestamp":"<ISO-8601>"}` inside `Ok`.
#[no_mangle]
pub extern "C" fn health_check() -> *const c_char {
    response_to_c_string(&AppResponse::json(&health::health_check(&SystemClock)))
}

/// Flushes and releases a handle returned by [`create_store`].
///
/// # Parameters
///
/// * `state` - Handle to close
///
/// # Returns
///
/// `Ok` once the environment is synced, `BadRequest` for a null handle.
///
/// # Safety
///
/// `state` must come from [`create_store`] and must not be used after this
/// call. Closing the same handle twice is undefined behavior.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use certification_tracker::{close_store, create_store, free_response};
///
/// let name = CString::new("certifications").unwrap();
/// let store = create_store(name.as_ptr());
/// free_response(close_store(store));
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_store(state: *mut CertDbState) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to close_store".to_string());
        return response_to_c_string(&error);
    }

    let store = unsafe { Box::from_raw(state) };
    match store.close() {
        Ok(()) => response_to_c_string(&AppResponse::success("Certification store closed successfully")),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Releases a string returned by any other function in this library.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr as *mut c_char) });
}

/// Serializes `response` into a C string owned by the caller.
///
/// Returns a null pointer if serialization or C string creation fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

fn store_ref<'a>(state: *mut CertDbState, caller: &str) -> Result<&'a CertDbState, *const c_char> {
    match unsafe { state.as_ref() } {
        Some(store) => Ok(store),
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {caller}"));
            Err(response_to_c_string(&error))
        }
    }
}

/// Converts a C string pointer to an owned `String`.
///
/// # Returns
///
/// * `Ok(String)` - If conversion was successful
/// * `Err(*const c_char)` - A `BadRequest` response for a null pointer or invalid UTF-8
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
