//! C-ABI FFI bindings for cross-language integration.
//!
//! This module provides a C-compatible API for using unoffice from other
//! languages such as C#, Python, and Node.js. Configuration is passed as a
//! JSON object string using the `ParseConfig` field names, or null for the
//! defaults.

use std::ffi::{c_char, CStr, CString};
use std::path::Path;
use std::ptr;
use std::slice;

use crate::{parse_office_with_config, ParseConfig};

/// Result structure returned by FFI functions.
#[repr(C)]
pub struct UnofficeResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The extracted text (null if failed). Must be freed with `unoffice_free_result`.
    pub data: *mut c_char,
    /// Error message (null if succeeded). Must be freed with `unoffice_free_result`.
    pub error: *mut c_char,
}

impl UnofficeResult {
    fn success(data: String) -> Self {
        Self {
            success: true,
            data: into_c_string(data),
            error: ptr::null_mut(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: ptr::null_mut(),
            error: into_c_string(message),
        }
    }
}

/// Interior NUL bytes cannot cross the C boundary; they are dropped.
fn into_c_string(text: String) -> *mut c_char {
    let text = if text.contains('\0') {
        text.replace('\0', "")
    } else {
        text
    };
    CString::new(text).unwrap_or_default().into_raw()
}

unsafe fn read_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, String> {
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| format!("Invalid UTF-8 {}", what))
}

unsafe fn read_config(config_json: *const c_char) -> Result<ParseConfig, String> {
    if config_json.is_null() {
        return Ok(ParseConfig::default());
    }
    let json = read_str(config_json, "config")?;
    ParseConfig::from_json(json).map_err(|e| e.to_string())
}

/// Extract the text of a document file.
///
/// # Safety
///
/// The `path` must be a valid null-terminated UTF-8 string.
/// The `config_json` must be null or a valid null-terminated UTF-8 string.
/// The returned result must be freed with `unoffice_free_result`.
#[no_mangle]
pub unsafe extern "C" fn unoffice_parse_file(
    path: *const c_char,
    config_json: *const c_char,
) -> UnofficeResult {
    if path.is_null() {
        return UnofficeResult::error("Path cannot be null".to_string());
    }

    let path_str = match read_str(path, "path") {
        Ok(s) => s,
        Err(e) => return UnofficeResult::error(e),
    };
    let config = match read_config(config_json) {
        Ok(c) => c,
        Err(e) => return UnofficeResult::error(e),
    };

    match parse_office_with_config(Path::new(path_str), &config) {
        Ok(text) => UnofficeResult::success(text),
        Err(e) => UnofficeResult::error(e.to_string()),
    }
}

/// Extract the text of a document held in memory.
///
/// # Safety
///
/// The `data` must point to `len` readable bytes.
/// The `config_json` must be null or a valid null-terminated UTF-8 string.
/// The returned result must be freed with `unoffice_free_result`.
#[no_mangle]
pub unsafe extern "C" fn unoffice_parse_bytes(
    data: *const u8,
    len: usize,
    config_json: *const c_char,
) -> UnofficeResult {
    if data.is_null() {
        return UnofficeResult::error("Data cannot be null".to_string());
    }

    let bytes = slice::from_raw_parts(data, len);
    let config = match read_config(config_json) {
        Ok(c) => c,
        Err(e) => return UnofficeResult::error(e),
    };

    match parse_office_with_config(bytes, &config) {
        Ok(text) => UnofficeResult::success(text),
        Err(e) => UnofficeResult::error(e.to_string()),
    }
}

/// Free a result returned by any unoffice function.
///
/// # Safety
///
/// The `result` must have been returned by an unoffice function.
/// This function should only be called once per result.
#[no_mangle]
pub unsafe extern "C" fn unoffice_free_result(result: UnofficeResult) {
    if !result.data.is_null() {
        drop(CString::from_raw(result.data));
    }
    if !result.error.is_null() {
        drop(CString::from_raw(result.error));
    }
}

/// Free a string allocated by unoffice.
///
/// # Safety
///
/// The `ptr` must have been allocated by unoffice.
/// This function should only be called once per pointer.
#[no_mangle]
pub unsafe extern "C" fn unoffice_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the version of the unoffice library.
///
/// The returned string is statically allocated and should not be freed.
#[no_mangle]
pub extern "C" fn unoffice_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
