use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use terrain_shade_core::TerrainError;

/// Common interface for FFI error types.
///
/// - `code()` - Returns the error code to be passed across the FFI boundary
/// - `msg()` - Returns the error message for diagnostic purposes
pub(crate) trait TerrainShadeError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> TerrainShadeErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `TerrainShadeError` for FFI error scenarios.
///
/// Wraps a `TerrainShadeErrorCode` with a message and provides a constructor
/// per failure kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultTerrainShadeError {
    code: TerrainShadeErrorCode,
    msg: String,
}

impl DefaultTerrainShadeError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`, `"config"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: TerrainShadeErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for a rejected generation configuration.
    pub fn invalid_config(message: String) -> Self {
        Self {
            code: TerrainShadeErrorCode::InvalidConfig,
            msg: message,
        }
    }

    /// Create error for a caller buffer that cannot hold the requested data.
    ///
    /// # Arguments
    /// * `buffer` - The name of the output buffer (e.g., `"out_colors"`)
    /// * `required` - Elements needed
    /// * `provided` - Elements the caller declared
    pub fn buffer_too_small(buffer: &str, required: usize, provided: usize) -> Self {
        Self {
            code: TerrainShadeErrorCode::BufferTooSmall,
            msg: format!("Buffer '{buffer}' holds {provided} elements, {required} required"),
        }
    }

    /// Create error for a query made before any terrain was generated.
    pub fn no_terrain() -> Self {
        Self {
            code: TerrainShadeErrorCode::NoTerrain,
            msg: "No terrain has been generated yet".to_string(),
        }
    }

    /// Create error for a light-ray query when tracing was disabled.
    pub fn light_rays_disabled() -> Self {
        Self {
            code: TerrainShadeErrorCode::LightRaysDisabled,
            msg: "Light-ray tracing was disabled for the current terrain".to_string(),
        }
    }
}

impl From<TerrainError> for DefaultTerrainShadeError {
    fn from(error: TerrainError) -> Self {
        let code = match error {
            TerrainError::InvalidConfig { .. } | TerrainError::ConfigParse(_) => {
                TerrainShadeErrorCode::InvalidConfig
            }
            TerrainError::SizeMismatch { .. } | TerrainError::Io(_) => {
                TerrainShadeErrorCode::InvalidParameter
            }
            TerrainError::Cancelled => TerrainShadeErrorCode::Cancelled,
            TerrainError::Superseded { .. } => TerrainShadeErrorCode::Superseded,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl TerrainShadeError for DefaultTerrainShadeError {
    fn code(&self) -> TerrainShadeErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by terrain shading functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainShadeErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Generation configuration rejected (size, octaves, angles, band count...).
    InvalidConfig = 2,

    /// Invalid parameter passed to function.
    InvalidParameter = 3,

    /// Output buffer shorter than the data to copy.
    BufferTooSmall = 4,

    /// No terrain has been generated on this instance yet.
    NoTerrain = 5,

    /// Light rays were requested but tracing was disabled.
    LightRaysDisabled = 6,

    /// Generation was cancelled by a newer request.
    Cancelled = 7,

    /// Generation finished after a newer request and was discarded.
    Superseded = 8,
}

impl From<DefaultTerrainShadeError> for TerrainShadeErrorCode {
    fn from(error: DefaultTerrainShadeError) -> Self {
        error.code
    }
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    /// The CString is stored so returned raw pointers stay valid.
    static LAST_ERROR: RefCell<(Option<CString>, TerrainShadeErrorCode)> = const { RefCell::new((None, TerrainShadeErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, TerrainShadeErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, TerrainShadeErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if the last call on this thread failed.
/// - `null` if the last call succeeded or the message cannot be converted to a C string.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```cpp
/// TerrainShadeErrorCode err = terrain_shade_generate(terrain, &config);
/// if (err != TerrainShadeErrorCode::Ok) {
///     const char* error = terrain_shade_get_last_error();
///     if (error) {
///         printf("Terrain generation failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn terrain_shade_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `TerrainShadeErrorCode::Ok` (0) if the last call on this thread
/// succeeded, otherwise the code of the failed call.
#[no_mangle]
pub extern "C" fn terrain_shade_get_last_error_code() -> TerrainShadeErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
