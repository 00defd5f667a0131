use crate::error::{
    with_last_error_mut, DefaultTerrainShadeError, TerrainShadeError, TerrainShadeErrorCode,
};
use crate::instance::TerrainShadeInstance;
use std::ffi::CString;
use std::slice;

/// Set the thread-local error message and code.
/// Accepts any type implementing `TerrainShadeError`.
pub(crate) fn set_last_error(error: &impl TerrainShadeError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl TerrainShadeError) -> TerrainShadeErrorCode {
    set_last_error(error);
    error.code()
}

/// Record the error of a failed result, or clear the last error on success.
pub(crate) fn track_result<T>(
    result: Result<T, DefaultTerrainShadeError>,
) -> Result<T, TerrainShadeErrorCode> {
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(error) => Err(track_error(&error)),
    }
}

/// Run `f` and translate its result into an error code, tracking failures.
pub(crate) fn handle_ffi_result_error<F>(f: F) -> TerrainShadeErrorCode
where
    F: FnOnce() -> Result<(), DefaultTerrainShadeError>,
{
    match track_result(f()) {
        Ok(()) => TerrainShadeErrorCode::Ok,
        Err(code) => code,
    }
}

/// Clear the thread-local error message and code.
/// Called on successful operations.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = TerrainShadeErrorCode::Ok;
    });
}

/// Borrow an instance from a raw pointer, rejecting null.
///
/// The pointer must come from `terrain_shade_new` and not have been destroyed.
pub(crate) fn instance_from_ptr<'a>(
    ptr: *const TerrainShadeInstance,
) -> Result<&'a TerrainShadeInstance, DefaultTerrainShadeError> {
    // SAFETY: non-null pointers are required by every caller's contract to
    // originate from `terrain_shade_new` and still be live.
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultTerrainShadeError::null_pointer("instance"))
}

/// Copy `src` into a caller-owned buffer of `len` elements.
///
/// The caller guarantees `out` points to at least `len` writable elements.
pub(crate) fn copy_to_buffer<T: Copy>(
    src: &[T],
    out: *mut T,
    len: usize,
    name: &str,
) -> Result<(), DefaultTerrainShadeError> {
    if out.is_null() {
        return Err(DefaultTerrainShadeError::null_pointer(name));
    }
    if len < src.len() {
        return Err(DefaultTerrainShadeError::buffer_too_small(name, src.len(), len));
    }
    // SAFETY: `out` is non-null and the caller guarantees `len >= src.len()`
    // writable elements.
    let dst = unsafe { slice::from_raw_parts_mut(out, src.len()) };
    dst.copy_from_slice(src);
    Ok(())
}
