use std::ptr;
use std::sync::{Arc, Mutex, PoisonError};

use terrain_shade_core::{GenerationConfig, TerrainMaps, TerrainStore};

use crate::config::TerrainShadeConfig;
use crate::error::{DefaultTerrainShadeError, TerrainShadeErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, track_error, track_result};

/// A terrain generator and the most recently generated maps.
///
/// # Thread Safety
/// `TerrainShadeInstance` can be shared across threads. Generation may run on a
/// worker thread while other threads copy out the previous result:
/// - Each `terrain_shade_generate` call allocates fresh buffers and cancels any
///   generation still in flight on the same instance.
/// - Queries always see a complete terrain, never a partially written one.
///
/// ```cpp
/// TerrainShadeConfig config = terrain_shade_default_config();
/// config.map_size = 1024;
///
/// TerrainShadeInstance* terrain = nullptr;
/// if (terrain_shade_new(&config, &terrain) != TerrainShadeErrorCode::Ok) {
///     fprintf(stderr, "%s\n", terrain_shade_get_last_error());
///     return;
/// }
/// terrain_shade_generate(terrain, nullptr);
///
/// std::vector<float> colors(1024 * 1024 * 4);
/// terrain_shade_copy_colors(terrain, colors.data(), colors.size());
///
/// terrain_shade_destroy(terrain);
/// ```
pub struct TerrainShadeInstance {
    pub(crate) store: TerrainStore,
    /// Configuration used when `terrain_shade_generate` is called without one.
    pub(crate) config: Mutex<GenerationConfig>,
}

impl TerrainShadeInstance {
    /// Creates a new instance after validating `config`.
    ///
    /// No terrain is generated until `generate` is called.
    pub(crate) fn new(config: &TerrainShadeConfig) -> Result<Box<Self>, DefaultTerrainShadeError> {
        let config = GenerationConfig::from(config);
        config.validate()?;
        Ok(Box::new(Self {
            store: TerrainStore::new(),
            config: Mutex::new(config),
        }))
    }

    /// Generate with `config`, or with the stored configuration when `None`.
    ///
    /// A supplied configuration becomes the stored one once it validates.
    pub(crate) fn generate(
        &self,
        config: Option<&TerrainShadeConfig>,
    ) -> Result<Arc<TerrainMaps>, DefaultTerrainShadeError> {
        let config = {
            let mut stored = self.config.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(config) = config {
                let config = GenerationConfig::from(config);
                config.validate()?;
                *stored = config;
            }
            stored.clone()
        };
        Ok(self.store.regenerate(&config)?)
    }

    /// Latest generated maps.
    pub(crate) fn maps(&self) -> Result<Arc<TerrainMaps>, DefaultTerrainShadeError> {
        self.store
            .current()
            .ok_or_else(DefaultTerrainShadeError::no_terrain)
    }
}

/// Create a new terrain instance and return it via out-parameter.
///
/// Returns
/// - `TerrainShadeErrorCode::Ok` (0): success, `out_instance` contains a valid pointer
/// - `TerrainShadeErrorCode::NullPointer`: `config` or `out_instance` is null
/// - `TerrainShadeErrorCode::InvalidConfig`: the configuration was rejected
///
/// On failure `out_instance` is set to null and `terrain_shade_get_last_error()`
/// describes the problem.
///
/// # Safety
///
/// - `config` must be null or point to a valid `TerrainShadeConfig`.
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller takes ownership of the returned instance and MUST call
///   `terrain_shade_destroy` exactly once.
#[no_mangle]
pub unsafe extern "C" fn terrain_shade_new(
    config: *const TerrainShadeConfig,
    out_instance: *mut *mut TerrainShadeInstance,
) -> TerrainShadeErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultTerrainShadeError::null_pointer("out_instance"));
    }

    // SAFETY: caller guarantees `config` is null or valid.
    let result = match unsafe { config.as_ref() } {
        Some(config) => TerrainShadeInstance::new(config),
        None => Err(DefaultTerrainShadeError::null_pointer("config")),
    };

    match track_result(result) {
        Ok(instance) => {
            unsafe {
                *out_instance = Box::into_raw(instance);
            }
            TerrainShadeErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                *out_instance = ptr::null_mut();
            }
            code
        }
    }
}

/// Destroys an instance previously created by `terrain_shade_new`.
///
/// If `ptr` is null, this function is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `terrain_shade_new`.
/// - The pointer MUST NOT have been destroyed already, and no other thread may
///   still be using it.
#[no_mangle]
pub unsafe extern "C" fn terrain_shade_destroy(ptr: *mut TerrainShadeInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: The pointer was created by `Box::into_raw` in `terrain_shade_new`
    // and, per the contract above, has not been freed.
    unsafe {
        drop(Box::from_raw(ptr));
    }
}

/// Generate terrain and make it the instance's current result.
///
/// Blocks until generation completes. Pass a null `config` to regenerate with
/// the configuration given at creation (or by the last successful call).
///
/// Returns
/// - `TerrainShadeErrorCode::Ok` (0) on success
/// - `TerrainShadeErrorCode::NullPointer` if `instance` is null
/// - `TerrainShadeErrorCode::InvalidConfig` if `config` was rejected
/// - `TerrainShadeErrorCode::Cancelled` / `Superseded` if a concurrent call on
///   the same instance requested newer terrain first; the current terrain is
///   then whatever that newer call produces
///
/// # Safety
/// - `instance` must be a valid pointer returned by `terrain_shade_new` or null.
/// - `config` must be null or point to a valid `TerrainShadeConfig`.
#[no_mangle]
pub unsafe extern "C" fn terrain_shade_generate(
    instance: *const TerrainShadeInstance,
    config: *const TerrainShadeConfig,
) -> TerrainShadeErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(instance)?;
        // SAFETY: caller guarantees `config` is null or valid.
        let config = unsafe { config.as_ref() };
        instance.generate(config)?;
        Ok(())
    })
}
