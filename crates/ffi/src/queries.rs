//! FFI queries over the current terrain of an instance.
//!
//! Every copy function writes into a caller-owned buffer whose length is
//! given in elements. Buffers must hold at least `size * size` elements
//! (`size * size * 4` for colors); use `terrain_shade_get_size` to size them.
use terrain_shade_core::Rgba;

use crate::error::{DefaultTerrainShadeError, TerrainShadeErrorCode};
use crate::helpers::{copy_to_buffer, handle_ffi_result_error, instance_from_ptr};
use crate::instance::TerrainShadeInstance;

/// C-compatible statistics of the current terrain.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TerrainShadeStats {
    /// Grid side length in cells
    pub size: u32,
    /// Number of bands the grid was processed in
    pub band_count: u32,
    /// Lowest generated height
    pub min_height: f32,
    /// Highest generated height
    pub max_height: f32,
    /// Wall-clock generation time (milliseconds)
    pub total_ms: f64,
    /// Time spent in the slowest band (milliseconds)
    pub slowest_band_ms: f64,
    /// Cells below sea level
    pub water_cells: u64,
    /// Fully shadowed cells
    pub shadowed_cells: u64,
    /// Cells with partial shadow
    pub penumbra_cells: u64,
    /// Store generation that produced this terrain
    pub generation: u64,
}

/// Gets the side length of the current terrain.
///
/// # Returns
/// - `TerrainShadeErrorCode::Ok` with `out_size` set
/// - `TerrainShadeErrorCode::NoTerrain` if nothing has been generated yet
///
/// # Safety
/// - `instance` must be a valid pointer from `terrain_shade_new` or null.
/// - `out_size` must be a valid pointer to writable memory or null.
#[no_mangle]
pub unsafe extern "C" fn terrain_shade_get_size(
    instance: *const TerrainShadeInstance,
    out_size: *mut u32,
) -> TerrainShadeErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(instance)?;
        if out_size.is_null() {
            return Err(DefaultTerrainShadeError::null_pointer("out_size"));
        }
        let maps = instance.maps()?;
        // SAFETY: checked non-null above, caller guarantees it is writable.
        unsafe {
            *out_size = u32::try_from(maps.size()).unwrap_or(u32::MAX);
        }
        Ok(())
    })
}

/// Copies shaded colors as `f32` RGBA, four components per cell in row-major order.
///
/// `len` is the number of `f32` elements `out_colors` can hold.
///
/// # Safety
/// - `instance` must be a valid pointer from `terrain_shade_new` or null.
/// - `out_colors` must be null or point to at least `len` writable `f32`s.
#[no_mangle]
pub unsafe extern "C" fn terrain_shade_copy_colors(
    instance: *const TerrainShadeInstance,
    out_colors: *mut f32,
    len: usize,
) -> TerrainShadeErrorCode {
    handle_ffi_result_error(|| {
        let maps = instance_from_ptr(instance)?.maps()?;
        let components: &[f32] = bytemuck::cast_slice::<Rgba, f32>(maps.colors.as_slice());
        copy_to_buffer(components, out_colors, len, "out_colors")
    })
}

/// Copies shaded colors as 8-bit RGBA, four bytes per cell in row-major order.
///
/// Ready to upload as an `RGBA8` texture.
///
/// # Safety
/// - `instance` must be a valid pointer from `terrain_shade_new` or null.
/// - `out_pixels` must be null or point to at least `len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn terrain_shade_copy_colors_rgba8(
    instance: *const TerrainShadeInstance,
    out_pixels: *mut u8,
    len: usize,
) -> TerrainShadeErrorCode {
    handle_ffi_result_error(|| {
        let maps = instance_from_ptr(instance)?.maps()?;
        let pixels: Vec<u8> = maps
            .colors
            .as_slice()
            .iter()
            .flat_map(|c| c.to_rgba8())
            .collect();
        copy_to_buffer(&pixels, out_pixels, len, "out_pixels")
    })
}

/// Copies the heightfield, one `f32` per cell in row-major order.
///
/// # Safety
/// - `instance` must be a valid pointer from `terrain_shade_new` or null.
/// - `out_heights` must be null or point to at least `len` writable `f32`s.
#[no_mangle]
pub unsafe extern "C" fn terrain_shade_copy_heights(
    instance: *const TerrainShadeInstance,
    out_heights: *mut f32,
    len: usize,
) -> TerrainShadeErrorCode {
    handle_ffi_result_error(|| {
        let maps = instance_from_ptr(instance)?.maps()?;
        copy_to_buffer(maps.heights.as_slice(), out_heights, len, "out_heights")
    })
}

/// Copies shadow intensities (0 = lit, 1 = fully shadowed).
///
/// # Safety
/// - `instance` must be a valid pointer from `terrain_shade_new` or null.
/// - `out_shadows` must be null or point to at least `len` writable `f32`s.
#[no_mangle]
pub unsafe extern "C" fn terrain_shade_copy_shadows(
    instance: *const TerrainShadeInstance,
    out_shadows: *mut f32,
    len: usize,
) -> TerrainShadeErrorCode {
    handle_ffi_result_error(|| {
        let maps = instance_from_ptr(instance)?.maps()?;
        copy_to_buffer(maps.shadows.as_slice(), out_shadows, len, "out_shadows")
    })
}

/// Copies the light-ray field (height of the sun ray above each cell).
///
/// # Returns
/// `TerrainShadeErrorCode::LightRaysDisabled` if the terrain was generated
/// with `trace_light_rays = false`.
///
/// # Safety
/// - `instance` must be a valid pointer from `terrain_shade_new` or null.
/// - `out_light_rays` must be null or point to at least `len` writable `f32`s.
#[no_mangle]
pub unsafe extern "C" fn terrain_shade_copy_light_rays(
    instance: *const TerrainShadeInstance,
    out_light_rays: *mut f32,
    len: usize,
) -> TerrainShadeErrorCode {
    handle_ffi_result_error(|| {
        let maps = instance_from_ptr(instance)?.maps()?;
        let light_rays = maps
            .light_rays
            .as_ref()
            .ok_or_else(DefaultTerrainShadeError::light_rays_disabled)?;
        copy_to_buffer(light_rays.as_slice(), out_light_rays, len, "out_light_rays")
    })
}

/// Gets statistics of the current terrain.
///
/// # Safety
/// - `instance` must be a valid pointer from `terrain_shade_new` or null.
/// - `out_stats` must be a valid pointer to writable memory or null.
#[no_mangle]
pub unsafe extern "C" fn terrain_shade_get_stats(
    instance: *const TerrainShadeInstance,
    out_stats: *mut TerrainShadeStats,
) -> TerrainShadeErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(instance)?;
        if out_stats.is_null() {
            return Err(DefaultTerrainShadeError::null_pointer("out_stats"));
        }
        let maps = instance.maps()?;
        let stats = &maps.stats;
        let result = TerrainShadeStats {
            size: u32::try_from(stats.size).unwrap_or(u32::MAX),
            band_count: u32::try_from(stats.bands.len()).unwrap_or(u32::MAX),
            min_height: stats.height_range.min,
            max_height: stats.height_range.max,
            total_ms: stats.total_ms,
            slowest_band_ms: stats.slowest_band().map_or(0.0, |b| b.total_ms()),
            water_cells: stats.water_cells as u64,
            shadowed_cells: stats.shadowed_cells as u64,
            penumbra_cells: stats.penumbra_cells as u64,
            generation: instance.store.generation(),
        };
        // SAFETY: checked non-null above, caller guarantees it is writable.
        unsafe {
            *out_stats = result;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use super::*;
    use crate::config::{terrain_shade_default_config, TerrainShadeConfig};
    use crate::error::terrain_shade_get_last_error_code;
    use crate::instance::{terrain_shade_destroy, terrain_shade_generate, terrain_shade_new};

    const SIZE: usize = 8;

    fn new_instance(trace_light_rays: bool) -> *mut TerrainShadeInstance {
        let config = TerrainShadeConfig {
            map_size: SIZE as u32,
            octaves: 4,
            bands: 3,
            trace_light_rays,
            ..terrain_shade_default_config()
        };
        let mut instance = ptr::null_mut();
        let code = unsafe { terrain_shade_new(&config, &mut instance) };
        assert_eq!(code, TerrainShadeErrorCode::Ok);
        instance
    }

    #[test]
    fn test_queries_before_generation() {
        let instance = new_instance(true);
        let mut size = 0;
        let code = unsafe { terrain_shade_get_size(instance, &mut size) };
        assert_eq!(code, TerrainShadeErrorCode::NoTerrain);

        let mut heights = vec![0.0_f32; SIZE * SIZE];
        let code = unsafe { terrain_shade_copy_heights(instance, heights.as_mut_ptr(), heights.len()) };
        assert_eq!(code, TerrainShadeErrorCode::NoTerrain);
        assert_eq!(terrain_shade_get_last_error_code(), TerrainShadeErrorCode::NoTerrain);

        unsafe { terrain_shade_destroy(instance) };
    }

    #[test]
    fn test_copy_fields() {
        let instance = new_instance(true);
        assert_eq!(unsafe { terrain_shade_generate(instance, ptr::null()) }, TerrainShadeErrorCode::Ok);

        let mut size = 0;
        assert_eq!(unsafe { terrain_shade_get_size(instance, &mut size) }, TerrainShadeErrorCode::Ok);
        assert_eq!(size as usize, SIZE);

        let maps = unsafe { &*instance }.maps().unwrap();

        let mut heights = vec![0.0_f32; SIZE * SIZE];
        let code = unsafe { terrain_shade_copy_heights(instance, heights.as_mut_ptr(), heights.len()) };
        assert_eq!(code, TerrainShadeErrorCode::Ok);
        assert_eq!(heights, maps.heights.as_slice());

        let mut shadows = vec![-1.0_f32; SIZE * SIZE];
        let code = unsafe { terrain_shade_copy_shadows(instance, shadows.as_mut_ptr(), shadows.len()) };
        assert_eq!(code, TerrainShadeErrorCode::Ok);
        assert!(shadows.iter().all(|s| (0.0..=1.0).contains(s)));

        let mut rays = vec![0.0_f32; SIZE * SIZE];
        let code = unsafe { terrain_shade_copy_light_rays(instance, rays.as_mut_ptr(), rays.len()) };
        assert_eq!(code, TerrainShadeErrorCode::Ok);

        let mut colors = vec![0.0_f32; SIZE * SIZE * 4];
        let code = unsafe { terrain_shade_copy_colors(instance, colors.as_mut_ptr(), colors.len()) };
        assert_eq!(code, TerrainShadeErrorCode::Ok);
        let first = maps.colors.get(0, 0);
        assert_eq!(&colors[..4], &[first.r, first.g, first.b, first.a]);

        let mut pixels = vec![0_u8; SIZE * SIZE * 4];
        let code = unsafe { terrain_shade_copy_colors_rgba8(instance, pixels.as_mut_ptr(), pixels.len()) };
        assert_eq!(code, TerrainShadeErrorCode::Ok);
        assert_eq!(&pixels[..4], &first.to_rgba8());
        assert!(pixels.chunks(4).all(|p| p[3] == 255));

        unsafe { terrain_shade_destroy(instance) };
    }

    #[test]
    fn test_buffer_too_small_leaves_buffer_untouched() {
        let instance = new_instance(true);
        unsafe { terrain_shade_generate(instance, ptr::null()) };

        let mut colors = vec![7.0_f32; SIZE * SIZE];
        let code = unsafe { terrain_shade_copy_colors(instance, colors.as_mut_ptr(), colors.len()) };
        assert_eq!(code, TerrainShadeErrorCode::BufferTooSmall);
        assert!(colors.iter().all(|&c| c == 7.0));

        let code = unsafe { terrain_shade_copy_heights(instance, ptr::null_mut(), 0) };
        assert_eq!(code, TerrainShadeErrorCode::NullPointer);

        unsafe { terrain_shade_destroy(instance) };
    }

    #[test]
    fn test_light_rays_disabled() {
        let instance = new_instance(false);
        unsafe { terrain_shade_generate(instance, ptr::null()) };

        let mut rays = vec![0.0_f32; SIZE * SIZE];
        let code = unsafe { terrain_shade_copy_light_rays(instance, rays.as_mut_ptr(), rays.len()) };
        assert_eq!(code, TerrainShadeErrorCode::LightRaysDisabled);

        unsafe { terrain_shade_destroy(instance) };
    }

    #[test]
    fn test_stats() {
        let instance = new_instance(true);
        unsafe { terrain_shade_generate(instance, ptr::null()) };

        let mut stats = TerrainShadeStats::default();
        let code = unsafe { terrain_shade_get_stats(instance, &mut stats) };
        assert_eq!(code, TerrainShadeErrorCode::Ok);
        assert_eq!(stats.size as usize, SIZE);
        assert_eq!(stats.band_count, 3);
        assert!(stats.min_height <= stats.max_height);
        assert!(stats.generation >= 1);
        assert!(stats.water_cells <= (SIZE * SIZE) as u64);

        let code = unsafe { terrain_shade_get_stats(instance, ptr::null_mut()) };
        assert_eq!(code, TerrainShadeErrorCode::NullPointer);

        unsafe { terrain_shade_destroy(instance) };
    }
}
