//! Square grid fields shared by every pipeline stage
//!
//! All fields of one run have the same side length and the same row-major
//! index scheme `i = y * size + x`. A field is never resized after construction.

use super::color::Rgba;
use super::vec3::Vec3;
use crate::error::{TerrainError, TerrainResult};

/// Dense square field stored as a flat `Vec<T>` in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct GridField<T> {
    /// Field values in row-major order (y * size + x)
    data: Vec<T>,
    /// Side length in cells
    size: usize,
}

/// Scalar elevation per cell
pub type HeightField = GridField<f32>;
/// Unit surface normal per cell
pub type NormalField = GridField<Vec3>;
/// Shadow intensity per cell in `[0, 1]`
pub type ShadowField = GridField<f32>;
/// Highest illuminated ray height that passed over each cell
pub type LightRayField = GridField<f32>;
/// Final shaded color per cell
pub type ColorBuffer = GridField<Rgba>;

impl<T: Clone> GridField<T> {
    /// Create a field with every cell set to `value`
    ///
    /// # Arguments
    ///
    /// * `size` - Side length in cells
    /// * `value` - Initial value for all cells
    #[must_use]
    pub fn with_value(size: usize, value: T) -> Self {
        Self {
            data: vec![value; size * size],
            size,
        }
    }
}

impl<T: Clone + Default> GridField<T> {
    /// Create a field with every cell set to `T::default()`
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self::with_value(size, T::default())
    }
}

impl<T> GridField<T> {
    /// Wrap an existing row-major buffer
    ///
    /// Fails if `data` does not hold exactly `size * size` values.
    pub fn from_vec(size: usize, data: Vec<T>) -> TerrainResult<Self> {
        let expected = size * size;
        if data.len() != expected {
            return Err(TerrainError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, size })
    }

    /// Side length in cells
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-sized field
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major index of `(x, y)`
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    /// Get reference to field data
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get mutable reference to field data
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// One full row of the field
    ///
    /// # Panics
    ///
    /// Panics if `y` is out of bounds
    pub fn row(&self, y: usize) -> &[T] {
        assert!(y < self.size, "Row out of bounds");
        &self.data[y * self.size..(y + 1) * self.size]
    }

    /// Consume the field and return its buffer
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T: Copy> GridField<T> {
    /// Get value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> T {
        assert!(x < self.size && y < self.size, "Coordinates out of bounds");
        self.data[y * self.size + x]
    }

    /// Set value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        assert!(x < self.size && y < self.size, "Coordinates out of bounds");
        self.data[y * self.size + x] = value;
    }
}
