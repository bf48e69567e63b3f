//! Image dimensions and size utilities

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Image dimensions structure
///
/// Represents the width and height of a channel image or crop window.
/// Arrays built from an `ImageSize` are shaped `(height, width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    /// Image width in pixels (columns)
    pub width: usize,
    /// Image height in pixels (rows)
    pub height: usize,
}

impl ImageSize {
    /// Create a new ImageSize
    pub fn from_width_height(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Square size with equal width and height
    pub fn square(side: usize) -> Self {
        Self {
            width: side,
            height: side,
        }
    }

    /// Size of an array, reading its `(rows, cols)` shape
    pub fn of_array<T>(array: &Array2<T>) -> Self {
        let (height, width) = array.dim();
        Self { width, height }
    }

    /// Shape `(height, width)` for constructing arrays of this size
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Get total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// True when either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when this size fits inside `other` along both axes
    pub fn fits_within(&self, other: &ImageSize) -> bool {
        self.width <= other.width && self.height <= other.height
    }
}

impl From<(usize, usize)> for ImageSize {
    fn from(dimensions: (usize, usize)) -> Self {
        Self::from_width_height(dimensions.0, dimensions.1)
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
