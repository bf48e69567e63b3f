//! Image processing for PSF texture generation
//!
//! This module provides the array transforms applied to each band between
//! loading and encoding: centered cropping, block-sum downsampling and the
//! logarithmic tone curve used for 8-bit output.

pub mod block_reduce;
pub mod crop;
pub mod tone_map;

// Re-export key functionality for easier access
pub use block_reduce::{block_reduce, reduced_size, EdgePolicy, ReduceError};
pub use crop::{center_offset, crop_center, CropError};
pub use tone_map::{
    distance_squared_field, normalize_by_max, MappedChannel, ToneMapError, ToneMapper,
    DEFAULT_LOG_BASE,
};
