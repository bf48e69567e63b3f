//! Centered cropping of channel images.
//!
//! The crop window is placed using floor division on both the source and the
//! target size, so for a 4096x4096 source and a 2048x2048 target the window
//! starts at row 1024, column 1024. The first array axis is always treated as
//! Y (rows).

use ndarray::{s, Array2};
use thiserror::Error;

use crate::image_size::ImageSize;

/// Errors that can occur while cropping.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CropError {
    #[error("Crop target {0} has a zero dimension")]
    EmptyTarget(ImageSize),
    #[error("Crop target {target} does not fit inside source image {source_size}")]
    TargetTooLarge {
        target: ImageSize,
        source_size: ImageSize,
    },
}

/// Offset `(start_row, start_col)` of a centered `target` window inside `source`.
pub fn center_offset(source: ImageSize, target: ImageSize) -> Result<(usize, usize), CropError> {
    if target.is_empty() {
        return Err(CropError::EmptyTarget(target));
    }
    if !target.fits_within(&source) {
        return Err(CropError::TargetTooLarge {
            target,
            source_size: source,
        });
    }

    // With target <= source both subtractions are non-negative
    let start_x = source.width / 2 - target.width / 2;
    let start_y = source.height / 2 - target.height / 2;
    Ok((start_y, start_x))
}

/// Crops the centered `target` window out of `image`.
///
/// # Arguments
/// * `image` - Source channel, shaped `(rows, cols)`
/// * `target` - Window size to keep
///
/// # Returns
/// * An owned array shaped `(target.height, target.width)`
///
/// # Errors
/// * `CropError::EmptyTarget` - target has a zero dimension
/// * `CropError::TargetTooLarge` - target exceeds the source on either axis
pub fn crop_center(image: &Array2<f64>, target: ImageSize) -> Result<Array2<f64>, CropError> {
    let (start_y, start_x) = center_offset(ImageSize::of_array(image), target)?;
    Ok(image
        .slice(s![
            start_y..start_y + target.height,
            start_x..start_x + target.width
        ])
        .to_owned())
}
