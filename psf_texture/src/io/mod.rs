//! Reading source bands and writing composed textures
//!
//! - [`fits`]: primary-image FITS reader for the three input bands
//! - [`openexr`]: linear 32-bit float RGB OpenEXR writer
//! - [`png`]: 8-bit RGB PNG writer

pub mod fits;
pub mod openexr;
pub mod png;

use ndarray::Array2;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::image_size::ImageSize;

pub use self::fits::{read_primary_image, FitsChannel, FitsError};
pub use self::openexr::{read_exr_rgb, write_exr_rgb, ExrPlanes};
pub use self::png::{compose_rgb, write_png_rgb};

/// Errors that can occur while composing or writing an output image
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Channel dimensions differ: red {red}, green {green}, blue {blue}")]
    DimensionMismatch {
        red: ImageSize,
        green: ImageSize,
        blue: ImageSize,
    },
    #[error("Cannot encode an empty {0} image")]
    Empty(ImageSize),
    #[error("OpenEXR error for {path}: {source}")]
    Exr {
        path: PathBuf,
        #[source]
        source: exr::error::Error,
    },
    #[error("Image encoding error for {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Checks that all three planes share one non-empty size and returns it.
pub fn matching_size<T>(
    red: &Array2<T>,
    green: &Array2<T>,
    blue: &Array2<T>,
) -> Result<ImageSize, EncodeError> {
    let sizes = [
        ImageSize::of_array(red),
        ImageSize::of_array(green),
        ImageSize::of_array(blue),
    ];
    if sizes[1] != sizes[0] || sizes[2] != sizes[0] {
        return Err(EncodeError::DimensionMismatch {
            red: sizes[0],
            green: sizes[1],
            blue: sizes[2],
        });
    }
    if sizes[0].is_empty() {
        return Err(EncodeError::Empty(sizes[0]));
    }
    Ok(sizes[0])
}

/// Creates the parent directory of an output path if it does not exist.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), EncodeError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(|source| EncodeError::Io {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
