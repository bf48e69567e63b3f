//! FITS reading for single-band PSF images
//!
//! Each band of the PSF is stored as a 2-D image in the primary HDU of its own
//! FITS file. Rows are returned in file order; no vertical flip is applied.

use fitsio::hdu::HduInfo;
use fitsio::images::ImageType;
use fitsio::FitsFile;
use log::{debug, info};
use ndarray::Array2;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::image_size::ImageSize;

/// Errors that can occur during FITS file operations
#[derive(Error, Debug)]
pub enum FitsError {
    #[error("FITS I/O error in {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: fitsio::errors::Error,
    },
    #[error("Primary HDU of {0} is not an image")]
    NotAnImage(PathBuf),
    #[error("Primary HDU of {0} contains no image data")]
    NoImageData(PathBuf),
    #[error("Primary image of {path} has unsupported shape {shape:?}; expected 2 axes")]
    UnsupportedShape { path: PathBuf, shape: Vec<usize> },
    #[error("Cannot reshape {len} samples from {path} into {size}")]
    Reshape {
        path: PathBuf,
        len: usize,
        size: ImageSize,
    },
}

/// A channel read from disk, with the sample type it was stored as.
#[derive(Debug, Clone)]
pub struct FitsChannel {
    pub data: Array2<f64>,
    pub stored_type: ImageType,
}

impl FitsChannel {
    pub fn size(&self) -> ImageSize {
        ImageSize::of_array(&self.data)
    }
}

/// Collapses leading unit axes, returning `(rows, cols)` for 2-D images.
fn image_rows_cols(shape: &[usize]) -> Option<(usize, usize)> {
    match shape {
        [] => None,
        [.., rows, cols] if shape[..shape.len() - 2].iter().all(|&n| n == 1) => {
            Some((*rows, *cols))
        }
        _ => None,
    }
}

/// Reads the primary image of a FITS file as `f64` samples.
///
/// The file is opened, read and closed within this call.
///
/// # Arguments
/// * `path` - Path to the FITS file
///
/// # Returns
/// * `Result<FitsChannel, FitsError>` - Image shaped `(NAXIS2, NAXIS1)`
pub fn read_primary_image<P: AsRef<Path>>(path: P) -> Result<FitsChannel, FitsError> {
    let path = path.as_ref();
    let io_err = |source: fitsio::errors::Error| FitsError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut fptr = FitsFile::open(path).map_err(io_err)?;
    let hdu = fptr.primary_hdu().map_err(io_err)?;

    let (shape, stored_type) = match &hdu.info {
        HduInfo::ImageInfo { shape, image_type } => (shape.clone(), image_type.clone()),
        _ => return Err(FitsError::NotAnImage(path.to_path_buf())),
    };

    if shape.is_empty() || shape.contains(&0) {
        return Err(FitsError::NoImageData(path.to_path_buf()));
    }

    let (rows, cols) = image_rows_cols(&shape).ok_or_else(|| FitsError::UnsupportedShape {
        path: path.to_path_buf(),
        shape: shape.clone(),
    })?;

    let samples: Vec<f64> = hdu.read_image(&mut fptr).map_err(io_err)?;
    let len = samples.len();
    let data = Array2::from_shape_vec((rows, cols), samples).map_err(|_| FitsError::Reshape {
        path: path.to_path_buf(),
        len,
        size: ImageSize::from_width_height(cols, rows),
    })?;

    info!(
        "Read FITS file {} ({}x{})",
        path.display(),
        data.ncols(),
        data.nrows()
    );
    debug!("{} stored as {:?}", path.display(), stored_type);

    Ok(FitsChannel { data, stored_type })
}
