//! Downsampling by summing non-overlapping square blocks.
//!
//! Summation (rather than averaging) keeps the total flux of the PSF intact,
//! so a reduced image still integrates to the same value as its source when
//! the block factor divides the image size.

use clap::ValueEnum;
use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::image_size::ImageSize;

/// How block reduction treats sizes the factor does not divide evenly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EdgePolicy {
    /// Drop incomplete trailing rows and columns; output is `floor(dim / factor)`
    #[default]
    Truncate,
    /// Keep partial edge blocks, summing only the pixels present; output is `ceil(dim / factor)`
    ZeroPad,
    /// Keep partial edge blocks, filling each missing pixel with the total of the
    /// whole input image; output is `ceil(dim / factor)`
    TotalFluxPad,
    /// Refuse sizes that are not exact multiples of the factor
    Exact,
}

impl std::fmt::Display for EdgePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgePolicy::Truncate => write!(f, "truncate"),
            EdgePolicy::ZeroPad => write!(f, "zero-pad"),
            EdgePolicy::TotalFluxPad => write!(f, "total-flux-pad"),
            EdgePolicy::Exact => write!(f, "exact"),
        }
    }
}

/// Errors that can occur during block reduction.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReduceError {
    #[error("Block reduction factor must be at least 1")]
    ZeroFactor,
    #[error("Image size {size} is not a multiple of block factor {factor}")]
    NotDivisible { size: ImageSize, factor: usize },
    #[error("Block factor {factor} leaves no complete block in a {size} image")]
    FactorTooLarge { size: ImageSize, factor: usize },
}

/// Size of the output of [`block_reduce`] for a given input size.
pub fn reduced_size(
    size: ImageSize,
    factor: usize,
    policy: EdgePolicy,
) -> Result<ImageSize, ReduceError> {
    if factor == 0 {
        return Err(ReduceError::ZeroFactor);
    }

    let reduced = match policy {
        EdgePolicy::Truncate => {
            ImageSize::from_width_height(size.width / factor, size.height / factor)
        }
        EdgePolicy::Exact => {
            if size.width % factor != 0 || size.height % factor != 0 {
                return Err(ReduceError::NotDivisible { size, factor });
            }
            ImageSize::from_width_height(size.width / factor, size.height / factor)
        }
        EdgePolicy::ZeroPad | EdgePolicy::TotalFluxPad => ImageSize::from_width_height(
            size.width.div_ceil(factor),
            size.height.div_ceil(factor),
        ),
    };

    if reduced.is_empty() && !size.is_empty() {
        return Err(ReduceError::FactorTooLarge { size, factor });
    }
    Ok(reduced)
}

/// Downsamples `image` by summing `factor x factor` blocks.
///
/// A factor of 1 returns an identical copy. Edge blocks that extend past the
/// image are handled according to `policy`.
///
/// # Examples
/// ```
/// use ndarray::Array2;
/// use psf_texture::image_proc::{block_reduce, EdgePolicy};
///
/// let ones = Array2::<f64>::ones((4, 4));
/// let reduced = block_reduce(&ones, 2, EdgePolicy::Truncate).unwrap();
/// assert_eq!(reduced, Array2::from_elem((2, 2), 4.0));
/// ```
pub fn block_reduce(
    image: &Array2<f64>,
    factor: usize,
    policy: EdgePolicy,
) -> Result<Array2<f64>, ReduceError> {
    let size = ImageSize::of_array(image);
    let reduced = reduced_size(size, factor, policy)?;

    if factor == 1 {
        return Ok(image.clone());
    }

    let fill = match policy {
        EdgePolicy::TotalFluxPad => image.sum(),
        _ => 0.0,
    };
    let block_area = factor * factor;

    let mut output = Array2::zeros(reduced.shape());
    for ((row, col), cell) in output.indexed_iter_mut() {
        let row_start = row * factor;
        let col_start = col * factor;
        let row_end = (row_start + factor).min(size.height);
        let col_end = (col_start + factor).min(size.width);

        let block = image.slice(s![row_start..row_end, col_start..col_end]);
        let missing = block_area - block.len();
        *cell = block.sum() + fill * missing as f64;
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_factor_one_is_identity() {
        let image = Array2::from_shape_fn((5, 3), |(r, c)| (r * 3 + c) as f64 * 0.5);
        for policy in [
            EdgePolicy::Truncate,
            EdgePolicy::ZeroPad,
            EdgePolicy::TotalFluxPad,
            EdgePolicy::Exact,
        ] {
            assert_eq!(block_reduce(&image, 1, policy).unwrap(), image);
        }
    }

    #[test]
    fn test_ones_reduce_to_block_area() {
        let ones = Array2::<f64>::ones((4, 4));
        let reduced = block_reduce(&ones, 2, EdgePolicy::Truncate).unwrap();
        assert_eq!(reduced, Array2::from_elem((2, 2), 4.0));
    }

    #[test]
    fn test_each_cell_is_block_sum() {
        let image = Array2::from_shape_fn((6, 6), |(r, c)| (r * 6 + c) as f64);
        let reduced = block_reduce(&image, 3, EdgePolicy::Exact).unwrap();

        assert_eq!(reduced.dim(), (2, 2));
        // Top-left block: rows 0..3, cols 0..3
        let expected: f64 = [0, 1, 2, 6, 7, 8, 12, 13, 14].iter().map(|&v| v as f64).sum();
        assert_relative_eq!(reduced[[0, 0]], expected);
        assert_relative_eq!(reduced.sum(), image.sum());
    }

    #[test]
    fn test_truncate_drops_partial_blocks() {
        let ones = Array2::<f64>::ones((5, 7));
        let reduced = block_reduce(&ones, 2, EdgePolicy::Truncate).unwrap();
        assert_eq!(reduced, Array2::from_elem((2, 3), 4.0));
    }

    #[test]
    fn test_zero_pad_keeps_partial_blocks() {
        let ones = Array2::<f64>::ones((5, 7));
        let reduced = block_reduce(&ones, 2, EdgePolicy::ZeroPad).unwrap();

        assert_eq!(reduced.dim(), (3, 4));
        assert_relative_eq!(reduced[[0, 0]], 4.0);
        assert_relative_eq!(reduced[[0, 3]], 2.0);
        assert_relative_eq!(reduced[[2, 0]], 2.0);
        assert_relative_eq!(reduced[[2, 3]], 1.0);
        assert_relative_eq!(reduced.sum(), 35.0);
    }

    #[test]
    fn test_total_flux_pad_fills_with_image_total() {
        let ones = Array2::<f64>::ones((3, 3));
        let reduced = block_reduce(&ones, 2, EdgePolicy::TotalFluxPad).unwrap();

        // Image total is 9; each missing pixel contributes 9
        assert_eq!(reduced.dim(), (2, 2));
        assert_relative_eq!(reduced[[0, 0]], 4.0);
        assert_relative_eq!(reduced[[0, 1]], 2.0 + 2.0 * 9.0);
        assert_relative_eq!(reduced[[1, 0]], 2.0 + 2.0 * 9.0);
        assert_relative_eq!(reduced[[1, 1]], 1.0 + 3.0 * 9.0);
    }

    #[test]
    fn test_exact_rejects_uneven_size() {
        let ones = Array2::<f64>::ones((4, 5));
        assert_eq!(
            block_reduce(&ones, 2, EdgePolicy::Exact).unwrap_err(),
            ReduceError::NotDivisible {
                size: ImageSize::from_width_height(5, 4),
                factor: 2,
            }
        );
    }

    #[test]
    fn test_zero_factor() {
        let ones = Array2::<f64>::ones((4, 4));
        assert_eq!(
            block_reduce(&ones, 0, EdgePolicy::Truncate).unwrap_err(),
            ReduceError::ZeroFactor
        );
    }

    #[test]
    fn test_factor_larger_than_image_truncates_to_nothing() {
        let ones = Array2::<f64>::ones((3, 3));
        assert!(matches!(
            block_reduce(&ones, 4, EdgePolicy::Truncate),
            Err(ReduceError::FactorTooLarge { factor: 4, .. })
        ));
        // Padding policies still produce a single block
        let padded = block_reduce(&ones, 4, EdgePolicy::ZeroPad).unwrap();
        assert_eq!(padded, Array2::from_elem((1, 1), 9.0));
    }

    #[test]
    fn test_reduced_size() {
        let size = ImageSize::square(4096);
        assert_eq!(
            reduced_size(size, 4, EdgePolicy::Truncate).unwrap(),
            ImageSize::square(1024)
        );
        assert_eq!(
            reduced_size(ImageSize::from_width_height(10, 9), 4, EdgePolicy::ZeroPad).unwrap(),
            ImageSize::from_width_height(3, 3)
        );
    }

    #[test]
    fn test_edge_policy_display_matches_cli_names() {
        for policy in EdgePolicy::value_variants() {
            let name = policy.to_string();
            assert_eq!(EdgePolicy::from_str(&name, false).unwrap(), *policy);
        }
    }
}
