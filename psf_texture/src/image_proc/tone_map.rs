//! Tone mapping of linear PSF flux into 8-bit display values.
//!
//! A PSF is dominated by its bright core, so the raw flux is first weighted by
//! the squared distance from the image center. That suppresses the core and
//! lifts the faint diffraction structure. Each channel is then normalized by
//! its own maximum and compressed with a logarithmic curve:
//!
//! ```text
//! f(v) = ln(1 + v * (b - 1)) / ln(b)
//! ```
//!
//! which maps `[0, 1]` onto `[0, 1]` with `f(0) = 0` and `f(1) = 1`.
//! Normalizing per channel means the red, green and blue bands each span the
//! full output range regardless of their relative flux.

use log::warn;
use ndarray::Array2;
use thiserror::Error;

/// Default logarithm base for the compression curve
pub const DEFAULT_LOG_BASE: f64 = 1000.0;

/// Errors that can occur while building a tone mapper.
#[derive(Error, Debug, PartialEq)]
pub enum ToneMapError {
    #[error("Logarithm base must be finite and greater than 1, got {0}")]
    InvalidBase(f64),
}

/// Squared distance of every pixel from the image center.
///
/// The center is `(height / 2, width / 2)` using integer division, the same
/// convention as [`crate::image_proc::crop_center`].
pub fn distance_squared_field(shape: (usize, usize)) -> Array2<f64> {
    let (height, width) = shape;
    let center_row = (height / 2) as f64;
    let center_col = (width / 2) as f64;

    Array2::from_shape_fn(shape, |(row, col)| {
        let dx = col as f64 - center_col;
        let dy = row as f64 - center_row;
        dx * dx + dy * dy
    })
}

/// Divides a channel by its own maximum.
///
/// Returns the normalized channel and the maximum used. When the maximum is
/// not strictly positive and finite the channel cannot be normalized and an
/// all-zero array is returned instead.
pub fn normalize_by_max(channel: &Array2<f64>) -> (Array2<f64>, f64) {
    let max = channel.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if !(max.is_finite() && max > 0.0) {
        warn!("Channel maximum is {max}; normalizing to an all-zero channel");
        return (Array2::zeros(channel.dim()), max);
    }

    (channel.mapv(|v| v / max), max)
}

/// Logarithmic display curve with a fixed base.
#[derive(Debug, Clone, Copy)]
pub struct ToneMapper {
    base: f64,
    ln_base: f64,
}

/// A tone mapped channel along with the normalization maximum it used.
#[derive(Debug, Clone)]
pub struct MappedChannel {
    pub pixels: Array2<u8>,
    pub weighted_max: f64,
}

impl ToneMapper {
    /// Create a mapper for the given logarithm base (must be > 1).
    pub fn new(base: f64) -> Result<Self, ToneMapError> {
        if !(base.is_finite() && base > 1.0) {
            return Err(ToneMapError::InvalidBase(base));
        }
        Ok(Self {
            base,
            ln_base: base.ln(),
        })
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    /// Compresses a normalized value. Negative inputs clamp to zero.
    pub fn log_compress(&self, value: f64) -> f64 {
        let v = value.max(0.0);
        (1.0 + v * (self.base - 1.0)).ln() / self.ln_base
    }

    /// Converts a compressed value to 8 bits by scaling to 255 and truncating.
    ///
    /// Truncation (not rounding) is deliberate: only an exact 1.0 maps to 255.
    pub fn quantize(value: f64) -> u8 {
        // `as` saturates out-of-range values and maps NaN to 0
        (value * 255.0) as u8
    }

    /// Runs the full tone curve on one channel.
    ///
    /// Steps: weight by squared center distance, normalize by the weighted
    /// maximum, log-compress, quantize to `u8`.
    pub fn map_channel(&self, channel: &Array2<f64>) -> MappedChannel {
        let weighted = channel * &distance_squared_field(channel.dim());
        let (normalized, weighted_max) = normalize_by_max(&weighted);

        let pixels = normalized.mapv(|v| Self::quantize(self.log_compress(v)));
        MappedChannel {
            pixels,
            weighted_max,
        }
    }
}

impl Default for ToneMapper {
    fn default() -> Self {
        Self {
            base: DEFAULT_LOG_BASE,
            ln_base: DEFAULT_LOG_BASE.ln(),
        }
    }
}
