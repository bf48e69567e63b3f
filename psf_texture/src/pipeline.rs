//! FITS-to-texture conversion pipeline
//!
//! Both conversions share the same front half:
//!
//! ```text
//! load R,G,B ─► check sizes ─► crop_center ─► block_reduce
//! ```
//!
//! after which [`run_exr`] writes the linear sums as 32-bit floats and
//! [`run_png`] tone maps each band to 8 bits before writing.

use log::{debug, info};
use ndarray::Array2;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::{Band, ConfigError, PipelineConfig};
use crate::image_proc::{
    block_reduce, crop_center, CropError, ReduceError, ToneMapError, ToneMapper,
};
use crate::image_size::ImageSize;
use crate::io::{read_primary_image, write_exr_rgb, write_png_rgb, EncodeError, FitsError};

/// Errors that abort a conversion
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to load {band} band: {source}")]
    Load {
        band: Band,
        #[source]
        source: FitsError,
    },
    #[error("The {band} band is {found} but the red band is {expected}")]
    ChannelMismatch {
        band: Band,
        expected: ImageSize,
        found: ImageSize,
    },
    #[error("Failed to crop {band} band: {source}")]
    Crop {
        band: Band,
        #[source]
        source: CropError,
    },
    #[error("Failed to downsample {band} band: {source}")]
    Reduce {
        band: Band,
        #[source]
        source: ReduceError,
    },
    #[error(transparent)]
    ToneMap(#[from] ToneMapError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// The red, green and blue bands of one conversion.
///
/// Once built through [`ChannelTriple::new`] all three bands share one size.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTriple {
    red: Array2<f64>,
    green: Array2<f64>,
    blue: Array2<f64>,
}

impl ChannelTriple {
    /// Groups three bands, failing if their sizes differ.
    pub fn new(
        red: Array2<f64>,
        green: Array2<f64>,
        blue: Array2<f64>,
    ) -> Result<Self, PipelineError> {
        let expected = ImageSize::of_array(&red);
        for (band, channel) in [(Band::Green, &green), (Band::Blue, &blue)] {
            let found = ImageSize::of_array(channel);
            if found != expected {
                return Err(PipelineError::ChannelMismatch {
                    band,
                    expected,
                    found,
                });
            }
        }
        Ok(Self { red, green, blue })
    }

    /// Reads all three bands named in `config`, one file at a time.
    pub fn load(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let read = |band: Band| {
            let path = config.band_path(band);
            read_primary_image(path)
                .map(|channel| channel.data)
                .map_err(|source| PipelineError::Load { band, source })
        };
        let red = read(Band::Red)?;
        let green = read(Band::Green)?;
        let blue = read(Band::Blue)?;
        Self::new(red, green, blue)
    }

    pub fn band(&self, band: Band) -> &Array2<f64> {
        match band {
            Band::Red => &self.red,
            Band::Green => &self.green,
            Band::Blue => &self.blue,
        }
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::of_array(&self.red)
    }

    pub fn into_bands(self) -> [Array2<f64>; 3] {
        [self.red, self.green, self.blue]
    }

    /// Applies a fallible transform to each band, producing a new triple.
    fn try_map<F>(&self, mut transform: F) -> Result<Self, PipelineError>
    where
        F: FnMut(Band, &Array2<f64>) -> Result<Array2<f64>, PipelineError>,
    {
        let red = transform(Band::Red, &self.red)?;
        let green = transform(Band::Green, &self.green)?;
        let blue = transform(Band::Blue, &self.blue)?;
        Self::new(red, green, blue)
    }
}

/// Summary of a finished conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub output: PathBuf,
    pub size: ImageSize,
    /// Per-band maxima of the distance-weighted flux, for tone mapped output
    pub weighted_max: Option<[f64; 3]>,
}

/// Crops every band to the configured window and block-reduces it.
pub fn prepare(
    channels: &ChannelTriple,
    config: &PipelineConfig,
) -> Result<ChannelTriple, PipelineError> {
    let cropped = channels.try_map(|band, channel| {
        crop_center(channel, config.crop).map_err(|source| PipelineError::Crop { band, source })
    })?;
    debug!("Cropped {} bands to {}", channels.size(), cropped.size());

    if config.downscale == 1 {
        return Ok(cropped);
    }

    let reduced = cropped.try_map(|band, channel| {
        block_reduce(channel, config.downscale, config.edge_policy)
            .map_err(|source| PipelineError::Reduce { band, source })
    })?;
    info!(
        "Block reduced {} -> {} (factor {}, edge policy {})",
        cropped.size(),
        reduced.size(),
        config.downscale,
        config.edge_policy
    );
    Ok(reduced)
}

/// Tone maps every band to 8 bits.
///
/// Returns the planes in red, green, blue order and the weighted maximum each
/// band was normalized by.
pub fn tone_map(channels: &ChannelTriple, mapper: &ToneMapper) -> ([Array2<u8>; 3], [f64; 3]) {
    let [red, green, blue] = Band::ALL.map(|band| mapper.map_channel(channels.band(band)));
    let maxima = [red.weighted_max, green.weighted_max, blue.weighted_max];
    info!(
        "Weighted max values: {:e} {:e} {:e}",
        maxima[0], maxima[1], maxima[2]
    );
    ([red.pixels, green.pixels, blue.pixels], maxima)
}

/// Converts the bands of `config` into a linear float EXR texture.
pub fn run_exr(config: &PipelineConfig) -> Result<ConversionReport, PipelineError> {
    config.validate()?;
    let channels = ChannelTriple::load(config)?;
    let [red, green, blue] = prepare(&channels, config)?
        .into_bands()
        .map(|band| band.mapv(|v| v as f32));

    let size = write_exr_rgb(&config.output, &red, &green, &blue)?;
    Ok(ConversionReport {
        output: config.output.clone(),
        size,
        weighted_max: None,
    })
}

/// Converts the bands of `config` into a tone mapped 8-bit PNG texture.
pub fn run_png(config: &PipelineConfig) -> Result<ConversionReport, PipelineError> {
    config.validate()?;
    let mapper = ToneMapper::new(config.log_base)?;
    let channels = ChannelTriple::load(config)?;
    let prepared = prepare(&channels, config)?;

    let ([red, green, blue], maxima) = tone_map(&prepared, &mapper);
    let size = write_png_rgb(&config.output, &red, &green, &blue)?;
    Ok(ConversionReport {
        output: config.output.clone(),
        size,
        weighted_max: Some(maxima),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_proc::EdgePolicy;

    fn config_with(crop: ImageSize, downscale: usize) -> PipelineConfig {
        PipelineConfig {
            crop,
            downscale,
            ..PipelineConfig::exr_preset()
        }
    }

    fn triple(shape: (usize, usize)) -> ChannelTriple {
        ChannelTriple::new(
            Array2::from_elem(shape, 1.0),
            Array2::from_elem(shape, 2.0),
            Array2::from_elem(shape, 3.0),
        )
        .unwrap()
    }

    #[test]
    fn test_mismatched_bands_rejected() {
        let err = ChannelTriple::new(
            Array2::zeros((4, 4)),
            Array2::zeros((4, 4)),
            Array2::zeros((4, 5)),
        )
        .unwrap_err();
        match err {
            PipelineError::ChannelMismatch {
                band,
                expected,
                found,
            } => {
                assert_eq!(band, Band::Blue);
                assert_eq!(expected, ImageSize::square(4));
                assert_eq!(found, ImageSize::from_width_height(5, 4));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_prepare_crops_then_reduces() {
        let channels = triple((12, 12));
        let prepared = prepare(&channels, &config_with(ImageSize::square(8), 4)).unwrap();

        assert_eq!(prepared.size(), ImageSize::square(2));
        assert_eq!(prepared.band(Band::Red), &Array2::from_elem((2, 2), 16.0));
        assert_eq!(prepared.band(Band::Blue), &Array2::from_elem((2, 2), 48.0));
    }

    #[test]
    fn test_prepare_without_downscale_only_crops() {
        let channels = triple((10, 10));
        let prepared = prepare(&channels, &config_with(ImageSize::square(6), 1)).unwrap();
        assert_eq!(prepared.size(), ImageSize::square(6));
        assert_eq!(prepared.band(Band::Green), &Array2::from_elem((6, 6), 2.0));
    }

    #[test]
    fn test_prepare_reports_band_of_crop_failure() {
        let channels = triple((4, 4));
        let err = prepare(&channels, &config_with(ImageSize::square(8), 1)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Crop {
                band: Band::Red,
                source: CropError::TargetTooLarge { .. }
            }
        ));
    }

    #[test]
    fn test_prepare_exact_policy_failure() {
        let channels = triple((9, 9));
        let mut config = config_with(ImageSize::square(9), 2);
        config.edge_policy = EdgePolicy::Exact;
        let err = prepare(&channels, &config).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Reduce {
                band: Band::Red,
                source: ReduceError::NotDivisible { .. }
            }
        ));
    }

    #[test]
    fn test_tone_map_normalizes_bands_independently() {
        let channels = triple((8, 8));
        let ([red, green, blue], maxima) = tone_map(&channels, &ToneMapper::default());

        // Constant bands of different flux map to identical pixels
        assert_eq!(red, green);
        assert_eq!(green, blue);
        assert_eq!(maxima, [32.0, 64.0, 96.0]);
    }

    #[test]
    fn test_error_messages_name_band() {
        let err = PipelineError::Load {
            band: Band::Green,
            source: FitsError::NoImageData(PathBuf::from("g.fits")),
        };
        let message = err.to_string();
        assert!(message.contains("green"));
        assert!(message.contains("g.fits"));
    }
}
