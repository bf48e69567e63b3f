//! Conversion parameters.
//!
//! Everything that steers a conversion lives in [`PipelineConfig`]: the three
//! band files, the crop window, the block-reduction factor and edge policy,
//! the output path and the tone-mapping base. The two presets reproduce the
//! parameters used to produce the published JWST PSF textures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::image_proc::{EdgePolicy, DEFAULT_LOG_BASE};
use crate::image_size::ImageSize;

/// Default red band source (0.8 micron)
pub const DEFAULT_RED_FITS: &str = "./PSF+scatlight_0.8micron.fits";
/// Default green band source (0.7 micron)
pub const DEFAULT_GREEN_FITS: &str = "./PSF+scatlight_0.7micron.fits";
/// Default blue band source (0.6 micron)
pub const DEFAULT_BLUE_FITS: &str = "./PSF+scatlight_0.6micron.fits";

/// One of the three color bands of the texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    Red,
    Green,
    Blue,
}

impl Band {
    pub const ALL: [Band; 3] = [Band::Red, Band::Green, Band::Blue];
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Red => write!(f, "red"),
            Band::Green => write!(f, "green"),
            Band::Blue => write!(f, "blue"),
        }
    }
}

/// Errors that can occur while loading or validating a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

fn default_log_base() -> f64 {
    DEFAULT_LOG_BASE
}

/// Parameters for one FITS-to-texture conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Red band FITS file
    pub red: PathBuf,
    /// Green band FITS file
    pub green: PathBuf,
    /// Blue band FITS file
    pub blue: PathBuf,
    /// Centered crop window applied to every band
    pub crop: ImageSize,
    /// Block-sum factor; 1 disables downsampling
    pub downscale: usize,
    /// Handling of sizes the factor does not divide
    #[serde(default)]
    pub edge_policy: EdgePolicy,
    /// Output image path
    pub output: PathBuf,
    /// Base of the logarithmic tone curve (PNG output only)
    #[serde(default = "default_log_base")]
    pub log_base: f64,
}

impl PipelineConfig {
    /// Linear EXR conversion: 4096x4096 crop summed down by 4.
    pub fn exr_preset() -> Self {
        Self {
            red: PathBuf::from(DEFAULT_RED_FITS),
            green: PathBuf::from(DEFAULT_GREEN_FITS),
            blue: PathBuf::from(DEFAULT_BLUE_FITS),
            crop: ImageSize::square(4096),
            downscale: 4,
            edge_policy: EdgePolicy::default(),
            output: PathBuf::from("jwst_psf.exr"),
            log_base: DEFAULT_LOG_BASE,
        }
    }

    /// Tone mapped PNG conversion: 2048x2048 crop at full resolution.
    pub fn png_preset() -> Self {
        Self {
            red: PathBuf::from(DEFAULT_RED_FITS),
            green: PathBuf::from(DEFAULT_GREEN_FITS),
            blue: PathBuf::from(DEFAULT_BLUE_FITS),
            crop: ImageSize::square(2048),
            downscale: 1,
            edge_policy: EdgePolicy::default(),
            output: PathBuf::from("jwst.png"),
            log_base: DEFAULT_LOG_BASE,
        }
    }

    /// Source file for a band
    pub fn band_path(&self, band: Band) -> &Path {
        match band {
            Band::Red => &self.red,
            Band::Green => &self.green,
            Band::Blue => &self.blue,
        }
    }

    /// Rejects parameters no conversion can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crop.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "crop size {} has a zero dimension",
                self.crop
            )));
        }
        if self.downscale == 0 {
            return Err(ConfigError::Invalid(
                "downscale factor must be at least 1".to_string(),
            ));
        }
        if !(self.log_base.is_finite() && self.log_base > 1.0) {
            return Err(ConfigError::Invalid(format!(
                "log base must be greater than 1, got {}",
                self.log_base
            )));
        }
        Ok(())
    }

    /// Save to JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
