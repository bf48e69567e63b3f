use crate::config::{ConfigError, PipelineConfig};
use crate::image_proc::EdgePolicy;
use crate::image_size::ImageSize;
use clap::Args;
use std::path::PathBuf;

/// Parse a crop size given as "N" (square) or "WIDTHxHEIGHT"
fn parse_crop(s: &str) -> Result<ImageSize, String> {
    let s = s.trim();
    let parse_dim = |part: &str| {
        part.trim()
            .parse::<usize>()
            .map_err(|_| format!("Invalid crop dimension: {}", part))
    };

    let size = match s.split_once(['x', 'X']) {
        Some((width, height)) => ImageSize::from_width_height(parse_dim(width)?, parse_dim(height)?),
        None => ImageSize::square(parse_dim(s)?),
    };

    if size.is_empty() {
        return Err("Crop dimensions must be positive".to_string());
    }
    Ok(size)
}

/// Wrapper for ImageSize parsed from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropArg(pub ImageSize);

impl std::str::FromStr for CropArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_crop(s).map(CropArg)
    }
}

impl std::fmt::Display for CropArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.width == self.0.height {
            write!(f, "{}", self.0.width)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Arguments shared by the conversion binaries
///
/// Every flag is optional; unset flags keep the value from the config file,
/// or from the binary's preset when no config file is given.
#[derive(Args, Debug, Clone, Default)]
pub struct ConversionArgs {
    /// JSON configuration file replacing the built-in preset
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Red band FITS file
    #[arg(long, value_name = "FITS")]
    pub red: Option<PathBuf>,

    /// Green band FITS file
    #[arg(long, value_name = "FITS")]
    pub green: Option<PathBuf>,

    /// Blue band FITS file
    #[arg(long, value_name = "FITS")]
    pub blue: Option<PathBuf>,

    /// Centered crop size, "N" for a square or "WIDTHxHEIGHT"
    #[arg(long)]
    pub crop: Option<CropArg>,

    /// Block-sum downscale factor (1 disables downsampling)
    #[arg(long)]
    pub downscale: Option<usize>,

    /// Edge handling when the downscale factor does not divide the crop size
    #[arg(long, value_enum)]
    pub edge_policy: Option<EdgePolicy>,

    /// Output image path
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl ConversionArgs {
    /// Resolve the final configuration: preset, then config file, then flags.
    pub fn resolve(&self, preset: PipelineConfig) -> Result<PipelineConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load_from_file(path)?,
            None => preset,
        };

        if let Some(red) = &self.red {
            config.red = red.clone();
        }
        if let Some(green) = &self.green {
            config.green = green.clone();
        }
        if let Some(blue) = &self.blue {
            config.blue = blue.clone();
        }
        if let Some(crop) = self.crop {
            config.crop = crop.0;
        }
        if let Some(downscale) = self.downscale {
            config.downscale = downscale;
        }
        if let Some(edge_policy) = self.edge_policy {
            config.edge_policy = edge_policy;
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }

        config.validate()?;
        Ok(config)
    }
}
