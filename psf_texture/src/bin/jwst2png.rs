//! Converts three band FITS PSF images into a tone mapped 8-bit PNG texture
//!
//! Each band is weighted by squared distance from the image center,
//! normalized by its own maximum and compressed with
//! `ln(1 + v * (b - 1)) / ln(b)` before being truncated to 8 bits. The result
//! is the packed RGB PSF texture consumed by the renderer.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: ./PSF+scatlight_0.{8,7,6}micron.fits, 2048 crop, no downscale, base 1000
//! cargo run --release --bin jwst2png
//!
//! # Stronger compression, written elsewhere
//! cargo run --release --bin jwst2png -- --log-base 10000 -o textures/psf.png
//! ```

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use psf_texture::pipeline::run_png;
use psf_texture::shared_args::ConversionArgs;
use psf_texture::{PipelineConfig, PipelineError};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "jwst2png",
    about = "Converts RGB band FITS PSF images into a tone mapped 8-bit PNG texture",
    long_about = None
)]
struct Args {
    #[command(flatten)]
    conversion: ConversionArgs,

    /// Base of the logarithmic tone curve (must be greater than 1)
    #[arg(long)]
    log_base: Option<f64>,
}

fn resolve(args: &Args) -> Result<PipelineConfig, PipelineError> {
    let mut config = args.conversion.resolve(PipelineConfig::png_preset())?;
    if let Some(log_base) = args.log_base {
        config.log_base = log_base;
        config.validate()?;
    }
    Ok(config)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match resolve(&args).and_then(|config| run_png(&config)) {
        Ok(report) => {
            info!(
                "Wrote the PNG file {} ({})",
                report.output.display(),
                report.size
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
