//! Converts three band FITS PSF images into a linear float OpenEXR texture
//!
//! The bands are cropped to a centered window and block-summed, then stored
//! as 32-bit float R, G and B channels without any tone mapping. Summing keeps
//! total flux, so the EXR holds physically meaningful relative intensities.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: ./PSF+scatlight_0.{8,7,6}micron.fits, 4096 crop, downscale 4
//! cargo run --release --bin fits2exr
//!
//! # Custom inputs and a smaller crop
//! cargo run --release --bin fits2exr -- --red r.fits --green g.fits --blue b.fits \
//!     --crop 2048 --downscale 2 -o psf.exr
//! ```
//!
//! Set `RUST_LOG=debug` for per-stage detail.

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use psf_texture::pipeline::run_exr;
use psf_texture::shared_args::ConversionArgs;
use psf_texture::PipelineConfig;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "fits2exr",
    about = "Converts RGB band FITS PSF images into a linear float OpenEXR texture",
    long_about = None
)]
struct Args {
    #[command(flatten)]
    conversion: ConversionArgs,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let result = args
        .conversion
        .resolve(PipelineConfig::exr_preset())
        .map_err(Into::into)
        .and_then(|config| run_exr(&config));

    match result {
        Ok(report) => {
            info!(
                "Wrote the EXR file {} ({})",
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
