//! Conversion of simulated telescope PSFs from FITS to texture formats
//!
//! Three single-band FITS images (red, green and blue wavelengths) are
//! cropped to a centered window, optionally block-summed, and written either
//! as a linear 32-bit float OpenEXR file or as a tone mapped 8-bit PNG. The
//! PNG curve weights flux by squared distance from the PSF center before a
//! logarithmic compression, which brings out the faint diffraction pattern
//! around the bright core.
//!
//! # Example
//! ```no_run
//! use psf_texture::{pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::png_preset();
//! let report = pipeline::run_png(&config).expect("conversion failed");
//! println!("wrote {} image to {}", report.size, report.output.display());
//! ```

pub mod config;
pub mod image_proc;
pub mod image_size;
pub mod io;
pub mod pipeline;
pub mod shared_args;

pub use config::{Band, ConfigError, PipelineConfig};
pub use image_size::ImageSize;
pub use pipeline::{ChannelTriple, ConversionReport, PipelineError};
