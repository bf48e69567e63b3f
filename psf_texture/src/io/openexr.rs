//! Linear RGB OpenEXR output.
//!
//! The EXR texture keeps the raw summed flux as 32-bit floats in three
//! channels named "R", "G" and "B", stored as ZIP-compressed scan lines.

use exr::prelude::{
    read_first_rgba_layer_from_file, Blocks, Compression, Encoding, Image, LineOrder,
    SpecificChannels, Vec2, WritableImage,
};
use log::info;
use ndarray::Array2;
use std::path::Path;

use super::{ensure_parent_dir, matching_size, EncodeError};
use crate::image_size::ImageSize;

/// Red, green and blue `f32` planes of an EXR image, each shaped `(height, width)`
#[derive(Debug, Clone, PartialEq)]
pub struct ExrPlanes {
    pub red: Array2<f32>,
    pub green: Array2<f32>,
    pub blue: Array2<f32>,
}

impl ExrPlanes {
    pub fn size(&self) -> ImageSize {
        ImageSize::of_array(&self.red)
    }
}

fn scan_line_encoding() -> Encoding {
    Encoding {
        compression: Compression::ZIP16,
        blocks: Blocks::ScanLines,
        line_order: LineOrder::Increasing,
    }
}

/// Writes three equally sized planes as an RGB float EXR file.
///
/// # Errors
/// * `EncodeError::DimensionMismatch` - planes differ in size
/// * `EncodeError::Empty` - planes have a zero dimension
/// * `EncodeError::Exr` - the EXR encoder or the file write failed
pub fn write_exr_rgb<P: AsRef<Path>>(
    path: P,
    red: &Array2<f32>,
    green: &Array2<f32>,
    blue: &Array2<f32>,
) -> Result<ImageSize, EncodeError> {
    let path = path.as_ref();
    let size = matching_size(red, green, blue)?;
    ensure_parent_dir(path)?;

    let channels = SpecificChannels::rgb(|position: Vec2<usize>| {
        let index = [position.y(), position.x()];
        (red[index], green[index], blue[index])
    });

    Image::from_encoded_channels((size.width, size.height), scan_line_encoding(), channels)
        .write()
        .to_file(path)
        .map_err(|source| EncodeError::Exr {
            path: path.to_path_buf(),
            source,
        })?;

    info!("Wrote {} EXR image to {}", size, path.display());
    Ok(size)
}

/// Reads the RGB channels of the first layer of an EXR file.
pub fn read_exr_rgb<P: AsRef<Path>>(path: P) -> Result<ExrPlanes, EncodeError> {
    let path = path.as_ref();

    let image = read_first_rgba_layer_from_file(
        path,
        |resolution: Vec2<usize>, _| {
            let shape = (resolution.height(), resolution.width());
            ExrPlanes {
                red: Array2::zeros(shape),
                green: Array2::zeros(shape),
                blue: Array2::zeros(shape),
            }
        },
        |planes: &mut ExrPlanes, position: Vec2<usize>, (r, g, b, _a): (f32, f32, f32, f32)| {
            let index = [position.y(), position.x()];
            planes.red[index] = r;
            planes.green[index] = g;
            planes.blue[index] = b;
        },
    )
    .map_err(|source| EncodeError::Exr {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(image.layer_data.channel_data.pixels)
}
