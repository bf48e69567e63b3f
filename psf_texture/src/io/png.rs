use image::{ImageFormat, Rgb, RgbImage};
use log::info;
use ndarray::Array2;
use std::path::Path;

use super::{ensure_parent_dir, matching_size, EncodeError};
use crate::image_size::ImageSize;

/// Interleaves three u8 planes into an RGB image.
///
/// Array indices `[y, x]` map to pixel coordinates `(x, y)`, so array
/// dimensions `(height, width)` become image dimensions `(width, height)`.
///
/// # Arguments
/// * `red`, `green`, `blue` - Equally sized planes
///
/// # Returns
/// * A channel-last RGB image, or `EncodeError::DimensionMismatch`
pub fn compose_rgb(
    red: &Array2<u8>,
    green: &Array2<u8>,
    blue: &Array2<u8>,
) -> Result<RgbImage, EncodeError> {
    let size = matching_size(red, green, blue)?;

    let img = RgbImage::from_fn(size.width as u32, size.height as u32, |x, y| {
        let index = [y as usize, x as usize];
        Rgb([red[index], green[index], blue[index]])
    });

    Ok(img)
}

/// Composes three u8 planes and saves them as a PNG file.
pub fn write_png_rgb<P: AsRef<Path>>(
    path: P,
    red: &Array2<u8>,
    green: &Array2<u8>,
    blue: &Array2<u8>,
) -> Result<ImageSize, EncodeError> {
    let path = path.as_ref();
    let img = compose_rgb(red, green, blue)?;
    ensure_parent_dir(path)?;

    img.save_with_format(path, ImageFormat::Png)
        .map_err(|source| EncodeError::Image {
            path: path.to_path_buf(),
            source,
        })?;

    let size = ImageSize::of_array(red);
    info!("Wrote {} PNG image to {}", size, path.display());
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_compose_interleaves_channels() {
        let red = Array2::from_shape_fn((2, 3), |(r, c)| (r * 3 + c) as u8);
        let green = Array2::from_elem((2, 3), 100u8);
        let blue = Array2::from_shape_fn((2, 3), |(r, _)| 200 + r as u8);

        let img = compose_rgb(&red, &green, &blue).unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1), &Rgb([5, 100, 201]));
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 100, 200]));
    }

    #[test]
    fn test_png_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("psf.png");
        let red = Array2::from_shape_fn((4, 5), |(r, c)| (r * 50 + c) as u8);
        let green = red.mapv(|v| 255 - v);
        let blue = Array2::from_elem((4, 5), 7u8);

        let size = write_png_rgb(&path, &red, &green, &blue).unwrap();
        assert_eq!(size, ImageSize::from_width_height(5, 4));

        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded.dimensions(), (5, 4));
        for ((r, c), &value) in red.indexed_iter() {
            let pixel = loaded.get_pixel(c as u32, r as u32);
            assert_eq!(pixel, &Rgb([value, green[[r, c]], 7]));
        }
    }

    #[test]
    fn test_mismatch_rejected() {
        let a = Array2::<u8>::zeros((2, 2));
        let b = Array2::<u8>::zeros((2, 3));
        assert!(matches!(
            compose_rgb(&a, &a, &b),
            Err(EncodeError::DimensionMismatch { .. })
        ));
    }
}
