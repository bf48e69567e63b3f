use fitsio::images::{ImageDescription, ImageType};
use fitsio::FitsFile;
use ndarray::Array2;
use psf_texture::{ImageSize, PipelineConfig};
use std::path::{Path, PathBuf};

/// Writes `data` as the 32-bit float primary image of a new FITS file
pub fn write_fits(path: &Path, data: &Array2<f32>) {
    let (rows, cols) = data.dim();
    let description = ImageDescription {
        data_type: ImageType::Float,
        dimensions: &[rows, cols],
    };
    let mut fptr = FitsFile::create(path)
        .with_custom_primary(&description)
        .overwrite()
        .open()
        .expect("Failed to create FITS file");
    let hdu = fptr.primary_hdu().expect("Missing primary HDU");
    let flat: Vec<f32> = data.iter().copied().collect();
    hdu.write_image(&mut fptr, &flat)
        .expect("Failed to write FITS image");
}

/// Writes the three bands into `dir` and returns a config pointing at them
pub fn write_bands(
    dir: &Path,
    bands: [&Array2<f32>; 3],
    crop: ImageSize,
    downscale: usize,
    output: &str,
) -> PipelineConfig {
    let paths: Vec<PathBuf> = ["red", "green", "blue"]
        .iter()
        .zip(bands)
        .map(|(name, data)| {
            let path = dir.join(format!("{name}.fits"));
            write_fits(&path, data);
            path
        })
        .collect();

    PipelineConfig {
        red: paths[0].clone(),
        green: paths[1].clone(),
        blue: paths[2].clone(),
        crop,
        downscale,
        output: dir.join(output),
        ..PipelineConfig::png_preset()
    }
}

/// Squared distance from the floor center of a `(rows, cols)` grid
pub fn radial_distance_squared(shape: (usize, usize)) -> Array2<f32> {
    let (rows, cols) = shape;
    Array2::from_shape_fn(shape, |(r, c)| {
        let dy = r as f32 - (rows / 2) as f32;
        let dx = c as f32 - (cols / 2) as f32;
        dx * dx + dy * dy
    })
}
