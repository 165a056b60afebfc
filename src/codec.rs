// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Getting rasters in and out of image files.
//!
//! Decoding normalises whatever the file holds to 8 bits per sample:
//! images with transparency come back as four channels (RGBA), all
//! others as three (RGB).  Encoding always writes three-channel RGB,
//! whatever the raster carries.
//!
//! The container codecs themselves stream, so they run on the calling
//! thread.  Only the copies between the decoder's rows and a raster
//! (and back) go through the execution policy.  Writes are serialised
//! process-wide, so two artifacts are never encoded at once.

use crate::energy::EnergyMap;
use crate::errors::{CarveError, Result};
use crate::execution::Execution;
use crate::raster::Raster;
use image::{GrayImage, ImageError, RgbImage};
use log::debug;
use std::path::Path;
use std::sync::Mutex;

static ENCODER: Mutex<()> = Mutex::new(());

fn io_failure(path: &Path, reason: impl ToString) -> CarveError {
    CarveError::IoFailure {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn image_failure(path: &Path, err: ImageError) -> CarveError {
    match err {
        ImageError::IoError(e) => io_failure(path, e),
        other => CarveError::DecodeFailure {
            path: path.display().to_string(),
            reason: other.to_string(),
        },
    }
}

/// Read an image file into a raster.
pub fn decode(path: &Path, execution: Execution) -> Result<Raster> {
    let decoded = image::open(path).map_err(|e| image_failure(path, e))?;
    let (width, height, channels, staged) = if decoded.color().has_alpha() {
        let rgba = decoded.into_rgba8();
        (rgba.width(), rgba.height(), 4u8, rgba.into_raw())
    } else {
        let rgb = decoded.into_rgb8();
        (rgb.width(), rgb.height(), 3u8, rgb.into_raw())
    };
    debug!(
        "decoded {}: {}x{}, {} channels",
        path.display(),
        width,
        height,
        channels
    );

    let mut raster = Raster::new(width, height, channels)?;
    let row_len = raster.row_len();
    execution.for_each_chunk(raster.as_mut_raw(), row_len, |y, row| {
        let start = y * row_len;
        row.copy_from_slice(&staged[start..start + row_len]);
    });
    Ok(raster)
}

// First three channels of every pixel; single- and dual-channel
// rasters are read as gray.
fn to_rgb(raster: &Raster, execution: Execution) -> Result<RgbImage> {
    let (width, height) = raster.dimensions();
    let channels = raster.channels() as usize;
    let mut rgb = Raster::new(width, height, 3)?;
    execution.for_each_chunk(rgb.as_mut_raw(), width as usize * 3, |y, row| {
        let source = raster.row(y as u32);
        for (target, pixel) in row.chunks_mut(3).zip(source.chunks(channels)) {
            if channels >= 3 {
                target.copy_from_slice(&pixel[..3]);
            } else {
                target.iter_mut().for_each(|c| *c = pixel[0]);
            }
        }
    });
    RgbImage::from_raw(width, height, rgb.into_raw())
        .ok_or_else(|| CarveError::precondition("RGB conversion produced a short buffer"))
}

/// Write a raster to an image file as 8-bit RGB.  The container format
/// follows the file extension.
pub fn encode(path: &Path, raster: &Raster, execution: Execution) -> Result<()> {
    let rgb = to_rgb(raster, execution)?;
    let _guard = ENCODER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    rgb.save(path).map_err(|e| image_failure(path, e))?;
    debug!("wrote {} ({}x{})", path.display(), rgb.width(), rgb.height());
    Ok(())
}

/// Render an energy map as a grayscale image, scaled so that the
/// strongest energy in the map is white.
pub fn energy_to_image(energy: &EnergyMap) -> GrayImage {
    let factor = u32::from(energy.as_slice().iter().copied().max().unwrap_or(0));
    GrayImage::from_fn(energy.width, energy.height, |x, y| {
        let e = u32::from(energy[(x, y)]);
        let scaled = if factor == 0 { 0 } else { e * 255 / factor };
        image::Luma([u8::try_from(scaled).unwrap_or(u8::MAX)])
    })
}

/// Write an energy map to an image file.
pub fn encode_energy(path: &Path, energy: &EnergyMap) -> Result<()> {
    let gray = energy_to_image(energy);
    let _guard = ENCODER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    gray.save(path).map_err(|e| image_failure(path, e))?;
    debug!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twodmap::TwoDimensionalMap;
    use image::{DynamicImage, Rgb, Rgba, RgbaImage};

    #[test]
    fn opaque_images_round_trip_as_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flag.png");
        let source = RgbImage::from_fn(4, 3, |x, y| Rgb([x as u8 * 60, y as u8 * 80, 7]));
        source.save(&path).unwrap();

        let raster = decode(&path, Execution::with_workers(2)).unwrap();
        assert_eq!((raster.dimensions(), raster.channels()), ((4, 3), 3));
        assert_eq!(raster.pixel(3, 2), &[180, 160, 7]);
        assert_eq!(raster.as_raw(), source.as_raw().as_slice());
    }

    #[test]
    fn transparency_is_kept_on_decode_and_dropped_on_encode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ghost.png");
        RgbaImage::from_pixel(3, 3, Rgba([10, 20, 30, 40]))
            .save(&path)
            .unwrap();

        let raster = decode(&path, Execution::Sequential).unwrap();
        assert_eq!(raster.channels(), 4);
        assert_eq!(raster.pixel(1, 1), &[10, 20, 30, 40]);

        let out = dir.path().join("opaque.png");
        encode(&out, &raster, Execution::parallel()).unwrap();
        let written = image::open(&out).unwrap();
        assert!(matches!(written, DynamicImage::ImageRgb8(_)));
        assert_eq!(written.to_rgb8().get_pixel(2, 2), &Rgb([10, 20, 30]));
    }

    #[test]
    fn gray_rasters_are_widened_on_encode() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("gray.png");
        let raster = Raster::from_raw(2, 1, 1, vec![5, 250]).unwrap();
        encode(&out, &raster, Execution::Sequential).unwrap();
        let written = image::open(&out).unwrap().to_rgb8();
        assert_eq!(written.get_pixel(1, 0), &Rgb([250, 250, 250]));
    }

    #[test]
    fn missing_files_are_io_failures() {
        let dir = tempfile::tempdir().unwrap();
        let err = decode(&dir.path().join("nope.png"), Execution::Sequential).unwrap_err();
        assert_eq!(err.kind(), "IOFailure");
    }

    #[test]
    fn garbage_is_a_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"this is not a png").unwrap();
        let err = decode(&path, Execution::Sequential).unwrap_err();
        assert_eq!(err.kind(), "DecodeFailure");
    }

    #[test]
    fn energy_images_are_normalised() {
        let map = TwoDimensionalMap::from_raw(3, 1, vec![0u8, 10, 20]).unwrap();
        let gray = energy_to_image(&map);
        assert_eq!(gray.as_raw(), &vec![0, 127, 255]);
        let flat = TwoDimensionalMap::from_raw(2, 1, vec![0u8, 0]).unwrap();
        assert_eq!(energy_to_image(&flat).as_raw(), &vec![0, 0]);
    }

    #[test]
    fn saturated_energy_stays_white() {
        let map = TwoDimensionalMap::from_raw(4, 1, vec![255u8, 1, 128, 255]).unwrap();
        assert_eq!(energy_to_image(&map).as_raw(), &vec![255, 1, 128, 255]);
    }
}
