// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The owned image buffer that flows through the carver.
//!
//! A `Raster` is a row-major run of 8-bit samples, `channels` per
//! pixel.  Whoever holds one owns it outright; each carving iteration
//! builds a fresh, narrower raster and the old one is dropped.

use crate::errors::{try_filled, CarveError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl Raster {
    /// A black raster of the given shape.
    pub fn new(width: u32, height: u32, channels: u8) -> Result<Self> {
        if channels == 0 {
            return Err(CarveError::precondition("a raster needs at least one channel"));
        }
        let len = width as usize * height as usize * channels as usize;
        Ok(Raster {
            width,
            height,
            channels,
            data: try_filled(len, 0u8)?,
        })
    }

    /// Wrap an existing buffer of samples.
    pub fn from_raw(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * channels as usize;
        if channels == 0 || data.len() != expected {
            return Err(CarveError::precondition(format!(
                "a {}x{}x{} raster needs {} samples, got {}",
                width,
                height,
                channels,
                expected,
                data.len()
            )));
        }
        Ok(Raster {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Samples in one row.
    pub fn row_len(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// The samples of row `y`.
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(y < self.height, "row {} of a {}-row raster", y, self.height);
        let start = y as usize * self.row_len();
        &self.data[start..start + self.row_len()]
    }

    /// The channel group of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        assert!(x < self.width, "column {} of a {}-column raster", x, self.width);
        let channels = self.channels as usize;
        let start = x as usize * channels;
        &self.row(y)[start..start + channels]
    }

    /// The reference channel (the first one) of the pixel at `(x, y)`.
    pub fn sample(&self, x: u32, y: u32) -> u8 {
        self.pixel(x, y)[0]
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_mut_raw(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [u8; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

    #[test]
    fn addressing_is_channel_atomic() {
        let raster = Raster::from_raw(2, 2, 3, SAMPLES.to_vec()).unwrap();
        assert_eq!(raster.row_len(), 6);
        assert_eq!(raster.row(1), &[7, 8, 9, 10, 11, 12]);
        assert_eq!(raster.pixel(1, 0), &[4, 5, 6]);
        assert_eq!(raster.sample(0, 1), 7);
    }

    #[test]
    fn shape_mismatches_are_rejected() {
        assert_eq!(
            Raster::from_raw(2, 2, 4, SAMPLES.to_vec()).unwrap_err().kind(),
            "PreconditionViolation"
        );
        assert!(Raster::new(2, 2, 0).is_err());
        assert_eq!(Raster::new(3, 1, 4).unwrap().as_raw().len(), 12);
    }
}
