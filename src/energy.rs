// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calculate the energy of an image
//!
//! The energy of a pixel is the magnitude of the local gradient of the
//! reference channel (the first channel of the pixel format), taken
//! over its 3x3 neighborhood:
//!
//! ```text
//!     gx = Σ p(x+i, y+j)·i        i, j ∈ {-1, 0, 1}
//!     gy = Σ p(x+i, y+j)·j
//!     e(x, y) = round(√(gx² + gy²)), saturated to 255
//! ```
//!
//! The outermost one-pixel border has no full neighborhood and is
//! defined to have zero energy.  Images narrower or shorter than three
//! pixels therefore have an all-zero energy map.

use crate::execution::Execution;
use crate::raster::Raster;
use crate::twodmap::TwoDimensionalMap;
use crate::errors::Result;
use itertools::iproduct;

/// One byte of importance per pixel.
pub type EnergyMap = TwoDimensionalMap<u8>;

// (Raster, x, y) -> Energy, for interior pixels only.
#[inline]
fn gradient_energy(image: &Raster, x: u32, y: u32) -> u8 {
    let (gx, gy) = iproduct!(-1i32..=1, -1i32..=1).fold((0i32, 0i32), |(gx, gy), (j, i)| {
        let sample = i32::from(image.sample((x as i32 + i) as u32, (y as i32 + j) as u32));
        (gx + sample * i, gy + sample * j)
    });
    let magnitude = f64::from(gx * gx + gy * gy).sqrt().round();
    num_traits::clamp(magnitude, 0.0, f64::from(u8::MAX)) as u8
}

/// Compute the energy of every pixel in an image.  Rows are
/// independent of one another, so in parallel mode each row is a unit
/// of work; the map is complete when this returns.
pub fn calculate_energy(image: &Raster, execution: Execution) -> Result<EnergyMap> {
    let (width, height) = image.dimensions();
    let mut emap = EnergyMap::new(width, height)?;
    if width < 3 || height < 3 {
        return Ok(emap);
    }

    execution.for_each_chunk(emap.as_mut_slice(), width as usize, |y, row| {
        let y = y as u32;
        if y == 0 || y == height - 1 {
            return;
        }
        for x in 1..width - 1 {
            row[x as usize] = gradient_energy(image, x, y);
        }
    });
    Ok(emap)
}
