// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seamcarve - The main loop
//!
//! The carving routine proper, with helpers for painting a seam and
//! cutting it out.  Each iteration computes an energy map, finds the
//! cheapest seam through it, hands a highlighted copy of the image to
//! the artifact sink, and cuts the seam out; the narrowed image is the
//! next iteration's input.

use crate::energy::{calculate_energy, EnergyMap};
use crate::errors::{CarveError, Result};
use crate::execution::Execution;
use crate::raster::Raster;
use crate::seam::Seam;
use crate::seamfinder::energy_to_vertical_seam;
use log::{debug, info, warn};

/// The marker painted over a highlighted seam.
pub const SEAM_MARKER: [u8; 3] = [255, 0, 0];

/// Return a copy of `image` with every pixel on the seam painted red.
/// Channels beyond the third (alpha, usually) are left alone.
pub fn highlight_vertical_seam(image: &Raster, seam: &Seam, execution: Execution) -> Result<Raster> {
    if image.channels() < 3 {
        return Err(CarveError::precondition(format!(
            "cannot paint a seam on a {}-channel image",
            image.channels()
        )));
    }
    seam.check_fits(image.width(), image.height())?;

    let mut imgbuf = image.clone();
    let channels = image.channels() as usize;
    let row_len = image.row_len();
    execution.for_each_chunk(imgbuf.as_mut_raw(), row_len, |y, row| {
        let start = seam[y] as usize * channels;
        row[start..start + 3].copy_from_slice(&SEAM_MARKER);
    });
    Ok(imgbuf)
}

/// Return a copy of `image` one column narrower, with the seam's pixel
/// taken out of every row.  Pixels left of the seam stay put; pixels
/// right of it move one column left, whole channel groups at a time.
pub fn remove_vertical_seam(image: &Raster, seam: &Seam, execution: Execution) -> Result<Raster> {
    let (width, height) = image.dimensions();
    if width == 0 {
        return Err(CarveError::precondition("cannot remove a seam from an empty image"));
    }
    seam.check_fits(width, height)?;

    let mut imgbuf = Raster::new(width - 1, height, image.channels())?;
    let channels = image.channels() as usize;
    let row_len = imgbuf.row_len();
    execution.for_each_chunk(imgbuf.as_mut_raw(), row_len, |y, row| {
        let source = image.row(y as u32);
        let cut = seam[y] as usize * channels;
        row[..cut].copy_from_slice(&source[..cut]);
        row[cut..].copy_from_slice(&source[cut + channels..]);
    });
    Ok(imgbuf)
}

/// Where the by-products of each iteration go.  Every method is called
/// once per iteration; an error from any of them fails the iteration.
pub trait ArtifactSink {
    /// The input image with the iteration's seam painted on it.
    fn highlighted(&mut self, iteration: usize, image: &Raster) -> Result<()>;

    /// The narrowed image the iteration produced.
    fn narrowed(&mut self, iteration: usize, image: &Raster) -> Result<()>;

    /// The energy map the seam was found on.  Ignored by default.
    fn energy(&mut self, _iteration: usize, _energy: &EnergyMap) -> Result<()> {
        Ok(())
    }
}

/// A sink that keeps nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardArtifacts;

impl ArtifactSink for DiscardArtifacts {
    fn highlighted(&mut self, _iteration: usize, _image: &Raster) -> Result<()> {
        Ok(())
    }

    fn narrowed(&mut self, _iteration: usize, _image: &Raster) -> Result<()> {
        Ok(())
    }
}

/// Where a carving run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarveState {
    /// No run has started.
    Idle,
    /// The given iteration is in progress.
    Iterating(usize),
    /// Every requested iteration completed.
    Done,
    /// The given iteration failed; earlier ones completed.
    Failed(usize),
}

/// The smallest image that still has an interior to carve.
pub const MIN_CARVABLE: u32 = 3;

/// The carving orchestrator.  It holds the execution policy and the
/// state of the most recent run.
#[derive(Debug)]
pub struct SeamCarver {
    execution: Execution,
    state: CarveState,
}

impl SeamCarver {
    /// Creates a new SeamCarver that runs its stages under `execution`.
    pub fn new(execution: Execution) -> Self {
        SeamCarver {
            execution,
            state: CarveState::Idle,
        }
    }

    pub fn execution(&self) -> Execution {
        self.execution
    }

    pub fn state(&self) -> CarveState {
        self.state
    }

    /// Carve `iterations` vertical seams out of `image`, one at a time,
    /// returning the narrowed image.  Fails with `DimensionExhausted`
    /// before any iteration that starts on an image narrower or
    /// shorter than three pixels.
    pub fn carve<S: ArtifactSink>(
        &mut self,
        image: Raster,
        iterations: usize,
        sink: &mut S,
    ) -> Result<Raster> {
        if iterations == 0 {
            return Err(CarveError::precondition("the iteration count must be positive"));
        }
        let available = image.width().saturating_sub(MIN_CARVABLE - 1) as usize;
        if iterations > available {
            warn!(
                "{} iterations requested, but a {}-wide image only has {} to give",
                iterations,
                image.width(),
                available
            );
        }

        let mut scratch = image;
        for iteration in 0..iterations {
            self.state = CarveState::Iterating(iteration);
            scratch = match self.carve_once(&scratch, iteration, sink) {
                Ok(narrowed) => narrowed,
                Err(err) => {
                    self.state = CarveState::Failed(iteration);
                    return Err(err);
                }
            };
        }
        self.state = CarveState::Done;
        Ok(scratch)
    }

    fn carve_once<S: ArtifactSink>(
        &self,
        image: &Raster,
        iteration: usize,
        sink: &mut S,
    ) -> Result<Raster> {
        let (width, height) = image.dimensions();
        if width < MIN_CARVABLE || height < MIN_CARVABLE {
            return Err(CarveError::DimensionExhausted {
                iteration,
                width,
                height,
            });
        }

        let energy = calculate_energy(image, self.execution)?;
        let seam = energy_to_vertical_seam(&energy, self.execution)?;
        debug!(
            "iteration {}: seam energy {}, top column {}",
            iteration,
            seam.energy(&energy),
            seam[0]
        );
        sink.energy(iteration, &energy)?;

        let highlighted = highlight_vertical_seam(image, &seam, self.execution)?;
        sink.highlighted(iteration, &highlighted)?;

        let narrowed = remove_vertical_seam(image, &seam, self.execution)?;
        sink.narrowed(iteration, &narrowed)?;
        info!(
            "iteration {}: {}x{} -> {}x{}",
            iteration,
            width,
            height,
            narrowed.width(),
            narrowed.height()
        );
        Ok(narrowed)
    }
}
