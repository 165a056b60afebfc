// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::errors::{try_filled, Result};
use std::ops::{Index, IndexMut};

/// Defines the basic energy map: An addressable two-dimensional field
/// containing an object that represents one of several possible
/// objects during processing: a basic u8 for the energy map, or a
/// cumulative cost + parent address, for the seam search.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoDimensionalMap<P: Default + Copy> {
    pub width: u32,
    pub height: u32,
    cells: Vec<P>,
}

impl<P: Default + Copy> TwoDimensionalMap<P> {
    /// Define a new (abstract) map, every cell at its default.  The
    /// content type must implement the Default trait.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(TwoDimensionalMap {
            width,
            height,
            cells: try_filled(width as usize * height as usize, P::default())?,
        })
    }

    /// Wrap an existing row-major buffer.  `None` if the buffer
    /// doesn't hold exactly `width * height` cells.
    pub fn from_raw(width: u32, height: u32, cells: Vec<P>) -> Option<Self> {
        if cells.len() != width as usize * height as usize {
            return None;
        }
        Some(TwoDimensionalMap {
            width,
            height,
            cells,
        })
    }

    // Absolutely, the number one name of this game is keep the index
    // math in a singular location and never, ever mess with it.  This
    // particular variant is the same one used in image.rs.
    fn get_index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "({}, {}) lies outside a {}x{} map",
            x,
            y,
            self.width,
            self.height
        );
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// True when the map has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// A single row, left to right.
    pub fn row(&self, y: u32) -> &[P] {
        let start = self.get_index(0, y);
        &self.cells[start..start + self.width as usize]
    }

    /// All cells, row-major.
    pub fn as_slice(&self) -> &[P] {
        &self.cells
    }

    /// All cells, row-major, for stages that fill the map in chunks.
    pub fn as_mut_slice(&mut self) -> &mut [P] {
        &mut self.cells
    }

    /// Split the map at row `y`: everything above it, read-only, and
    /// row `y` itself, writable.  This is what lets the seam search
    /// fill one row while reading the row it depends on.
    pub fn split_at_row(&mut self, y: u32) -> (&[P], &mut [P]) {
        let start = self.get_index(0, y);
        let width = self.width as usize;
        let (above, rest) = self.cells.split_at_mut(start);
        (above, &mut rest[..width])
    }
}

impl<P: Default + Copy> Index<(u32, u32)> for TwoDimensionalMap<P> {
    type Output = P;

    /// A convenience addressing mode for getting values.
    fn index(&self, (x, y): (u32, u32)) -> &P {
        let index = self.get_index(x, y);
        &self.cells[index]
    }
}

impl<P: Default + Copy> IndexMut<(u32, u32)> for TwoDimensionalMap<P> {
    /// A convenience addressing mode for setting values.
    fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut P {
        let index = self.get_index(x, y);
        &mut self.cells[index]
    }
}

/// One cell of the seam search table: the cheapest cumulative energy
/// of any path from the top row ending here, and the column in the
/// row above that path came through.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct PathCost {
    pub cost: u32,
    pub parent: u32,
}
