// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::errors::{CarveError, Result};
use crate::twodmap::TwoDimensionalMap;
use std::ops::Index;

/// A vertical seam: one column per row, top to bottom.  Read with the
/// range `(0..height)`, it gives the XY coordinates of every pixel to
/// be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seam(Vec<u32>);

impl Seam {
    /// Wrap a column list, checking it against an image `width`
    /// pixels wide: every column in range, and no step between
    /// consecutive rows wider than one column.
    pub fn new(columns: Vec<u32>, width: u32) -> Result<Self> {
        if let Some(y) = columns.iter().position(|&x| x >= width) {
            return Err(CarveError::precondition(format!(
                "seam column {} at row {} is outside a {}-column image",
                columns[y], y, width
            )));
        }
        if let Some(y) = columns
            .windows(2)
            .position(|pair| (pair[0] as i64 - pair[1] as i64).abs() > 1)
        {
            return Err(CarveError::precondition(format!(
                "seam jumps from column {} to {} between rows {} and {}",
                columns[y],
                columns[y + 1],
                y,
                y + 1
            )));
        }
        Ok(Seam(columns))
    }

    // Only the seam search builds these unchecked; its backtracking
    // can't produce anything else.
    pub(crate) fn from_backtrack(columns: Vec<u32>) -> Self {
        Seam(columns)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn columns(&self) -> &[u32] {
        &self.0
    }

    /// Total energy of the pixels along this seam.
    pub fn energy(&self, energy: &TwoDimensionalMap<u8>) -> u64 {
        self.0
            .iter()
            .enumerate()
            .map(|(y, &x)| u64::from(energy[(x, y as u32)]))
            .sum()
    }

    /// Check that this seam fits an image of the given shape.
    pub(crate) fn check_fits(&self, width: u32, height: u32) -> Result<()> {
        if self.0.len() != height as usize {
            return Err(CarveError::precondition(format!(
                "a {}-row seam cannot be applied to a {}-row image",
                self.0.len(),
                height
            )));
        }
        match self.0.iter().find(|&&x| x >= width) {
            Some(x) => Err(CarveError::precondition(format!(
                "seam column {} is outside a {}-column image",
                x, width
            ))),
            None => Ok(()),
        }
    }
}

impl Index<usize> for Seam {
    type Output = u32;

    fn index(&self, y: usize) -> &u32 {
        &self.0[y]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connected_seams_are_accepted() {
        let seam = Seam::new(vec![2, 3, 3, 2, 1], 4).unwrap();
        assert_eq!(seam.len(), 5);
        assert_eq!(seam[1], 3);
    }

    #[test]
    fn jumps_and_strays_are_rejected() {
        assert!(Seam::new(vec![0, 2, 1], 4).is_err());
        assert!(Seam::new(vec![3, 4], 4).is_err());
    }

    #[test]
    fn seam_energy_sums_the_path() {
        let map = TwoDimensionalMap::from_raw(3, 2, vec![1u8, 2, 3, 4, 5, 6]).unwrap();
        let seam = Seam::new(vec![2, 1], 3).unwrap();
        assert_eq!(seam.energy(&map), 8);
    }

    #[test]
    fn fit_checks_height_and_width() {
        let seam = Seam::new(vec![1, 2], 3).unwrap();
        assert!(seam.check_fits(3, 2).is_ok());
        assert!(seam.check_fits(3, 3).is_err());
        assert!(seam.check_fits(2, 2).is_err());
    }
}
