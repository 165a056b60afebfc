// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Find the cheapest vertical seam through an energy map.
//!
//! The search fills a table in which each cell holds the cheapest
//! cumulative energy of any 8-connected path from the top row down to
//! that cell, and the column it came from.  Ties are broken the same
//! way every time, which is what makes sequential and parallel runs
//! agree to the byte:
//!
//! * a cell prefers the parent directly above it;
//! * the upper-left parent replaces it only if strictly cheaper;
//! * the upper-right parent replaces whichever of those holds only if
//!   strictly cheaper;
//! * the seam ends in the leftmost of the cheapest bottom-row cells.

use crate::cq;
use crate::energy::{calculate_energy, EnergyMap};
use crate::errors::{CarveError, Result};
use crate::execution::Execution;
use crate::raster::Raster;
use crate::seam::Seam;
use crate::twodmap::{PathCost, TwoDimensionalMap};

/// This trait defines how we will return seams from an image.  It's a
/// primitive interface, just enough to make room for alternative
/// energy functions as well as caching.
pub trait SeamFinder {
    /// Once a SeamFinder has an image (or whatever it needs to make a
    /// rational decision), request a vertical seam.
    fn find_vertical_seam(&self) -> Result<Seam>;
}

/// The gradient-energy seam engine: an image reference and the
/// execution policy to run the search under.
pub struct GradientSeams<'a> {
    image: &'a Raster,
    execution: Execution,
}

impl<'a> GradientSeams<'a> {
    /// Takes a reference to an image, and holds onto it.
    pub fn new(image: &'a Raster, execution: Execution) -> Self {
        GradientSeams { image, execution }
    }
}

impl<'a> SeamFinder for GradientSeams<'a> {
    fn find_vertical_seam(&self) -> Result<Seam> {
        let energy = calculate_energy(self.image, self.execution)?;
        energy_to_vertical_seam(&energy, self.execution)
    }
}

// The cheapest parent of column `x`, given the finished row above.
#[inline]
fn cheapest_parent(above: &[PathCost], x: usize) -> (u32, usize) {
    let maxwidth = above.len() - 1;
    let mut best = (above[x].cost, x);
    if x > 0 && above[x - 1].cost < best.0 {
        best = (above[x - 1].cost, x - 1);
    }
    if x < maxwidth && above[x + 1].cost < best.0 {
        best = (above[x + 1].cost, x + 1);
    }
    best
}

/// Build the cumulative cost table for an energy map.
///
/// Every cell of a row depends on the whole of the row above, so the
/// rows are filled strictly top to bottom, each one finished before
/// the next is started.  Within a row the cells are independent; in
/// parallel mode the row is cut into one span of columns per worker.
pub fn cumulative_costs(
    energy: &EnergyMap,
    execution: Execution,
) -> Result<TwoDimensionalMap<PathCost>> {
    let (width, height) = (energy.width, energy.height);
    if width == 0 || height == 0 {
        return Err(CarveError::precondition(format!(
            "cannot search a {}x{} energy map for seams",
            width, height
        )));
    }

    let mut target = TwoDimensionalMap::<PathCost>::new(width, height)?;

    // Populate the first row with their native energies.  Its parent
    // pointers are never followed.
    for (x, cell) in target.split_at_row(0).1.iter_mut().enumerate() {
        *cell = PathCost {
            cost: u32::from(energy.row(0)[x]),
            parent: x as u32,
        };
    }

    let span = execution.span(width as usize);
    for y in 1..height {
        let erg = energy.row(y);
        let (above, current) = target.split_at_row(y);
        let above = &above[above.len() - width as usize..];
        execution.for_each_chunk(current, span, |chunk, cells| {
            let offset = chunk * span;
            for (i, cell) in cells.iter_mut().enumerate() {
                let x = offset + i;
                let (cost, parent) = cheapest_parent(above, x);
                *cell = PathCost {
                    cost: cost.saturating_add(u32::from(erg[x])),
                    parent: parent as u32,
                };
            }
        });
    }
    Ok(target)
}

/// Given an energy map, return the list of x-coordinates that, when
/// mapped with the range (0..height), give the XY coordinates for each
/// pixel in the seam to be removed.
pub fn energy_to_vertical_seam(energy: &EnergyMap, execution: Execution) -> Result<Seam> {
    let target = cumulative_costs(energy, execution)?;
    let (width, height) = (target.width, target.height);

    // Find the x coordinate of the bottommost seam with the least
    // energy.  `min_by_key` keeps the first of equal minima, which is
    // the leftmost column.
    let bottom = target.row(height - 1);
    let mut seam_col = (0..width)
        .min_by_key(|&x| bottom[x as usize].cost)
        .unwrap_or(0);

    // Working backwards, generate a vec of x coordinates that map to
    // the seam, reverse and return.
    let mut columns = (0..height)
        .rev()
        .fold(Vec::<u32>::with_capacity(height as usize), |mut acc, y| {
            acc.push(seam_col);
            seam_col = cq!(y == 0, seam_col, target[(seam_col, y)].parent);
            acc
        });
    columns.reverse();
    Ok(Seam::from_backtrack(columns))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENERGY_DATA: [u8; 20] = [9, 9, 0, 9, 9, 9, 1, 9, 8, 9, 9, 9, 9, 9, 0, 9, 9, 9, 0, 9];

    fn energies(width: u32, height: u32, data: &[u8]) -> EnergyMap {
        TwoDimensionalMap::from_raw(width, height, data.to_vec()).unwrap()
    }

    #[test]
    fn energy_grid_to_vertical_seam() {
        let map = energies(5, 4, &ENERGY_DATA);
        let seam = energy_to_vertical_seam(&map, Execution::Sequential).unwrap();
        assert_eq!(seam.columns(), &[2, 3, 4, 3]);
        assert_eq!(seam.energy(&map), 8);
    }

    #[test]
    fn cumulative_costs_follow_the_recurrence() {
        let map = energies(5, 4, &ENERGY_DATA);
        let costs = cumulative_costs(&map, Execution::Sequential).unwrap();
        let row: Vec<u32> = costs.row(1).iter().map(|c| c.cost).collect();
        assert_eq!(row, vec![18, 1, 9, 8, 18]);
        let parents: Vec<u32> = costs.row(1).iter().map(|c| c.parent).collect();
        assert_eq!(parents, vec![0, 2, 2, 2, 4]);
    }

    #[test]
    fn flat_fields_keep_to_the_left() {
        let map = energies(3, 3, &[0; 9]);
        let seam = energy_to_vertical_seam(&map, Execution::Sequential).unwrap();
        assert_eq!(seam.columns(), &[0, 0, 0]);
    }

    #[test]
    fn the_centre_wins_ties_over_the_left() {
        // Row 0 ties at columns 0 and 1; the cell at (1, 1) must come
        // from directly above, and the right neighbour only wins when
        // strictly cheaper.
        let map = energies(3, 2, &[1, 1, 1, 5, 0, 5]);
        let costs = cumulative_costs(&map, Execution::Sequential).unwrap();
        assert_eq!(costs[(1, 1)], PathCost { cost: 1, parent: 1 });
        assert_eq!(costs[(0, 1)], PathCost { cost: 6, parent: 0 });
        assert_eq!(costs[(2, 1)], PathCost { cost: 6, parent: 2 });
    }

    #[test]
    fn right_wins_only_when_strictly_cheaper() {
        let map = energies(3, 2, &[3, 2, 1, 0, 0, 0]);
        let costs = cumulative_costs(&map, Execution::Sequential).unwrap();
        assert_eq!(costs[(0, 1)].parent, 1);
        assert_eq!(costs[(1, 1)].parent, 2);
        assert_eq!(costs[(2, 1)].parent, 2);
    }

    #[test]
    fn parallel_rows_match_sequential_rows() {
        let data: Vec<u8> = (0..20 * 9).map(|i| ((i * 37) % 11) as u8).collect();
        let map = energies(20, 9, &data);
        let sequential = cumulative_costs(&map, Execution::Sequential).unwrap();
        let parallel = cumulative_costs(&map, Execution::with_workers(6)).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn single_columns_are_trivial() {
        let map = energies(1, 4, &[3, 1, 4, 1]);
        let seam = energy_to_vertical_seam(&map, Execution::parallel()).unwrap();
        assert_eq!(seam.columns(), &[0, 0, 0, 0]);
    }

    #[test]
    fn empty_maps_are_refused() {
        let map = energies(0, 3, &[]);
        let err = energy_to_vertical_seam(&map, Execution::Sequential).unwrap_err();
        assert_eq!(err.kind(), "PreconditionViolation");
    }

    #[test]
    fn the_finder_runs_end_to_end() {
        let image = Raster::from_raw(3, 3, 1, vec![7; 9]).unwrap();
        let seam = GradientSeams::new(&image, Execution::Sequential)
            .find_vertical_seam()
            .unwrap();
        assert_eq!(seam.columns(), &[0, 0, 0]);
    }
}
