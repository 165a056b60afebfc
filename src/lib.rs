// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Content-aware image narrowing.
//!
//! Repeatedly find the vertical seam of least gradient energy through
//! an image and cut it out, one column per iteration.  Every stage runs
//! either on the calling thread or across a fixed pool of workers, and
//! both give the same answer to the byte.

// #![deny(missing_docs)]

mod ternary;

pub mod artifacts;
pub mod codec;
pub mod energy;
pub mod errors;
pub mod execution;
pub mod raster;
pub mod seam;
pub mod seamcarver;
pub mod seamfinder;
pub mod twodmap;

pub use artifacts::PngArtifacts;
pub use energy::{calculate_energy, EnergyMap};
pub use errors::{CarveError, Result};
pub use execution::Execution;
pub use raster::Raster;
pub use seam::Seam;
pub use seamcarver::{
    highlight_vertical_seam, remove_vertical_seam, ArtifactSink, CarveState, DiscardArtifacts,
    SeamCarver,
};
pub use seamfinder::{cumulative_costs, energy_to_vertical_seam, GradientSeams, SeamFinder};
