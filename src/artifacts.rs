// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Naming and writing the per-iteration image files.
//!
//! Every artifact is named `{dir}/{base}_{iteration}.png`, with a
//! zero-based iteration index and `base` taken from the input file's
//! stem.  The directories must already exist.

use crate::codec::{encode, encode_energy};
use crate::energy::EnergyMap;
use crate::errors::Result;
use crate::execution::Execution;
use crate::raster::Raster;
use crate::seamcarver::ArtifactSink;
use std::path::{Path, PathBuf};

/// Default directory for highlighted-seam snapshots.
pub const HIGHLIGHTED_SEAMS: &str = "highlighted_seams";
/// Default directory for narrowed outputs.
pub const OUTPUTS: &str = "outputs";
/// Conventional directory for energy-map snapshots.
pub const ENERGY_MAPS: &str = "energy_maps";

const EXTENSION: &str = "png";

/// The path of one artifact.
pub fn artifact_path(dir: &Path, base: &str, iteration: usize) -> PathBuf {
    dir.join(format!("{}_{}.{}", base, iteration, EXTENSION))
}

/// An artifact sink that writes PNG files into directories.
#[derive(Debug, Clone)]
pub struct PngArtifacts {
    base: String,
    highlighted: PathBuf,
    outputs: PathBuf,
    energy: Option<PathBuf>,
    execution: Execution,
    last_output: Option<PathBuf>,
}

impl PngArtifacts {
    /// Write artifacts named after `input` into the two given
    /// directories.  Energy maps are not written unless asked for.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        input: &Path,
        highlighted: P,
        outputs: Q,
        execution: Execution,
    ) -> Self {
        let base = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        PngArtifacts {
            base,
            highlighted: highlighted.as_ref().to_path_buf(),
            outputs: outputs.as_ref().to_path_buf(),
            energy: None,
            execution,
            last_output: None,
        }
    }

    /// Also write each iteration's energy map into `dir`.
    pub fn with_energy_maps<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.energy = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// The most recently completed narrowed output, if any.
    pub fn last_output(&self) -> Option<&Path> {
        self.last_output.as_deref()
    }
}

impl ArtifactSink for PngArtifacts {
    fn highlighted(&mut self, iteration: usize, image: &Raster) -> Result<()> {
        let path = artifact_path(&self.highlighted, &self.base, iteration);
        encode(&path, image, self.execution)
    }

    fn narrowed(&mut self, iteration: usize, image: &Raster) -> Result<()> {
        let path = artifact_path(&self.outputs, &self.base, iteration);
        encode(&path, image, self.execution)?;
        self.last_output = Some(path);
        Ok(())
    }

    fn energy(&mut self, iteration: usize, energy: &EnergyMap) -> Result<()> {
        match &self.energy {
            Some(dir) => encode_energy(&artifact_path(dir, &self.base, iteration), energy),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_the_input_stem() {
        let sink = PngArtifacts::new(
            Path::new("photos/input.png"),
            HIGHLIGHTED_SEAMS,
            OUTPUTS,
            Execution::Sequential,
        );
        assert_eq!(sink.base(), "input");
        assert_eq!(
            artifact_path(Path::new(OUTPUTS), sink.base(), 0),
            PathBuf::from("outputs/input_0.png")
        );
        assert_eq!(
            artifact_path(Path::new(HIGHLIGHTED_SEAMS), "tower", 12),
            PathBuf::from("highlighted_seams/tower_12.png")
        );
    }

    #[test]
    fn artifacts_land_in_their_directories() {
        let dir = tempfile::tempdir().unwrap();
        let (seams, outputs, energy) = (
            dir.path().join(HIGHLIGHTED_SEAMS),
            dir.path().join(OUTPUTS),
            dir.path().join(ENERGY_MAPS),
        );
        for d in &[&seams, &outputs, &energy] {
            std::fs::create_dir(d).unwrap();
        }
        let mut sink = PngArtifacts::new(Path::new("tower.png"), &seams, &outputs, Execution::Sequential)
            .with_energy_maps(&energy);
        let image = Raster::new(4, 3, 3).unwrap();
        sink.highlighted(2, &image).unwrap();
        sink.narrowed(2, &image).unwrap();
        sink.energy(2, &EnergyMap::new(4, 3).unwrap()).unwrap();

        assert!(seams.join("tower_2.png").is_file());
        assert!(energy.join("tower_2.png").is_file());
        assert_eq!(sink.last_output(), Some(outputs.join("tower_2.png").as_path()));
    }

    #[test]
    fn missing_directories_are_io_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = PngArtifacts::new(
            Path::new("tower.png"),
            dir.path().join("absent"),
            dir.path().join("absent"),
            Execution::Sequential,
        );
        let err = sink.narrowed(0, &Raster::new(3, 3, 3).unwrap()).unwrap_err();
        assert_eq!(err.kind(), "IOFailure");
        assert_eq!(sink.last_output(), None);
    }
}
