// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything that can stop a carving run.
//!
//! None of these are recoverable: the run reports the kind, the file
//! or iteration involved, and stops.

use failure::Fail;

/// The failure taxonomy for a carving run.
#[derive(Debug, Fail)]
pub enum CarveError {
    /// Opening, reading or writing an artifact path failed.
    #[fail(display = "cannot access {}: {}", path, reason)]
    IoFailure { path: String, reason: String },

    /// The container was malformed or used a feature we can't decode.
    #[fail(display = "cannot decode {}: {}", path, reason)]
    DecodeFailure { path: String, reason: String },

    /// A raster or table buffer could not be reserved.
    #[fail(display = "cannot allocate {} bytes", bytes)]
    AllocationFailure { bytes: usize },

    /// The image is too narrow (or too short) to carve another seam.
    #[fail(
        display = "iteration {}: a {}x{} image has no interior left to carve",
        iteration, width, height
    )]
    DimensionExhausted {
        iteration: usize,
        width: u32,
        height: u32,
    },

    /// A caller handed us something an operation is not defined for.
    #[fail(display = "{}", reason)]
    PreconditionViolation { reason: String },
}

impl CarveError {
    /// The taxonomy name, for user-facing reports.
    pub fn kind(&self) -> &'static str {
        match self {
            CarveError::IoFailure { .. } => "IOFailure",
            CarveError::DecodeFailure { .. } => "DecodeFailure",
            CarveError::AllocationFailure { .. } => "AllocationFailure",
            CarveError::DimensionExhausted { .. } => "DimensionExhausted",
            CarveError::PreconditionViolation { .. } => "PreconditionViolation",
        }
    }

    pub(crate) fn precondition<S: Into<String>>(reason: S) -> Self {
        CarveError::PreconditionViolation {
            reason: reason.into(),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CarveError>;

/// Reserve a zero-filled buffer of `len` elements, reporting an
/// allocation failure rather than aborting the process.
pub(crate) fn try_filled<T: Clone>(len: usize, fill: T) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| CarveError::AllocationFailure {
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    buf.resize(len, fill);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_name_the_taxonomy() {
        let err = CarveError::DimensionExhausted {
            iteration: 4,
            width: 2,
            height: 9,
        };
        assert_eq!(err.kind(), "DimensionExhausted");
        assert_eq!(
            err.to_string(),
            "iteration 4: a 2x9 image has no interior left to carve"
        );
        assert_eq!(CarveError::precondition("nope").kind(), "PreconditionViolation");
    }

    #[test]
    fn oversized_reservations_are_reported() {
        match try_filled::<u64>(usize::MAX / 2, 0) {
            Err(CarveError::AllocationFailure { .. }) => (),
            other => panic!("expected an allocation failure, got {:?}", other.map(|v| v.len())),
        }
        assert_eq!(try_filled(3, 7u8).unwrap(), vec![7, 7, 7]);
    }
}
