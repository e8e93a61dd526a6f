//! Error types for indexed cloth operations.
//!
//! The simulation itself never fails; only caller requests that name a
//! specific particle can be rejected.

use core::fmt;

/// Errors returned by [`XpbdCloth`](crate::cloth::XpbdCloth) pin operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ClothError {
    /// The cloth has no topology yet; call `rebuild` first.
    NotBuilt,
    /// Particle index is out of bounds.
    ParticleOutOfBounds { index: usize, count: usize },
    /// Only pinned particles can be moved directly.
    NotPinned { index: usize },
}

impl fmt::Display for ClothError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClothError::NotBuilt => write!(f, "cloth has not been built"),
            ClothError::ParticleOutOfBounds { index, count } => {
                write!(f, "particle index {} out of bounds (count: {})", index, count)
            }
            ClothError::NotPinned { index } => write!(f, "particle {} is not pinned", index),
        }
    }
}
