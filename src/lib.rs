//! Extended position-based dynamics (XPBD) cloth for games.
//!
//! `drape` simulates a hanging rectangle of cloth as a grid of particles held
//! together by compliant distance constraints, pushes it out of round
//! obstacles, and writes a deformed triangle mesh every frame.
//!
//! # Features
//!
//! - **XPBD constraints**: stretch and shear edges with per-substep Lagrange
//!   multipliers, so compliance behaves the same at any iteration count
//! - **Substepping**: damped Verlet integration split across substeps
//! - **Obstacles**: planar circles and spheres from any world through
//!   `ObstacleQuery`, re-discovered on a throttle
//! - **Mesh output**: local-space vertices, area-weighted normals, bounds
//! - **Observable**: Monitor ticks via the `StepObserver` trait
//! - **`no_std` compatible**: Works in embedded and WASM environments

#![no_std]

extern crate alloc;

pub mod float;
pub mod vec;
pub mod transform;
pub mod particle;
pub mod grid;
pub mod constraint;
pub mod collision;
pub mod solver;
pub mod mesh;
pub mod cloth;
pub mod observer;
pub mod config;
pub mod error;

// Re-export primary API
pub use float::Float;
pub use vec::{Vec, Vec2, Vec3};
pub use transform::{Quat, Transform};
pub use particle::Particle;
pub use grid::GridLayout;
pub use constraint::{ConstraintKind, ConstraintSet, DistanceConstraint};
pub use collision::{NoObstacles, Obstacle, ObstacleCache, ObstacleFamily, ObstacleId, ObstacleQuery, ObstacleSet};
pub use solver::XpbdSolver;
pub use mesh::{Bounds, ClothMesh};
pub use cloth::XpbdCloth;
pub use config::ClothConfig;
pub use observer::{StepObserver, NoOpStepObserver};
pub use error::ClothError;
