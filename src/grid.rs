//! Grid builder: particle lattice, UVs, and triangle indices for a hanging cloth.

use crate::config::ClothConfig;
use crate::float::Float;
use crate::particle::Particle;
use crate::transform::Transform;
use crate::vec::{Vec2, Vec3};
use alloc::vec::Vec as AllocVec;

/// The static topology of a cloth, produced once per rebuild.
///
/// Particle at (col, row) has index `col + row * columns`. Local X spans
/// `[-width/2, width/2]` and local Y spans `[0, -height]`, so the cloth hangs
/// down from its anchor.
#[derive(Clone, Debug)]
pub struct GridLayout<F: Float> {
    pub columns: usize,
    pub rows: usize,
    /// Particles at their initial world positions.
    pub particles: AllocVec<Particle<F>>,
    /// Initial positions in the cloth's local space.
    pub local: AllocVec<Vec3<F>>,
    pub uvs: AllocVec<Vec2<F>>,
    /// Triangle list, three indices per triangle.
    pub indices: AllocVec<u32>,
}

impl<F: Float> GridLayout<F> {
    /// Lay out the grid described by `config`, placed by `transform`.
    ///
    /// The config is clamped first, so any resolution is accepted.
    pub fn build(config: &ClothConfig<F>, transform: &Transform<F>) -> Self {
        let config = config.clone().clamped();
        let segs_x = config.horizontal_segments;
        let segs_y = config.vertical_segments;
        let columns = segs_x + 1;
        let rows = segs_y + 1;
        let count = columns * rows;

        let dx = config.width / F::from_usize(segs_x);
        let dy = config.height / F::from_usize(segs_y);
        let half_width = config.width * F::half();

        let mut particles = AllocVec::with_capacity(count);
        let mut local = AllocVec::with_capacity(count);
        let mut uvs = AllocVec::with_capacity(count);

        for y in 0..rows {
            for x in 0..columns {
                let lx = -half_width + F::from_usize(x) * dx;
                let ly = -(F::from_usize(y) * dy);
                let l = Vec3::new(lx, ly, F::zero());
                let world = transform.transform_point(l);

                particles.push(if config.pin_top_edge && y == 0 {
                    Particle::pinned(world)
                } else {
                    Particle::new(world)
                });
                local.push(l);
                uvs.push(Vec2::new(
                    F::from_usize(x) / F::from_usize(segs_x),
                    F::one() - F::from_usize(y) / F::from_usize(segs_y),
                ));
            }
        }

        let mut indices = AllocVec::with_capacity(segs_x * segs_y * 6);
        for y in 0..segs_y {
            for x in 0..segs_x {
                let i = (x + y * columns) as u32;
                let right = i + 1;
                let down = i + columns as u32;
                let down_right = down + 1;
                indices.extend_from_slice(&[i, down_right, down, i, right, down_right]);
            }
        }

        GridLayout { columns, rows, particles, local, uvs, indices }
    }

    pub fn index(&self, col: usize, row: usize) -> usize {
        col + row * self.columns
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
