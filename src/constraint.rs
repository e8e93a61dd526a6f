//! Compliant distance constraints and the stretch/shear set derived from a grid.

use crate::float::Float;
use crate::grid::GridLayout;
use crate::particle::Particle;
use crate::vec::Vec;
use alloc::vec::Vec as AllocVec;

/// Which grid edge a constraint came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Along a row or column; resists stretch.
    Structural,
    /// Across a quad diagonal; resists skew.
    Shear,
}

/// Keeps two particles at `rest_length`, softened by `compliance`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DistanceConstraint<F: Float> {
    pub a: usize,
    pub b: usize,
    pub rest_length: F,
    /// Inverse stiffness. Zero is rigid.
    pub compliance: F,
    pub kind: ConstraintKind,
}

impl<F: Float> DistanceConstraint<F> {
    pub fn new(a: usize, b: usize, rest_length: F, compliance: F, kind: ConstraintKind) -> Self {
        DistanceConstraint { a, b, rest_length, compliance, kind }
    }

    /// Measure the rest length from the particles' current positions.
    pub fn from_particles(
        a: usize,
        b: usize,
        particles: &[Particle<F>],
        compliance: F,
        kind: ConstraintKind,
    ) -> Self {
        let rest_length = particles[a].pos.distance(particles[b].pos);
        DistanceConstraint { a, b, rest_length, compliance, kind }
    }

    /// One XPBD projection.
    ///
    /// `lambda` is this constraint's multiplier accumulated within the
    /// current substep and `inv_h2` is `1 / h²`. Returns the multiplier
    /// increment, or zero when the constraint was skipped.
    pub fn solve(&self, particles: &mut [Particle<F>], lambda: &mut F, inv_h2: F) -> F {
        let w0 = particles[self.a].inv_mass;
        let w1 = particles[self.b].inv_mass;
        let w = w0 + w1;
        if w <= F::zero() {
            return F::zero(); // both pinned
        }

        let d = particles[self.a].pos - particles[self.b].pos;
        let len = d.length();
        if len < F::from_f32(1e-6) {
            return F::zero(); // degenerate
        }

        let n = d.scale(F::one() / len);
        let c = len - self.rest_length;
        let alpha = self.compliance * inv_h2;
        let delta_lambda = (-c - alpha * *lambda) / (w + alpha);
        *lambda = *lambda + delta_lambda;

        if w0 > F::zero() {
            particles[self.a].pos = particles[self.a].pos + n.scale(delta_lambda * w0);
        }
        if w1 > F::zero() {
            particles[self.b].pos = particles[self.b].pos - n.scale(delta_lambda * w1);
        }
        delta_lambda
    }
}

/// The full constraint list of a cloth, in projection order.
#[derive(Clone, Debug, Default)]
pub struct ConstraintSet<F: Float> {
    constraints: AllocVec<DistanceConstraint<F>>,
}

impl<F: Float> ConstraintSet<F> {
    /// Derive stretch and shear constraints from a freshly built grid.
    ///
    /// For each particle in row-major order: right neighbour, lower
    /// neighbour, then both diagonals of the quad it anchors. Rest lengths
    /// are measured from the initial world positions.
    #[tracing::instrument(level = "trace", skip_all, fields(columns = grid.columns, rows = grid.rows))]
    pub fn from_grid(grid: &GridLayout<F>, stretch_compliance: F, shear_compliance: F) -> Self {
        let columns = grid.columns;
        let rows = grid.rows;
        let count = (columns - 1) * rows + columns * (rows - 1) + 2 * (columns - 1) * (rows - 1);
        let particles = &grid.particles;
        let mut constraints = AllocVec::with_capacity(count);

        for y in 0..rows {
            for x in 0..columns {
                let i = grid.index(x, y);
                let has_right = x + 1 < columns;
                let has_down = y + 1 < rows;
                if has_right {
                    constraints.push(DistanceConstraint::from_particles(
                        i, i + 1, particles, stretch_compliance, ConstraintKind::Structural,
                    ));
                }
                if has_down {
                    constraints.push(DistanceConstraint::from_particles(
                        i, i + columns, particles, stretch_compliance, ConstraintKind::Structural,
                    ));
                }
                if has_right && has_down {
                    constraints.push(DistanceConstraint::from_particles(
                        i, i + columns + 1, particles, shear_compliance, ConstraintKind::Shear,
                    ));
                    constraints.push(DistanceConstraint::from_particles(
                        i + 1, i + columns, particles, shear_compliance, ConstraintKind::Shear,
                    ));
                }
            }
        }

        ConstraintSet { constraints }
    }

    pub fn push(&mut self, constraint: DistanceConstraint<F>) {
        self.constraints.push(constraint);
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn as_slice(&self) -> &[DistanceConstraint<F>] {
        &self.constraints
    }

    pub fn iter(&self) -> core::slice::Iter<'_, DistanceConstraint<F>> {
        self.constraints.iter()
    }

    pub fn count_of(&self, kind: ConstraintKind) -> usize {
        self.constraints.iter().filter(|c| c.kind == kind).count()
    }
}
