//! XPBD substep solver for a particle set and its distance constraints.

use crate::collision::resolve_collisions;
use crate::config::ClothConfig;
use crate::constraint::{ConstraintSet, DistanceConstraint};
use crate::float::Float;
use crate::observer::StepObserver;
use crate::particle::{integrate_all, Particle};
use crate::collision::ObstacleCache;
use alloc::vec;
use alloc::vec::Vec as AllocVec;

/// Particles, constraints, and one Lagrange multiplier per constraint.
///
/// Multipliers only live for one substep; nothing but particle positions
/// carries over between ticks.
pub struct XpbdSolver<F: Float> {
    pub particles: AllocVec<Particle<F>>,
    constraints: ConstraintSet<F>,
    lambdas: AllocVec<F>,
}

impl<F: Float> XpbdSolver<F> {
    pub fn new(particles: AllocVec<Particle<F>>, constraints: ConstraintSet<F>) -> Self {
        let lambdas = vec![F::zero(); constraints.len()];
        XpbdSolver { particles, constraints, lambdas }
    }

    /// Advance by `dt`, split into `config.sub_steps` substeps.
    ///
    /// Each substep integrates, clears the multipliers, then runs
    /// `config.iterations` rounds of constraint projection each followed by a
    /// collision pass against the obstacles in `obstacles`.
    pub fn step<O: StepObserver>(
        &mut self,
        dt: F,
        config: &ClothConfig<F>,
        obstacles: &ObstacleCache<F>,
        observer: &mut O,
    ) {
        let sub_steps = config.sub_steps.max(1);
        let h = dt / F::from_usize(sub_steps);
        let inv_h2 = F::one() / (h * h);
        let damping_factor = config.damping_factor();
        let gravity = config.scaled_gravity();
        let circles = if config.collide_circles { obstacles.circles() } else { &[] };
        let spheres = if config.collide_spheres { obstacles.spheres() } else { &[] };

        for sub in 0..sub_steps {
            integrate_all(&mut self.particles, h, damping_factor, gravity);
            observer.on_integrate(sub);

            self.lambdas.iter_mut().for_each(|l| *l = F::zero());
            for i in 0..config.iterations {
                self.project_constraints(inv_h2);
                resolve_collisions(&mut self.particles, circles, spheres, config.collision_margin);
                observer.on_constraint_iteration(i);
            }
        }
    }

    /// Project every constraint once, in declaration order.
    pub fn project_constraints(&mut self, inv_h2: F) {
        for (c, lambda) in self.constraints.iter().zip(self.lambdas.iter_mut()) {
            c.solve(&mut self.particles, lambda, inv_h2);
        }
    }

    pub fn particle_count(&self) -> usize { self.particles.len() }
    pub fn constraint_count(&self) -> usize { self.constraints.len() }
    pub fn constraints(&self) -> &[DistanceConstraint<F>] { self.constraints.as_slice() }
    pub fn particle(&self, index: usize) -> &Particle<F> { &self.particles[index] }
    pub fn particle_mut(&mut self, index: usize) -> &mut Particle<F> { &mut self.particles[index] }

    /// Multipliers as left by the last substep.
    pub fn lambdas(&self) -> &[F] { &self.lambdas }
}
