//! Cloth particles and the damped Verlet integrator.

use crate::float::Float;
use crate::vec::{Vec, Vec3};

/// A Verlet particle: position-based dynamics with implicit velocity.
///
/// `inv_mass == 0` marks a pinned particle that nothing moves.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle<F: Float> {
    pub pos: Vec3<F>,
    pub prev_pos: Vec3<F>,
    pub inv_mass: F,
}

impl<F: Float> Particle<F> {
    /// A free particle with unit mass.
    pub fn new(pos: Vec3<F>) -> Self {
        Particle { pos, prev_pos: pos, inv_mass: F::one() }
    }

    pub fn pinned(pos: Vec3<F>) -> Self {
        Particle { pos, prev_pos: pos, inv_mass: F::zero() }
    }

    pub fn is_pinned(&self) -> bool {
        self.inv_mass <= F::zero()
    }

    /// Advance one substep of length `h`.
    ///
    /// The implicit velocity is multiplied by `damping_factor` every substep,
    /// so damping compounds with the substep count.
    pub fn integrate(&mut self, h: F, damping_factor: F, gravity: Vec3<F>) {
        if self.is_pinned() {
            return;
        }
        let velocity = (self.pos - self.prev_pos).scale(damping_factor);
        self.prev_pos = self.pos;
        self.pos = self.pos + velocity + gravity.scale(h * h);
    }

    pub fn pin(&mut self) {
        self.inv_mass = F::zero();
        self.prev_pos = self.pos;
    }

    pub fn unpin(&mut self) {
        self.inv_mass = F::one();
        self.prev_pos = self.pos;
    }

    /// Teleport a pinned particle. Leaves no implicit velocity behind.
    pub fn move_to(&mut self, pos: Vec3<F>) {
        self.pos = pos;
        self.prev_pos = pos;
    }
}

/// Integrate every particle for one substep.
pub fn integrate_all<F: Float>(particles: &mut [Particle<F>], h: F, damping_factor: F, gravity: Vec3<F>) {
    for p in particles.iter_mut() {
        p.integrate(h, damping_factor, gravity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_particle_ignores_gravity() {
        let mut p = Particle::pinned(Vec3::new(1.0f32, 2.0, 3.0));
        p.integrate(1.0 / 60.0, 1.0, Vec3::new(0.0, -1000.0, 0.0));
        assert_eq!(p.pos, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn first_substep_falls_by_g_h_squared() {
        let mut p = Particle::new(Vec3::new(0.0f32, 0.0, 0.0));
        p.integrate(0.1, 1.0, Vec3::new(0.0, -10.0, 0.0));
        assert!((p.pos.y + 0.1).abs() < 1e-6, "y = {}", p.pos.y);
        assert_eq!(p.prev_pos, Vec3::zero());
    }

    #[test]
    fn damping_attenuates_carried_velocity() {
        let mut p = Particle::new(Vec3::new(1.0f32, 0.0, 0.0));
        p.prev_pos = Vec3::zero();
        p.integrate(0.1, 0.5, Vec3::zero());
        assert!((p.pos.x - 1.5).abs() < 1e-6, "x = {}", p.pos.x);
    }
}
