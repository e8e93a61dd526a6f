//! Placement transform for the cloth: translation, rotation, scale.
//!
//! Particles are simulated in world space; the mesh is written in the
//! cloth's local space. `Transform` carries the mapping between the two.

use crate::float::Float;
use crate::vec::{Vec, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unit quaternion rotation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Quat<F: Float> {
    pub x: F,
    pub y: F,
    pub z: F,
    pub w: F,
}

impl<F: Float> Quat<F> {
    pub fn identity() -> Self {
        Quat { x: F::zero(), y: F::zero(), z: F::zero(), w: F::one() }
    }

    /// Rotation of `angle` radians about `axis`. A zero axis gives the identity.
    pub fn from_axis_angle(axis: Vec3<F>, angle: F) -> Self {
        let axis = axis.normalize();
        if axis == Vec3::zero() {
            return Self::identity();
        }
        let half = angle * F::half();
        let s = half.sin();
        Quat { x: axis.x * s, y: axis.y * s, z: axis.z * s, w: half.cos() }
    }

    pub fn conjugate(self) -> Self {
        Quat { x: -self.x, y: -self.y, z: -self.z, w: self.w }
    }

    /// Rotate a vector: `v' = v + 2w(q × v) + 2q × (q × v)`.
    pub fn rotate(self, v: Vec3<F>) -> Vec3<F> {
        let q = Vec3::new(self.x, self.y, self.z);
        let two = F::one() + F::one();
        let t = q.cross(v).scale(two);
        v + t.scale(self.w) + q.cross(t)
    }
}

impl<F: Float> Default for Quat<F> {
    fn default() -> Self {
        Self::identity()
    }
}

/// Translation-rotation-scale transform, applied scale first.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transform<F: Float> {
    pub translation: Vec3<F>,
    pub rotation: Quat<F>,
    pub scale: Vec3<F>,
}

impl<F: Float> Transform<F> {
    pub fn identity() -> Self {
        Transform { translation: Vec3::zero(), rotation: Quat::identity(), scale: Vec3::one() }
    }

    pub fn from_translation(translation: Vec3<F>) -> Self {
        Transform { translation, ..Self::identity() }
    }

    pub fn with_rotation(mut self, rotation: Quat<F>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3<F>) -> Self {
        self.scale = scale;
        self
    }

    /// Local point to world point.
    pub fn transform_point(&self, local: Vec3<F>) -> Vec3<F> {
        self.rotation.rotate(local.component_mul(self.scale)) + self.translation
    }

    /// World point to local point. Zero scale axes collapse to zero.
    pub fn inverse_transform_point(&self, world: Vec3<F>) -> Vec3<F> {
        let unrotated = self.rotation.conjugate().rotate(world - self.translation);
        Vec3::new(
            safe_div(unrotated.x, self.scale.x),
            safe_div(unrotated.y, self.scale.y),
            safe_div(unrotated.z, self.scale.z),
        )
    }
}

impl<F: Float> Default for Transform<F> {
    fn default() -> Self {
        Self::identity()
    }
}

fn safe_div<F: Float>(n: F, d: F) -> F {
    if d.is_near_zero(F::from_f32(1e-12)) { F::zero() } else { n / d }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3<f32>, b: Vec3<f32>) -> bool {
        a.distance(b) < 1e-5
    }

    #[test]
    fn quarter_turn_about_z() {
        let q = Quat::from_axis_angle(Vec3::new(0.0f32, 0.0, 1.0), core::f32::consts::FRAC_PI_2);
        let r = q.rotate(Vec3::new(1.0, 0.0, 0.0));
        assert!(close(r, Vec3::new(0.0, 1.0, 0.0)), "got {:?}", r);
    }

    #[test]
    fn inverse_undoes_forward() {
        let t = Transform::from_translation(Vec3::new(1.0f32, 2.0, -3.0))
            .with_rotation(Quat::from_axis_angle(Vec3::new(0.3, 1.0, 0.2), 0.7))
            .with_scale(Vec3::new(2.0, 0.5, 1.5));
        let p = Vec3::new(-0.4f32, 3.0, 0.25);
        let back = t.inverse_transform_point(t.transform_point(p));
        assert!(close(back, p), "got {:?}", back);
    }

    #[test]
    fn identity_is_noop() {
        let t = Transform::<f32>::identity();
        let p = Vec3::new(4.0, -1.0, 2.0);
        assert_eq!(t.transform_point(p), p);
        assert_eq!(t.inverse_transform_point(p), p);
    }
}
