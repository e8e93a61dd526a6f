//! Configuration for the cloth solver.
//!
//! Every setter clamps its input into the supported range; nothing here can
//! fail. Out-of-range values (including NaN) land on the nearest bound.

use crate::float::Float;
use crate::vec::{Vec, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const MIN_HORIZONTAL_SEGMENTS: usize = 2;
pub const MAX_HORIZONTAL_SEGMENTS: usize = 160;
pub const MIN_VERTICAL_SEGMENTS: usize = 2;
pub const MAX_VERTICAL_SEGMENTS: usize = 240;
pub const MAX_SUBSTEPS: usize = 8;
pub const MAX_SOLVER_ITERATIONS: usize = 24;
pub const MIN_WIDTH: f32 = 0.5;
pub const MIN_HEIGHT: f32 = 1.0;
pub const MIN_COLLISION_MARGIN: f32 = 0.001;
pub const MAX_COLLISION_MARGIN: f32 = 0.2;
pub const MIN_REFRESH_INTERVAL: f32 = 0.05;
pub const MAX_REFRESH_INTERVAL: f32 = 4.0;

/// Configuration for an [`XpbdCloth`](crate::cloth::XpbdCloth).
///
/// Resolution, dimensions, compliance and pinning are read when the cloth is
/// rebuilt. The remaining fields are read on every tick.
///
/// # Builder Pattern
/// ```
/// use drape::config::ClothConfig;
///
/// let config: ClothConfig<f32> = ClothConfig::new()
///     .with_segments(12, 24)
///     .with_size(4.0, 8.0)
///     .with_sub_steps(2)
///     .with_iterations(6)
///     .with_damping(0.02);
/// assert_eq!(config.columns(), 13);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClothConfig<F: Float> {
    /// Quads along the width. Columns = segments + 1. Range [2, 160].
    pub horizontal_segments: usize,
    /// Quads along the height. Rows = segments + 1. Range [2, 240].
    pub vertical_segments: usize,
    /// Local width of the cloth. At least 0.5.
    pub width: F,
    /// Local height of the cloth; it hangs downward from its anchor. At least 1.0.
    pub height: F,
    /// Velocity attenuation per substep, [0, 1]. 0 = no damping.
    pub damping: F,
    /// Gravity acceleration before scaling. Default: (0, -9.81, 0).
    pub gravity: Vec3<F>,
    /// Multiplier on `gravity`.
    pub gravity_scale: F,
    /// Substeps per tick, [1, 8].
    pub sub_steps: usize,
    /// Constraint iterations per substep, [1, 24].
    pub iterations: usize,
    /// Compliance of row/column (stretch) constraints. Non-negative.
    pub stretch_compliance: F,
    /// Compliance of diagonal (shear) constraints. Non-negative.
    pub shear_compliance: F,
    /// Give every particle in the top row zero inverse mass.
    pub pin_top_edge: bool,
    /// Collide against planar (circle) obstacles.
    pub collide_circles: bool,
    /// Collide against spherical obstacles.
    pub collide_spheres: bool,
    /// Extra distance added to every obstacle radius, [0.001, 0.2].
    pub collision_margin: F,
    /// Seconds between obstacle discovery queries, [0.05, 4.0].
    pub collider_refresh_interval: F,
}

impl<F: Float> ClothConfig<F> {
    /// Create a new config with default values.
    pub fn new() -> Self {
        ClothConfig {
            horizontal_segments: 28,
            vertical_segments: 56,
            width: F::from_f32(10.0),
            height: F::from_f32(20.0),
            damping: F::from_f32(0.02),
            gravity: Vec3::new(F::zero(), F::from_f32(-9.81), F::zero()),
            gravity_scale: F::one(),
            sub_steps: 2,
            iterations: 6,
            stretch_compliance: F::from_f32(0.00002),
            shear_compliance: F::from_f32(0.00008),
            pin_top_edge: true,
            collide_circles: true,
            collide_spheres: true,
            collision_margin: F::from_f32(0.015),
            collider_refresh_interval: F::from_f32(0.4),
        }
    }

    pub fn with_segments(mut self, horizontal: usize, vertical: usize) -> Self {
        self.horizontal_segments = horizontal.clamp(MIN_HORIZONTAL_SEGMENTS, MAX_HORIZONTAL_SEGMENTS);
        self.vertical_segments = vertical.clamp(MIN_VERTICAL_SEGMENTS, MAX_VERTICAL_SEGMENTS);
        self
    }

    /// Non-finite dimensions fall back to the minimum.
    pub fn with_size(mut self, width: F, height: F) -> Self {
        self.width = at_least_finite(width, F::from_f32(MIN_WIDTH));
        self.height = at_least_finite(height, F::from_f32(MIN_HEIGHT));
        self
    }

    pub fn with_damping(mut self, damping: F) -> Self {
        self.damping = damping.clamp01();
        self
    }

    pub fn with_gravity(mut self, gravity: Vec3<F>) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_gravity_scale(mut self, scale: F) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_sub_steps(mut self, sub_steps: usize) -> Self {
        self.sub_steps = sub_steps.clamp(1, MAX_SUBSTEPS);
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations.clamp(1, MAX_SOLVER_ITERATIONS);
        self
    }

    pub fn with_compliance(mut self, stretch: F, shear: F) -> Self {
        self.stretch_compliance = stretch.max(F::zero());
        self.shear_compliance = shear.max(F::zero());
        self
    }

    pub fn with_pin_top_edge(mut self, pin: bool) -> Self {
        self.pin_top_edge = pin;
        self
    }

    pub fn with_collisions(mut self, circles: bool, spheres: bool) -> Self {
        self.collide_circles = circles;
        self.collide_spheres = spheres;
        self
    }

    pub fn with_collision_margin(mut self, margin: F) -> Self {
        self.collision_margin = margin.clamp(
            F::from_f32(MIN_COLLISION_MARGIN),
            F::from_f32(MAX_COLLISION_MARGIN),
        );
        self
    }

    pub fn with_refresh_interval(mut self, seconds: F) -> Self {
        self.collider_refresh_interval = seconds.clamp(
            F::from_f32(MIN_REFRESH_INTERVAL),
            F::from_f32(MAX_REFRESH_INTERVAL),
        );
        self
    }

    /// Re-apply every clamp. Used when a config arrives with its fields set directly.
    pub fn clamped(self) -> Self {
        let (h, v) = (self.horizontal_segments, self.vertical_segments);
        let (w, ht) = (self.width, self.height);
        let (stretch, shear) = (self.stretch_compliance, self.shear_compliance);
        let (damping, subs, iters) = (self.damping, self.sub_steps, self.iterations);
        let (margin, interval) = (self.collision_margin, self.collider_refresh_interval);
        self.with_segments(h, v)
            .with_size(w, ht)
            .with_compliance(stretch, shear)
            .with_damping(damping)
            .with_sub_steps(subs)
            .with_iterations(iters)
            .with_collision_margin(margin)
            .with_refresh_interval(interval)
    }

    /// Particle columns, `horizontal_segments + 1`.
    pub fn columns(&self) -> usize {
        self.horizontal_segments + 1
    }

    /// Particle rows, `vertical_segments + 1`.
    pub fn rows(&self) -> usize {
        self.vertical_segments + 1
    }

    /// Per-substep velocity multiplier, `clamp01(1 - damping)`.
    pub fn damping_factor(&self) -> F {
        (F::one() - self.damping).clamp01()
    }

    /// Gravity after scaling.
    pub fn scaled_gravity(&self) -> Vec3<F> {
        self.gravity.scale(self.gravity_scale)
    }

    /// True when switching from `self` to `other` changes what a rebuild produces.
    pub fn topology_differs(&self, other: &Self) -> bool {
        self.horizontal_segments != other.horizontal_segments
            || self.vertical_segments != other.vertical_segments
            || self.width != other.width
            || self.height != other.height
            || self.stretch_compliance != other.stretch_compliance
            || self.shear_compliance != other.shear_compliance
            || self.pin_top_edge != other.pin_top_edge
    }
}

fn at_least_finite<F: Float>(value: F, min: F) -> F {
    if value.is_finite() { value.max(min) } else { min }
}

impl<F: Float> Default for ClothConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp_into_range() {
        let c: ClothConfig<f32> = ClothConfig::new()
            .with_segments(0, 1000)
            .with_size(0.1, -5.0)
            .with_sub_steps(0)
            .with_iterations(99)
            .with_damping(1.5)
            .with_collision_margin(1.0)
            .with_refresh_interval(0.0)
            .with_compliance(-1.0, 0.5);
        assert_eq!(c.horizontal_segments, 2);
        assert_eq!(c.vertical_segments, 240);
        assert_eq!(c.width, 0.5);
        assert_eq!(c.height, 1.0);
        assert_eq!(c.sub_steps, 1);
        assert_eq!(c.iterations, 24);
        assert_eq!(c.damping, 1.0);
        assert_eq!(c.collision_margin, 0.2);
        assert_eq!(c.collider_refresh_interval, 0.05);
        assert_eq!(c.stretch_compliance, 0.0);
        assert_eq!(c.shear_compliance, 0.5);
    }

    #[test]
    fn clamped_repairs_direct_field_writes() {
        let mut c: ClothConfig<f32> = ClothConfig::new();
        c.sub_steps = 40;
        c.width = f32::NAN;
        let c = c.clamped();
        assert_eq!(c.sub_steps, 8);
        assert_eq!(c.width, 0.5);
    }

    #[test]
    fn infinite_size_falls_back_to_minimum() {
        let c: ClothConfig<f32> = ClothConfig::new().with_size(f32::INFINITY, f32::NEG_INFINITY);
        assert_eq!(c.width, 0.5);
        assert_eq!(c.height, 1.0);

        let mut d: ClothConfig<f64> = ClothConfig::new();
        d.height = f64::INFINITY;
        assert_eq!(d.clamped().height, 1.0);
    }

    #[test]
    fn damping_factor_complements_damping() {
        let c: ClothConfig<f32> = ClothConfig::new().with_damping(0.25);
        assert!((c.damping_factor() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn dynamics_changes_do_not_require_rebuild() {
        let a: ClothConfig<f32> = ClothConfig::new();
        let b = a.clone().with_damping(0.5).with_iterations(12);
        assert!(!a.topology_differs(&b));
        let c = a.clone().with_segments(4, 4);
        assert!(a.topology_differs(&c));
    }
}
