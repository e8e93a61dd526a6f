//! Round obstacles, the throttled obstacle cache, and positional push-out.
//!
//! Obstacles come from an external world through [`ObstacleQuery`]. The
//! cloth only asks the world *which* obstacles exist every
//! `collider_refresh_interval` seconds; where they are is re-read every tick,
//! so moving obstacles are followed while appearance and disappearance lag by
//! up to one refresh interval.

use crate::float::Float;
use crate::particle::Particle;
use crate::vec::{Vec, Vec3};
use alloc::vec::Vec as AllocVec;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The two obstacle families the solver collides against.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObstacleFamily {
    /// Collides in the world XY plane only; z is left alone.
    Circle,
    /// Collides in all three axes.
    Sphere,
}

/// Stable handle for an obstacle owned by the external world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObstacleId(pub u64);

/// A read-only view of one round obstacle, in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Obstacle<F: Float> {
    pub center: Vec3<F>,
    /// Radius before scaling.
    pub radius: F,
    /// World scale of the obstacle's transform.
    pub scale: Vec3<F>,
    pub enabled: bool,
    pub active: bool,
}

impl<F: Float> Obstacle<F> {
    /// An enabled, active, unscaled obstacle.
    pub fn new(center: Vec3<F>, radius: F) -> Self {
        Obstacle { center, radius, scale: Vec3::one(), enabled: true, active: true }
    }

    pub fn with_scale(mut self, scale: Vec3<F>) -> Self {
        self.scale = scale;
        self
    }

    pub fn is_live(&self) -> bool {
        self.enabled && self.active
    }

    /// Largest absolute scale component the family can see.
    pub fn effective_scale(&self, family: ObstacleFamily) -> F {
        match family {
            ObstacleFamily::Circle => self.scale.xy().max_abs_component(),
            ObstacleFamily::Sphere => self.scale.max_abs_component(),
        }
    }

    /// Distance from `center` that particles are pushed out to.
    pub fn contact_radius(&self, family: ObstacleFamily, margin: F) -> F {
        self.radius * self.effective_scale(family) + margin
    }
}

/// The world the cloth collides with.
pub trait ObstacleQuery<F: Float> {
    /// Append the handle of every obstacle of `family` that currently exists.
    fn discover(&mut self, family: ObstacleFamily, out: &mut AllocVec<ObstacleId>);

    /// Current geometry of a previously discovered obstacle, or `None` if it is gone.
    fn resolve(&self, family: ObstacleFamily, id: ObstacleId) -> Option<Obstacle<F>>;
}

/// A world with nothing in it.
pub struct NoObstacles;

impl<F: Float> ObstacleQuery<F> for NoObstacles {
    fn discover(&mut self, _family: ObstacleFamily, _out: &mut AllocVec<ObstacleId>) {}

    fn resolve(&self, _family: ObstacleFamily, _id: ObstacleId) -> Option<Obstacle<F>> {
        None
    }
}

/// A simple in-memory obstacle world.
///
/// Ids are never reused, so a removed obstacle stays gone even while a cloth
/// still holds its handle.
#[derive(Clone, Debug, Default)]
pub struct ObstacleSet<F: Float> {
    slots: AllocVec<Option<(ObstacleFamily, Obstacle<F>)>>,
}

impl<F: Float> ObstacleSet<F> {
    pub fn new() -> Self {
        ObstacleSet { slots: AllocVec::new() }
    }

    pub fn insert(&mut self, family: ObstacleFamily, obstacle: Obstacle<F>) -> ObstacleId {
        self.slots.push(Some((family, obstacle)));
        ObstacleId((self.slots.len() - 1) as u64)
    }

    pub fn remove(&mut self, id: ObstacleId) -> Option<Obstacle<F>> {
        self.slots
            .get_mut(id.0 as usize)
            .and_then(|slot| slot.take())
            .map(|(_, obstacle)| obstacle)
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle<F>> {
        match self.slots.get(id.0 as usize) {
            Some(Some((_, obstacle))) => Some(obstacle),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: ObstacleId) -> Option<&mut Obstacle<F>> {
        match self.slots.get_mut(id.0 as usize) {
            Some(Some((_, obstacle))) => Some(obstacle),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<F: Float> ObstacleQuery<F> for ObstacleSet<F> {
    fn discover(&mut self, family: ObstacleFamily, out: &mut AllocVec<ObstacleId>) {
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some((f, _)) = slot {
                if *f == family {
                    out.push(ObstacleId(i as u64));
                }
            }
        }
    }

    fn resolve(&self, family: ObstacleFamily, id: ObstacleId) -> Option<Obstacle<F>> {
        match self.slots.get(id.0 as usize) {
            Some(Some((f, obstacle))) if *f == family => Some(*obstacle),
            _ => None,
        }
    }
}

/// Obstacle handles discovered at the last refresh, plus the refresh clock.
///
/// The clock only counts time since the last refresh, so it never grows large
/// enough for `dt` to vanish in rounding.
#[derive(Clone, Debug)]
pub struct ObstacleCache<F: Float> {
    circle_ids: AllocVec<ObstacleId>,
    sphere_ids: AllocVec<ObstacleId>,
    circles: AllocVec<Obstacle<F>>,
    spheres: AllocVec<Obstacle<F>>,
    since_refresh: F,
    refreshed_once: bool,
}

impl<F: Float> ObstacleCache<F> {
    /// An empty cache whose first refresh is due immediately.
    pub fn new() -> Self {
        ObstacleCache {
            circle_ids: AllocVec::new(),
            sphere_ids: AllocVec::new(),
            circles: AllocVec::new(),
            spheres: AllocVec::new(),
            since_refresh: F::zero(),
            refreshed_once: false,
        }
    }

    /// Re-discover obstacles if the refresh is due, then advance the clock by `dt`.
    ///
    /// Returns the number of cached handles when a refresh happened.
    pub fn advance<Q: ObstacleQuery<F>>(
        &mut self,
        dt: F,
        interval: F,
        circles_enabled: bool,
        spheres_enabled: bool,
        query: &mut Q,
    ) -> Option<usize> {
        let refreshed = if !self.refreshed_once || self.since_refresh >= interval {
            self.circle_ids.clear();
            self.sphere_ids.clear();
            if circles_enabled {
                query.discover(ObstacleFamily::Circle, &mut self.circle_ids);
            }
            if spheres_enabled {
                query.discover(ObstacleFamily::Sphere, &mut self.sphere_ids);
            }
            self.since_refresh = F::zero();
            self.refreshed_once = true;
            tracing::trace!(
                circles = self.circle_ids.len(),
                spheres = self.sphere_ids.len(),
                "refreshed obstacle cache"
            );
            Some(self.circle_ids.len() + self.sphere_ids.len())
        } else {
            None
        };
        self.since_refresh = self.since_refresh + dt;
        refreshed
    }

    /// Read the current geometry of every cached handle. Missing, disabled
    /// and inactive obstacles are dropped from this tick's view.
    pub fn snapshot<Q: ObstacleQuery<F>>(&mut self, query: &Q) {
        self.circles.clear();
        self.spheres.clear();
        for &id in &self.circle_ids {
            if let Some(o) = query.resolve(ObstacleFamily::Circle, id).filter(|o| o.is_live()) {
                self.circles.push(o);
            }
        }
        for &id in &self.sphere_ids {
            if let Some(o) = query.resolve(ObstacleFamily::Sphere, id).filter(|o| o.is_live()) {
                self.spheres.push(o);
            }
        }
    }

    pub fn circles(&self) -> &[Obstacle<F>] {
        &self.circles
    }

    pub fn spheres(&self) -> &[Obstacle<F>] {
        &self.spheres
    }

    pub fn cached_handles(&self) -> usize {
        self.circle_ids.len() + self.sphere_ids.len()
    }
}

impl<F: Float> Default for ObstacleCache<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Move `p` onto the surface of the ball around `center` if it is strictly inside.
///
/// A point sitting exactly on the center has no push direction and is left alone.
pub fn push_out<V: Vec>(p: V, center: V, radius: V::Scalar) -> Option<V> {
    let d = p - center;
    let dist = d.length();
    if dist < radius && dist > V::Scalar::from_f32(1e-6) {
        let n = d.scale(V::Scalar::one() / dist);
        Some(center + n.scale(radius))
    } else {
        None
    }
}

/// One collision pass over every free particle.
///
/// All circles are processed first, then all spheres. Each correction is
/// applied immediately, so later obstacles see the already-moved particle.
pub fn resolve_collisions<F: Float>(
    particles: &mut [Particle<F>],
    circles: &[Obstacle<F>],
    spheres: &[Obstacle<F>],
    margin: F,
) {
    let margin = margin.max(F::zero());

    if !circles.is_empty() {
        for p in particles.iter_mut() {
            if p.is_pinned() {
                continue;
            }
            for o in circles {
                let radius = o.contact_radius(ObstacleFamily::Circle, margin);
                if let Some(c) = push_out(p.pos.xy(), o.center.xy(), radius) {
                    p.pos.x = c.x;
                    p.pos.y = c.y;
                }
            }
        }
    }

    if !spheres.is_empty() {
        for p in particles.iter_mut() {
            if p.is_pinned() {
                continue;
            }
            for o in spheres {
                let radius = o.contact_radius(ObstacleFamily::Sphere, margin);
                if let Some(c) = push_out(p.pos, o.center, radius) {
                    p.pos = c;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec::Vec2;

    #[test]
    fn push_out_lands_on_surface() {
        let p = push_out(Vec3::new(0.5f32, 0.0, 0.0), Vec3::zero(), 2.0).unwrap();
        assert!((p.length() - 2.0).abs() < 1e-6);
        assert!(p.x > 0.0);
    }

    #[test]
    fn push_out_ignores_outside_and_center() {
        assert!(push_out(Vec2::new(3.0f32, 0.0), Vec2::zero(), 2.0).is_none());
        assert!(push_out(Vec2::<f32>::zero(), Vec2::zero(), 2.0).is_none());
    }

    #[test]
    fn scale_widens_radius() {
        let o = Obstacle::new(Vec3::zero(), 1.0f32).with_scale(Vec3::new(2.0, -3.0, 5.0));
        assert_eq!(o.effective_scale(ObstacleFamily::Circle), 3.0);
        assert_eq!(o.effective_scale(ObstacleFamily::Sphere), 5.0);
        assert!((o.contact_radius(ObstacleFamily::Circle, 0.01) - 3.01).abs() < 1e-6);
    }

    #[test]
    fn circles_leave_z_untouched() {
        let mut particles = [Particle::new(Vec3::new(0.2f32, 0.1, 7.0))];
        let circle = Obstacle::new(Vec3::new(0.0, 0.0, -4.0), 1.0);
        resolve_collisions(&mut particles, &[circle], &[], 0.0);
        let p = particles[0].pos;
        assert_eq!(p.z, 7.0);
        assert!((p.xy().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn pinned_particles_are_not_pushed() {
        let start = Vec3::new(0.1f32, 0.0, 0.0);
        let mut particles = [Particle::pinned(start)];
        let sphere = Obstacle::new(Vec3::zero(), 1.0);
        resolve_collisions(&mut particles, &[], &[sphere], 0.01);
        assert_eq!(particles[0].pos, start);
    }

    #[test]
    fn set_resolves_only_matching_family() {
        let mut set = ObstacleSet::new();
        let c = set.insert(ObstacleFamily::Circle, Obstacle::new(Vec3::zero(), 1.0f32));
        let s = set.insert(ObstacleFamily::Sphere, Obstacle::new(Vec3::zero(), 2.0f32));
        assert!(set.resolve(ObstacleFamily::Circle, c).is_some());
        assert!(set.resolve(ObstacleFamily::Sphere, c).is_none());
        set.remove(s);
        assert!(set.resolve(ObstacleFamily::Sphere, s).is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn cache_refreshes_on_interval() {
        let mut set = ObstacleSet::new();
        set.insert(ObstacleFamily::Sphere, Obstacle::new(Vec3::zero(), 1.0f32));
        let mut cache = ObstacleCache::new();

        assert_eq!(cache.advance(0.25, 0.5, true, true, &mut set), Some(1));
        set.insert(ObstacleFamily::Sphere, Obstacle::new(Vec3::zero(), 1.0f32));
        assert_eq!(cache.advance(0.25, 0.5, true, true, &mut set), None);
        assert_eq!(cache.cached_handles(), 1);
        // 0.5 s since the first refresh
        assert_eq!(cache.advance(0.25, 0.5, true, true, &mut set), Some(2));
    }

    #[test]
    fn refresh_survives_long_sessions() {
        let mut set = ObstacleSet::new();
        set.insert(ObstacleFamily::Circle, Obstacle::new(Vec3::zero(), 1.0f32));
        let mut cache = ObstacleCache::new();

        assert_eq!(cache.advance(0.25, 0.5, true, true, &mut set), Some(1));
        // Hours of play in one jump; 0.25 is far below one ulp of 1e7.
        assert_eq!(cache.advance(1.0e7, 0.5, true, true, &mut set), None);
        assert_eq!(cache.advance(0.25, 0.5, true, true, &mut set), Some(1));

        set.insert(ObstacleFamily::Sphere, Obstacle::new(Vec3::zero(), 1.0f32));
        assert_eq!(cache.advance(0.25, 0.5, true, true, &mut set), None);
        assert_eq!(cache.advance(0.25, 0.5, true, true, &mut set), Some(2));
    }

    #[test]
    fn disabled_family_is_not_discovered() {
        let mut set = ObstacleSet::new();
        set.insert(ObstacleFamily::Circle, Obstacle::new(Vec3::zero(), 1.0f32));
        set.insert(ObstacleFamily::Sphere, Obstacle::new(Vec3::zero(), 1.0f32));
        let mut cache = ObstacleCache::new();
        assert_eq!(cache.advance(0.1, 0.4, false, true, &mut set), Some(1));
        cache.snapshot(&set);
        assert!(cache.circles().is_empty());
        assert_eq!(cache.spheres().len(), 1);
    }

    #[test]
    fn snapshot_drops_dead_obstacles() {
        let mut set = ObstacleSet::new();
        let a = set.insert(ObstacleFamily::Sphere, Obstacle::new(Vec3::zero(), 1.0f32));
        set.insert(ObstacleFamily::Sphere, Obstacle::new(Vec3::zero(), 1.0f32));
        let mut cache = ObstacleCache::new();
        cache.advance(0.1, 1.0, true, true, &mut set);
        set.get_mut(a).unwrap().active = false;
        cache.snapshot(&set);
        assert_eq!(cache.spheres().len(), 1);
        assert_eq!(cache.cached_handles(), 2);
    }
}
