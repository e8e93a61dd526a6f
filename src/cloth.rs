//! The cloth object callers drive once per frame.

use crate::collision::{ObstacleCache, ObstacleQuery};
use crate::config::ClothConfig;
use crate::constraint::{ConstraintSet, DistanceConstraint};
use crate::error::ClothError;
use crate::float::Float;
use crate::grid::GridLayout;
use crate::mesh::ClothMesh;
use crate::observer::StepObserver;
use crate::particle::Particle;
use crate::solver::XpbdSolver;
use crate::transform::Transform;
use crate::vec::Vec3;
use alloc::vec::Vec as AllocVec;

/// An XPBD cloth: a hanging grid of particles with stretch and shear
/// constraints, colliding with round obstacles.
///
/// Lifecycle: [`new`](Self::new) stores configuration only, and
/// [`rebuild`](Self::rebuild) creates the particles, constraints and mesh.
/// [`tick`](Self::tick) does nothing until the first rebuild.
///
/// ```
/// use drape::{ClothConfig, NoObstacles, NoOpStepObserver, Transform, XpbdCloth};
///
/// let config = ClothConfig::new().with_segments(8, 8).with_size(2.0, 2.0);
/// let mut cloth: XpbdCloth<f32> = XpbdCloth::build(config, Transform::identity());
/// cloth.tick(1.0 / 60.0, &mut NoObstacles, &mut NoOpStepObserver);
/// assert_eq!(cloth.mesh().vertex_count(), 81);
/// ```
pub struct XpbdCloth<F: Float> {
    config: ClothConfig<F>,
    transform: Transform<F>,
    solver: Option<XpbdSolver<F>>,
    mesh: ClothMesh<F>,
    obstacles: ObstacleCache<F>,
    columns: usize,
    rows: usize,
}

impl<F: Float> XpbdCloth<F> {
    /// Store a (clamped) configuration and placement. Builds nothing.
    pub fn new(config: ClothConfig<F>, transform: Transform<F>) -> Self {
        XpbdCloth {
            config: config.clamped(),
            transform,
            solver: None,
            mesh: ClothMesh::default(),
            obstacles: ObstacleCache::new(),
            columns: 0,
            rows: 0,
        }
    }

    /// [`new`](Self::new) followed by [`rebuild`](Self::rebuild).
    pub fn build(config: ClothConfig<F>, transform: Transform<F>) -> Self {
        let mut cloth = Self::new(config, transform);
        cloth.rebuild();
        cloth
    }

    /// Set the physical size used by the next rebuild.
    pub fn configure(&mut self, width: F, height: F) {
        self.config = self.config.clone().with_size(width, height);
        if self.config.width != width || self.config.height != height {
            tracing::debug!(
                ?width,
                ?height,
                clamped_width = ?self.config.width,
                clamped_height = ?self.config.height,
                "cloth dimensions clamped"
            );
        }
    }

    /// Replace the configuration. Dynamics apply from the next tick;
    /// resolution, size, compliance and pinning apply from the next rebuild.
    pub fn set_config(&mut self, config: ClothConfig<F>) {
        let config = config.clamped();
        if self.is_built() && self.config.topology_differs(&config) {
            tracing::debug!("topology settings changed; rebuild to apply");
        }
        self.config = config;
    }

    /// Move the cloth's local frame. Affects where the next rebuild places
    /// particles and how world positions map into mesh space.
    pub fn set_transform(&mut self, transform: Transform<F>) {
        self.transform = transform;
    }

    /// Discard all particle state and regenerate grid, constraints and mesh.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn rebuild(&mut self) {
        let grid = GridLayout::build(&self.config, &self.transform);
        let constraints = ConstraintSet::from_grid(
            &grid,
            self.config.stretch_compliance,
            self.config.shear_compliance,
        );
        tracing::debug!(
            columns = grid.columns,
            rows = grid.rows,
            particles = grid.particle_count(),
            constraints = constraints.len(),
            triangles = grid.triangle_count(),
            "rebuilt cloth"
        );

        let GridLayout { columns, rows, particles, local, uvs, indices } = grid;
        self.columns = columns;
        self.rows = rows;
        self.mesh = ClothMesh::new(local, uvs, indices);
        self.solver = Some(XpbdSolver::new(particles, constraints));
    }

    /// Advance the simulation by one frame of `dt` seconds and refresh the mesh.
    ///
    /// Does nothing before the first rebuild or when `dt` is not positive.
    pub fn tick<Q, O>(&mut self, dt: F, query: &mut Q, observer: &mut O)
    where
        Q: ObstacleQuery<F>,
        O: StepObserver,
    {
        let Some(solver) = self.solver.as_mut() else {
            return;
        };
        if !(dt > F::zero()) {
            return;
        }

        let config = &self.config;
        if let Some(cached) = self.obstacles.advance(
            dt,
            config.collider_refresh_interval,
            config.collide_circles,
            config.collide_spheres,
            query,
        ) {
            observer.on_obstacles_refreshed(cached);
        }
        self.obstacles.snapshot(query);

        solver.step(dt, config, &self.obstacles, observer);
        self.mesh.sync(&solver.particles, &self.transform);
        observer.on_step_complete();
    }

    /// Pin the particle at (col, row) where it currently is.
    pub fn pin(&mut self, col: usize, row: usize) -> Result<(), ClothError> {
        self.particle_at_mut(col, row)?.pin();
        Ok(())
    }

    /// Release a pinned particle with unit mass.
    pub fn unpin(&mut self, col: usize, row: usize) -> Result<(), ClothError> {
        self.particle_at_mut(col, row)?.unpin();
        Ok(())
    }

    /// Move a pinned particle to a world position.
    pub fn move_pin(&mut self, col: usize, row: usize, pos: Vec3<F>) -> Result<(), ClothError> {
        let columns = self.columns;
        let particle = self.particle_at_mut(col, row)?;
        if !particle.is_pinned() {
            return Err(ClothError::NotPinned { index: col + row * columns });
        }
        particle.move_to(pos);
        Ok(())
    }

    fn particle_at_mut(&mut self, col: usize, row: usize) -> Result<&mut Particle<F>, ClothError> {
        let (columns, rows) = (self.columns, self.rows);
        let solver = self.solver.as_mut().ok_or(ClothError::NotBuilt)?;
        if col >= columns || row >= rows {
            // Saturate so absurd coordinates still report instead of overflowing.
            let index = col.saturating_add(row.saturating_mul(columns));
            return Err(ClothError::ParticleOutOfBounds { index, count: solver.particle_count() });
        }
        Ok(solver.particle_mut(col + row * columns))
    }

    pub fn index(&self, col: usize, row: usize) -> usize {
        col + row * self.columns
    }

    pub fn is_built(&self) -> bool {
        self.solver.is_some()
    }

    pub fn config(&self) -> &ClothConfig<F> { &self.config }
    pub fn transform(&self) -> &Transform<F> { &self.transform }
    pub fn mesh(&self) -> &ClothMesh<F> { &self.mesh }
    pub fn columns(&self) -> usize { self.columns }
    pub fn rows(&self) -> usize { self.rows }

    pub fn particle_count(&self) -> usize {
        self.solver.as_ref().map_or(0, |s| s.particle_count())
    }

    pub fn constraint_count(&self) -> usize {
        self.solver.as_ref().map_or(0, |s| s.constraint_count())
    }

    pub fn constraints(&self) -> &[DistanceConstraint<F>] {
        match &self.solver {
            Some(solver) => solver.constraints(),
            None => &[],
        }
    }

    pub fn particles(&self) -> &[Particle<F>] {
        match &self.solver {
            Some(solver) => &solver.particles,
            None => &[],
        }
    }

    pub fn particle(&self, index: usize) -> Option<&Particle<F>> {
        self.particles().get(index)
    }

    /// World-space particle positions in row-major order.
    pub fn positions(&self) -> AllocVec<Vec3<F>> {
        self.particles().iter().map(|p| p.pos).collect()
    }

    /// World-space position of the particle at (col, row).
    pub fn position_at(&self, col: usize, row: usize) -> Option<Vec3<F>> {
        if col >= self.columns || row >= self.rows {
            return None;
        }
        self.particle(self.index(col, row)).map(|p| p.pos)
    }

    /// Obstacle handles held from the last refresh.
    pub fn cached_obstacles(&self) -> usize {
        self.obstacles.cached_handles()
    }
}
