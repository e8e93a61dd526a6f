//! Step observer trait for monitoring cloth ticks.

/// Trait for observing the solver as it runs.
///
/// Implement this trait to monitor solver progress (e.g., for debugging,
/// visualization, or profiling). All methods have default no-op
/// implementations.
pub trait StepObserver {
    /// Called after the obstacle cache was re-queried, with the number of
    /// handles now cached across both families.
    fn on_obstacles_refreshed(&mut self, _cached: usize) {}

    /// Called after all particles have been integrated for a substep.
    fn on_integrate(&mut self, _substep: usize) {}

    /// Called after each projection + collision iteration.
    fn on_constraint_iteration(&mut self, _iteration: usize) {}

    /// Called when a tick is fully complete and the mesh is in sync.
    fn on_step_complete(&mut self) {}
}

/// A no-op observer that does nothing. Use as default when no observation needed.
pub struct NoOpStepObserver;

impl StepObserver for NoOpStepObserver {}
