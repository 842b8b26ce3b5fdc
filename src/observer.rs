//! Step observer trait for monitoring relaxation progress.

use crate::float::Float;
use crate::integrator::TickReport;
use crate::topology::LinkClass;

/// Trait for observing simulation ticks.
///
/// Implement this to drive a renderer, collect diagnostics or profile the
/// solver. All methods have default no-op implementations.
pub trait StepObserver<F: Float> {
    /// Called after each relaxation pass over one link class.
    fn on_relaxation_pass(&mut self, _class: LinkClass, _pass: usize) {}

    /// Called once every active force term has written its velocity contribution.
    fn on_forces_applied(&mut self) {}

    /// Called when a vertex is rolled back after going non-finite.
    fn on_divergence(&mut self, _vertex: usize) {}

    /// Called when a tick is fully complete and positions are final.
    fn on_tick_complete(&mut self, _report: &TickReport<F>) {}
}

/// A no-op observer. Use as default when no observation is needed.
pub struct NoOpStepObserver;

impl<F: Float> StepObserver<F> for NoOpStepObserver {}
