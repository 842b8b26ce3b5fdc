//! Error types for mesh building, configuration and simulation.

use thiserror::Error;

use crate::integrator::SimState;
use crate::topology::LinkClass;

/// Errors reported by the knit relaxation core.
///
/// None of these are fatal: each one is local to a single mutation or a
/// single vertex, and the previous state stays in effect.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KnitError {
    /// Grid width and height must both be at least 1, and the vertex count
    /// must fit in a `usize`.
    #[error("grid dimensions must be positive and addressable (got {width}x{height})")]
    InvalidDimension { width: usize, height: usize },

    /// A configuration value is out of its allowed range.
    #[error("invalid coefficient `{name}`: {reason}")]
    InvalidCoefficient { name: &'static str, reason: &'static str },

    /// A vertex reached a NaN or infinite position and was rolled back.
    #[error("vertex {vertex} diverged to a non-finite state and was reset")]
    NumericDivergence { vertex: usize },

    #[error("vertex index {index} out of bounds (count: {count})")]
    VertexOutOfBounds { index: usize, count: usize },

    #[error("{class:?} link index {index} out of bounds (count: {count})")]
    LinkOutOfBounds { class: LinkClass, index: usize, count: usize },

    #[error("face index {index} out of bounds (count: {count})")]
    FaceOutOfBounds { index: usize, count: usize },

    /// The operation needs a topology but the simulation is idle.
    #[error("no topology has been built")]
    NoTopology,

    /// `tick` was called outside the `Running` state.
    #[error("simulation is {state:?}, not running")]
    NotRunning { state: SimState },

    #[error("a drag is already in progress")]
    DragInProgress,

    #[error("no drag is in progress")]
    NoActiveDrag,
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, KnitError>;
