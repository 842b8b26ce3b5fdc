//! Knit-fabric mesh layout and force-directed relaxation.
//!
//! `knitmesh` builds a regular knit-like quad mesh (vertices, faces, and
//! stretch, shear and strut links) and relaxes it toward a plausible rest
//! shape with a velocity-damped solver that cools over time. Parameters can
//! be edited live, and vertices can be pinned or dragged without restarting.
//!
//! # Features
//!
//! - **Topology**: deterministic grid mesh with three link families
//! - **Force model**: link relaxation, Barnes-Hut charge, collision, centering
//! - **Cooling**: alpha decay with reheat on edits and drags
//! - **Interaction**: persistent pins and vertex, link or face drags
//! - **Intent queue**: commands submitted between ticks, latest config wins
//! - **Observable**: monitor ticks via the `StepObserver` trait
//!
//! Logging goes through `ftlog`; the host installs the logger.

pub mod float;
pub mod vec;
pub mod topology;
pub mod config;
pub mod force;
pub mod charge;
pub mod collide;
mod quadtree;
pub mod vertex;
pub mod integrator;
pub mod interaction;
pub mod simulation;
pub mod observer;
pub mod error;

// Re-export primary API
pub use float::Float;
pub use vec::Vec2;
pub use topology::{Face, Link, LinkClass, LinkId, Topology};
pub use config::KnitConfig;
pub use force::{CenterMode, ForceModel, ForceSet, ForceTerm, LinkParams};
pub use charge::ManyBody;
pub use collide::Collide;
pub use vertex::Vertex;
pub use integrator::{Integrator, SimState, TickReport};
pub use interaction::{DragTarget, InteractionController};
pub use simulation::{Intent, Simulation};
pub use observer::{NoOpStepObserver, StepObserver};
pub use error::{KnitError, Result};
