//! Pin and drag commands, expressed as fixed-position overrides.
//!
//! The controller never touches vertex arrays itself beyond the fix/release
//! calls the integrator exposes; it only tracks which vertices a drag owns.

use crate::error::{KnitError, Result};
use crate::float::Float;
use crate::force::CenterMode;
use crate::integrator::Integrator;
use crate::topology::{LinkId, Topology};
use crate::vec::Vec2;

/// What a drag grabs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DragTarget {
    Vertex(usize),
    /// Both endpoints of a link.
    Link(LinkId),
    /// All four corners of a face.
    Face(usize),
}

impl DragTarget {
    /// Vertices moved by this target, checked against `topology`.
    pub fn vertices(&self, topology: &Topology) -> Result<Vec<usize>> {
        match *self {
            DragTarget::Vertex(v) => {
                topology.check_vertex(v)?;
                Ok(vec![v])
            }
            DragTarget::Link(id) => {
                let link = topology.link(id)?;
                Ok(vec![link.source, link.target])
            }
            DragTarget::Face(id) => Ok(topology.face(id)?.vertices.to_vec()),
        }
    }

    /// Alpha the simulation is held at while the drag lasts.
    fn alpha_target<F: Float>(&self) -> F {
        match self {
            DragTarget::Face(_) => F::half(),
            DragTarget::Vertex(_) | DragTarget::Link(_) => F::from_f64(0.3),
        }
    }
}

#[derive(Clone, Debug)]
struct DragSession {
    target: DragTarget,
    vertices: Vec<usize>,
}

/// Tracks the active drag and applies pins.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
    drag: Option<DragSession>,
}

impl InteractionController {
    pub fn new() -> Self {
        InteractionController { drag: None }
    }

    /// Fix `vertex` where it is and mark it pinned. A vertex already held by
    /// a drag is pinned at its drag position.
    pub fn pin<F: Float>(&mut self, integrator: &mut Integrator<F>, vertex: usize) -> Result<()> {
        integrator.vertex_mut(vertex)?.pin();
        self.interacted(integrator);
        Ok(())
    }

    /// Clear the pin. The vertex stays fixed while the active drag owns it,
    /// and is free otherwise.
    pub fn unpin<F: Float>(&mut self, integrator: &mut Integrator<F>, vertex: usize) -> Result<()> {
        let dragged = self.owns(vertex);
        let v = integrator.vertex_mut(vertex)?;
        v.unpin();
        if !dragged {
            v.release();
        }
        self.interacted(integrator);
        integrator.reheat(integrator.alpha_target())
    }

    pub fn begin_drag<F: Float>(&mut self, integrator: &mut Integrator<F>, target: DragTarget) -> Result<()> {
        if self.drag.is_some() {
            return Err(KnitError::DragInProgress);
        }
        let topology = integrator.topology().ok_or(KnitError::NoTopology)?;
        let vertices = target.vertices(topology)?;

        for &i in &vertices {
            let v = integrator.vertex_mut(i)?;
            let anchor = v.anchor();
            v.fix_at(anchor);
        }
        ftlog::debug!("drag started on {:?} ({} vertices)", target, vertices.len());

        self.drag = Some(DragSession { target, vertices });
        integrator.set_center_mode(CenterMode::Suspended);
        integrator.reheat(target.alpha_target())
    }

    /// Move every dragged vertex by `(dx, dy)`.
    pub fn drag_by<F: Float>(&mut self, integrator: &mut Integrator<F>, dx: F, dy: F) -> Result<()> {
        let session = self.drag.as_ref().ok_or(KnitError::NoActiveDrag)?;
        let delta = Vec2::new(dx, dy);
        if !delta.is_finite() {
            return Err(KnitError::InvalidCoefficient { name: "drag delta", reason: "must be finite" });
        }
        for &i in &session.vertices {
            let v = integrator.vertex_mut(i)?;
            let anchor = v.anchor();
            v.fix_at(anchor + delta);
        }
        Ok(())
    }

    /// Move the drag so that its first vertex lands on `(x, y)`; the others
    /// keep their offsets.
    pub fn drag_to<F: Float>(&mut self, integrator: &mut Integrator<F>, x: F, y: F) -> Result<()> {
        let session = self.drag.as_ref().ok_or(KnitError::NoActiveDrag)?;
        let Some(&first) = session.vertices.first() else {
            return Ok(());
        };
        let current = integrator.vertex(first)?.anchor();
        let delta = Vec2::new(x, y) - current;
        self.drag_by(integrator, delta.x, delta.y)
    }

    /// Release the dragged vertices that are not pinned and let the mesh cool.
    pub fn end_drag<F: Float>(&mut self, integrator: &mut Integrator<F>) -> Result<()> {
        let session = self.drag.take().ok_or(KnitError::NoActiveDrag)?;
        for &i in &session.vertices {
            integrator.vertex_mut(i)?.release();
        }
        ftlog::debug!("drag on {:?} released", session.target);
        integrator.set_alpha_target(F::zero())?;
        integrator.set_center_mode(CenterMode::Reduced);
        Ok(())
    }

    /// Forget the active drag without touching any vertex. Used when the
    /// topology it refers to is discarded.
    pub fn cancel(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn target(&self) -> Option<DragTarget> {
        self.drag.as_ref().map(|s| s.target)
    }

    pub fn dragged_vertices(&self) -> &[usize] {
        match &self.drag {
            Some(session) => &session.vertices,
            None => &[],
        }
    }

    fn owns(&self, vertex: usize) -> bool {
        self.dragged_vertices().contains(&vertex)
    }

    fn interacted<F: Float>(&self, integrator: &mut Integrator<F>) {
        if integrator.center_mode() == CenterMode::Full {
            integrator.set_center_mode(CenterMode::Reduced);
        }
    }
}
