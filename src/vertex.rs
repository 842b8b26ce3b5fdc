//! Per-vertex simulation state.

use crate::float::Float;
use crate::vec::Vec2;

/// A mesh vertex: position, velocity and fixing state.
///
/// `fixed` is the position override applied every step. It is set both by a
/// persistent pin and by a transient drag; `pinned` tells the two apart so a
/// drag release only frees vertices that are not pinned.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vertex<F: Float> {
    pub pos: Vec2<F>,
    pub vel: Vec2<F>,
    pub fixed: Option<Vec2<F>>,
    pub pinned: bool,
    /// Held in place for one tick after recovering from divergence.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) held: bool,
}

impl<F: Float> Vertex<F> {
    pub fn new(pos: Vec2<F>) -> Self {
        Vertex { pos, vel: Vec2::zero(), fixed: None, pinned: false, held: false }
    }

    /// Fixed by a pin, a drag, or a divergence hold.
    pub fn is_fixed(&self) -> bool {
        self.fixed.is_some() || self.held
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }

    /// Where the vertex is anchored, or where it is now when free.
    pub fn anchor(&self) -> Vec2<F> {
        self.fixed.unwrap_or(self.pos)
    }

    pub(crate) fn pin(&mut self) {
        self.pinned = true;
        self.fixed = Some(self.anchor());
    }

    pub(crate) fn unpin(&mut self) {
        self.pinned = false;
    }

    pub(crate) fn fix_at(&mut self, pos: Vec2<F>) {
        self.fixed = Some(pos);
    }

    /// Drop the position override unless the vertex is pinned.
    pub(crate) fn release(&mut self) {
        if !self.pinned {
            self.fixed = None;
        }
    }

    /// Semi-implicit step: damp the accumulated velocity, then move by it
    /// plus `shift`. Fixed vertices snap to their override with zero velocity.
    pub(crate) fn integrate(&mut self, velocity_decay: F, shift: Vec2<F>) {
        match self.fixed {
            Some(target) => {
                self.pos = target;
                self.vel = Vec2::zero();
            }
            None => {
                self.vel = self.vel.scale(velocity_decay);
                self.pos = self.pos + self.vel + shift;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_vertex_moves_by_damped_velocity() {
        let mut v = Vertex::new(Vec2::new(0.0f64, 0.0));
        v.vel = Vec2::new(10.0, -5.0);
        v.integrate(0.6, Vec2::new(1.0, 1.0));
        assert!((v.vel.x - 6.0).abs() < 1e-12);
        assert!((v.pos.x - 7.0).abs() < 1e-12);
        assert!((v.pos.y + 2.0).abs() < 1e-12);
    }

    #[test]
    fn fixed_vertex_snaps_and_stops() {
        let mut v = Vertex::new(Vec2::new(0.0f64, 0.0));
        v.vel = Vec2::new(10.0, 10.0);
        v.fix_at(Vec2::new(3.0, 4.0));
        v.integrate(0.6, Vec2::new(1.0, 1.0));
        assert_eq!(v.pos, Vec2::new(3.0, 4.0));
        assert!(v.vel.is_zero());
    }

    #[test]
    fn release_keeps_pins() {
        let mut v = Vertex::new(Vec2::new(1.0f64, 2.0));
        v.pin();
        v.release();
        assert_eq!(v.fixed, Some(Vec2::new(1.0, 2.0)));
        v.unpin();
        v.release();
        assert!(v.fixed.is_none());
    }
}
