//! Many-body inverse-distance repulsion with a Barnes-Hut approximation.

use crate::float::Float;
use crate::quadtree::QuadTree;
use crate::vec::Vec2;

/// Pairwise charge between vertices.
///
/// Each pair closer than `distance_max` contributes
/// `d * strength * alpha / |d|^2` to the velocity of the affected vertex,
/// where `d` points from the vertex to the source. Negative strength repels.
/// Distances below 1 are softened to avoid singular kicks, and coincident
/// points contribute nothing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ManyBody<F: Float> {
    pub strength: F,
    pub distance_max: F,
    pub theta: F,
}

impl<F: Float> ManyBody<F> {
    pub fn new(strength: F, distance_max: F, theta: F) -> Self {
        ManyBody { strength, distance_max, theta }
    }

    /// Accumulate the charge contribution into `velocities`.
    ///
    /// `tree` must have been built over `positions`. Reads positions only,
    /// so the order in which vertices are visited does not matter.
    pub(crate) fn apply(&self, tree: &QuadTree<F>, positions: &[Vec2<F>], alpha: F, velocities: &mut [Vec2<F>]) {
        let Some(root) = tree.root() else {
            return;
        };
        if self.strength == F::zero() || self.distance_max == F::zero() {
            return;
        }

        let theta2 = self.theta * self.theta;
        let mut stack = Vec::new();
        for (i, &p) in positions.iter().enumerate() {
            if !p.is_finite() {
                continue;
            }
            let mut kick = Vec2::zero();
            stack.clear();
            stack.push(root);

            while let Some(index) = stack.pop() {
                let node = tree.node(index);
                if node.is_leaf() {
                    for &j in &node.points {
                        if j != i {
                            kick += self.pull(positions[j] - p, F::one(), alpha);
                        }
                    }
                    continue;
                }

                let d = node.centroid - p;
                if node.size * node.size / theta2 < d.length_sq() {
                    // Far enough to treat the whole cell as one body.
                    kick += self.pull(d, F::from_f64(node.count as f64), alpha);
                } else {
                    stack.extend(node.children.iter().flatten());
                }
            }

            velocities[i] += kick;
        }
    }

    fn pull(&self, d: Vec2<F>, weight: F, alpha: F) -> Vec2<F> {
        let mut l = d.length_sq();
        if l == F::zero() || l >= self.distance_max * self.distance_max {
            return Vec2::zero();
        }
        if l < F::one() {
            l = l.sqrt();
        }
        d.scale(self.strength * weight * alpha / l)
    }
}
