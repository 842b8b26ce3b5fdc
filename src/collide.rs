//! Minimum-separation constraint between vertex discs.

use crate::float::Float;
use crate::quadtree::QuadTree;
use crate::vec::Vec2;

/// Keeps vertex centers at least `2 * radius` apart.
///
/// Overlaps are measured on predicted positions (`position + velocity`) and
/// resolved by pushing both vertices apart by half the overlap each. Not
/// scaled by alpha, so separation holds even in a cold simulation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Collide<F: Float> {
    pub radius: F,
    pub strength: F,
}

impl<F: Float> Collide<F> {
    pub fn new(radius: F) -> Self {
        Collide { radius, strength: F::one() }
    }

    /// Accumulate push-apart corrections into `velocities`.
    ///
    /// All overlaps are measured against the same predicted snapshot and
    /// applied together.
    pub(crate) fn apply(&self, positions: &[Vec2<F>], velocities: &mut [Vec2<F>]) {
        let predicted: Vec<Vec2<F>> = positions
            .iter()
            .zip(velocities.iter())
            .map(|(&p, &v)| p + v)
            .collect();
        let tree = QuadTree::build(&predicted);

        let reach = F::two() * self.radius;
        let reach2 = reach * reach;
        let mut corrections = vec![Vec2::zero(); predicted.len()];

        for (i, &qi) in predicted.iter().enumerate() {
            if !qi.is_finite() {
                continue;
            }
            tree.for_each_near(qi, reach, |j| {
                if j <= i {
                    return;
                }
                let d = qi - predicted[j];
                let l2 = d.length_sq();
                if l2 == F::zero() || l2 >= reach2 {
                    return;
                }
                let l = l2.sqrt();
                let push = d.scale((reach - l) / l * self.strength * F::half());
                corrections[i] += push;
                corrections[j] -= push;
            });
        }

        for (v, c) in velocities.iter_mut().zip(corrections) {
            *v += c;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_pair_is_separated() {
        let collide = Collide::new(3.0f64);
        let positions = [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0)];
        let mut velocities = [Vec2::zero(); 2];
        collide.apply(&positions, &mut velocities);
        let after = (positions[1] + velocities[1]).distance(positions[0] + velocities[0]);
        assert!((after - 6.0).abs() < 1e-9, "separation {after}");
    }

    #[test]
    fn distant_pair_untouched() {
        let collide = Collide::new(3.0f64);
        let positions = [Vec2::new(0.0, 0.0), Vec2::new(6.5, 0.0)];
        let mut velocities = [Vec2::zero(); 2];
        collide.apply(&positions, &mut velocities);
        assert!(velocities.iter().all(|v| v.is_zero()));
    }

    #[test]
    fn coincident_pair_stays_finite() {
        let collide = Collide::new(2.0f64);
        let positions = [Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0)];
        let mut velocities = [Vec2::zero(); 2];
        collide.apply(&positions, &mut velocities);
        assert!(velocities.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn uses_predicted_positions() {
        let collide = Collide::new(3.0f64);
        // Far apart now, but about to overlap.
        let positions = [Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0)];
        let mut velocities = [Vec2::new(8.0, 0.0), Vec2::new(-8.0, 0.0)];
        collide.apply(&positions, &mut velocities);
        assert!(velocities[0].x < 8.0);
        assert!(velocities[1].x > -8.0);
    }
}
