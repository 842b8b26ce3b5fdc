//! Planar vector for vertex positions, velocities and drag offsets.

use core::ops::{Add, AddAssign, Sub, SubAssign};

use crate::float::Float;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2<F: Float> {
    pub x: F,
    pub y: F,
}

impl<F: Float> Vec2<F> {
    /// Vector from components.
    pub fn new(x: F, y: F) -> Self { Vec2 { x, y } }

    /// The origin.
    pub fn zero() -> Self { Vec2 { x: F::zero(), y: F::zero() } }

    /// Squared length. The pairwise terms compare this against squared
    /// thresholds to skip the root.
    pub fn length_sq(self) -> F {
        self.x * self.x + self.y * self.y
    }

    /// Euclidean length.
    pub fn length(self) -> F {
        self.length_sq().sqrt()
    }

    /// Both components multiplied by `s`.
    pub fn scale(self, s: F) -> Self {
        Vec2 { x: self.x * s, y: self.y * s }
    }

    /// Distance to `other`.
    pub fn distance(self, other: Self) -> F {
        (self - other).length()
    }

    /// Neither component is NaN or infinite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Exactly zero; no tolerance.
    pub fn is_zero(self) -> bool {
        self.x == F::zero() && self.y == F::zero()
    }
}

impl<F: Float> Add for Vec2<F> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self { Vec2::new(self.x + rhs.x, self.y + rhs.y) }
}

impl<F: Float> Sub for Vec2<F> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self { Vec2::new(self.x - rhs.x, self.y - rhs.y) }
}

impl<F: Float> AddAssign for Vec2<F> {
    fn add_assign(&mut self, rhs: Self) { *self = *self + rhs; }
}

impl<F: Float> SubAssign for Vec2<F> {
    fn sub_assign(&mut self, rhs: Self) { *self = *self - rhs; }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_of_3_4_is_5() {
        let v = Vec2::new(3.0f32, 4.0);
        assert!((v.length() - 5.0).abs() < 1e-6);
        assert_eq!(v.length_sq(), 25.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Vec2::new(-1.0f64, 2.0);
        let b = Vec2::new(2.0f64, 6.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
        assert_eq!(a.distance(b), b.distance(a));
    }

    #[test]
    fn assign_ops_accumulate() {
        let mut v = Vec2::new(1.0f64, 1.0);
        v += Vec2::new(2.0, 3.0);
        v -= Vec2::new(0.5, 0.5);
        assert_eq!(v, Vec2::new(2.5, 3.5));
    }

    #[test]
    fn finiteness() {
        assert!(Vec2::new(1.0f64, -2.0).is_finite());
        assert!(!Vec2::new(f64::NAN, 0.0).is_finite());
        assert!(!Vec2::new(0.0f32, f32::INFINITY).is_finite());
    }

    #[test]
    fn zero_has_no_tolerance() {
        assert!(Vec2::<f64>::zero().is_zero());
        assert!(!Vec2::new(0.0f64, 1e-300).is_zero());
    }
}
