//! Scalar abstraction so the solver runs on `f32` or `f64`.

use core::ops::{Add, Div, Mul, Neg, Sub};

/// The floating-point operations the relaxation needs.
///
/// Implemented for `f32` and `f64`. Roots and powers go through `libm`, so a
/// run gives bit-identical results on every target, `wasm32` included.
pub trait Float:
    Copy
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Default
    + core::fmt::Debug
    + core::fmt::Display
{
    fn zero() -> Self;
    fn one() -> Self;
    fn half() -> Self;
    fn two() -> Self;
    fn sqrt(self) -> Self;
    /// `self` raised to `exp`; used to derive the alpha decay.
    fn powf(self, exp: Self) -> Self;
    /// Smaller of the two. Returns `other` when `self` is NaN.
    fn min(self, other: Self) -> Self;
    /// Larger of the two. Returns `other` when `self` is NaN.
    fn max(self, other: Self) -> Self;
    /// Conversion for constants and counts; lossy for `f32`.
    fn from_f64(v: f64) -> Self;
    fn is_finite(self) -> bool;
}

macro_rules! impl_float {
    ($t:ty, $sqrt:path, $pow:path) => {
        impl Float for $t {
            fn zero() -> Self { 0.0 }
            fn one() -> Self { 1.0 }
            fn half() -> Self { 0.5 }
            fn two() -> Self { 2.0 }
            fn sqrt(self) -> Self { $sqrt(self) }
            fn powf(self, exp: Self) -> Self { $pow(self, exp) }
            fn min(self, other: Self) -> Self { if self < other { self } else { other } }
            fn max(self, other: Self) -> Self { if self > other { self } else { other } }
            fn from_f64(v: f64) -> Self { v as $t }
            fn is_finite(self) -> bool { <$t>::is_finite(self) }
        }
    };
}

impl_float!(f32, libm::sqrtf, libm::powf);
impl_float!(f64, libm::sqrt, libm::pow);
