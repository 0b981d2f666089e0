//! 2D Vector Math
//!
//! The scalar foundation of the engine: a plain `f64` 2D vector with full
//! operator overloading and epsilon-guarded division/normalization.
//!
//! Every operation that divides by a magnitude guards against near-zero
//! denominators and returns [`Vec2::ZERO`] instead of producing NaN. The
//! guard threshold is [`EPSILON`] (compared against squared lengths via
//! [`EPSILON_SQ`] where the square root can be avoided).
//!
//! Hot paths in the solver use the in-place variants (`+=`, `-=`, `*=`,
//! [`Vec2::add_scaled`], [`Vec2::normalize_in_place`]); cold paths use the
//! value-returning variants for readability.

use core::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// Tolerance for near-zero magnitude and boundary comparisons.
pub const EPSILON: f64 = 1e-10;

/// [`EPSILON`] squared, for comparisons against squared lengths.
pub const EPSILON_SQ: f64 = EPSILON * EPSILON;

// ============================================================================
// Vec2
// ============================================================================

/// 2D vector with `f64` components.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
}

impl Vec2 {
    /// Zero vector (0, 0)
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Unit X vector (1, 0)
    pub const UNIT_X: Self = Self { x: 1.0, y: 0.0 };

    /// Unit Y vector (0, 1)
    pub const UNIT_Y: Self = Self { x: 0.0, y: 1.0 };

    /// Create a new 2D vector.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared length (avoids sqrt).
    #[inline]
    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Length (magnitude).
    #[inline]
    #[must_use]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Dot product.
    #[inline]
    #[must_use]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// 2D cross product (returns a scalar: `a.x * b.y - a.y * b.x`).
    ///
    /// This is the z-component of the 3D cross product when both vectors
    /// are embedded in the XY plane.
    #[inline]
    #[must_use]
    pub fn cross(self, rhs: Self) -> f64 {
        self.x * rhs.y - self.y * rhs.x
    }

    /// Distance to another point.
    #[inline]
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (other - self).length()
    }

    /// Squared distance to another point.
    #[inline]
    #[must_use]
    pub fn distance_squared_to(self, other: Self) -> f64 {
        (other - self).length_squared()
    }

    /// Normalize to unit length. Returns `ZERO` when `|v|^2 < EPSILON_SQ`.
    #[inline]
    #[must_use]
    pub fn normalize(self) -> Self {
        let len_sq = self.length_squared();
        if len_sq < EPSILON_SQ {
            Self::ZERO
        } else {
            self / len_sq.sqrt()
        }
    }

    /// Normalize in place. Becomes `ZERO` when `|v|^2 < EPSILON_SQ`.
    #[inline]
    pub fn normalize_in_place(&mut self) {
        *self = self.normalize();
    }

    /// Divide by a scalar. Returns `ZERO` when `|s| < EPSILON`.
    #[inline]
    #[must_use]
    pub fn div_or_zero(self, s: f64) -> Self {
        if s.abs() < EPSILON {
            Self::ZERO
        } else {
            Self {
                x: self.x / s,
                y: self.y / s,
            }
        }
    }

    /// In-place fused multiply-add: `self += rhs * s`.
    #[inline]
    pub fn add_scaled(&mut self, rhs: Self, s: f64) {
        self.x += rhs.x * s;
        self.y += rhs.y * s;
    }

    /// Reflect across a surface with the given normal: `v - 2(v.n)n`.
    ///
    /// `normal` is assumed unit-length.
    #[inline]
    #[must_use]
    pub fn reflect(self, normal: Self) -> Self {
        self - normal * (2.0 * self.dot(normal))
    }

    /// Project onto another vector. Returns `ZERO` when `other` is near-zero.
    #[inline]
    #[must_use]
    pub fn project_onto(self, other: Self) -> Self {
        let len_sq = other.length_squared();
        if len_sq < EPSILON_SQ {
            Self::ZERO
        } else {
            other * (self.dot(other) / len_sq)
        }
    }

    /// Rotate by an angle (radians, counter-clockwise).
    #[must_use]
    pub fn rotate(self, angle: f64) -> Self {
        let (sin_a, cos_a) = angle.sin_cos();
        Self {
            x: self.x * cos_a - self.y * sin_a,
            y: self.x * sin_a + self.y * cos_a,
        }
    }

    /// Linear interpolation: `self + (other - self) * t`.
    #[inline]
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }

    /// Return the perpendicular vector (90 degrees counter-clockwise): `(-y, x)`.
    #[inline]
    #[must_use]
    pub fn perpendicular(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// Returns `true` when both components are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl SubAssign for Vec2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl MulAssign<f64> for Vec2 {
    #[inline]
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;

    #[inline]
    fn div(self, rhs: f64) -> Self {
        Self {
            x: self.x / rhs,
            y: self.y / rhs,
        }
    }
}

impl Neg for Vec2 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constants() {
        assert_eq!(Vec2::ZERO, Vec2::new(0.0, 0.0));
        assert_eq!(Vec2::UNIT_X, Vec2::new(1.0, 0.0));
        assert_eq!(Vec2::UNIT_Y, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_add_sub() {
        let a = Vec2::new(3.0, 5.0);
        let b = Vec2::new(1.0, 2.0);
        assert_eq!(a + b, Vec2::new(4.0, 7.0));
        assert_eq!(a - b, Vec2::new(2.0, 3.0));

        let mut c = a;
        c += b;
        assert_eq!(c, Vec2::new(4.0, 7.0));
        c -= b;
        assert_eq!(c, a);
    }

    #[test]
    fn test_mul_div_scalar() {
        let v = Vec2::new(6.0, 8.0);
        assert_eq!(v * 3.0, Vec2::new(18.0, 24.0));
        assert_eq!(v / 2.0, Vec2::new(3.0, 4.0));

        let mut w = v;
        w *= 0.5;
        assert_eq!(w, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_dot_cross() {
        let a = Vec2::new(3.0, 4.0);
        let b = Vec2::new(2.0, 5.0);
        assert_relative_eq!(a.dot(b), 26.0);
        assert_relative_eq!(a.cross(b), 7.0);
    }

    #[test]
    fn test_length() {
        let v = Vec2::new(3.0, 4.0);
        assert_relative_eq!(v.length_squared(), 25.0);
        assert_relative_eq!(v.length(), 5.0);
        assert_relative_eq!(Vec2::ZERO.distance_to(v), 5.0);
        assert_relative_eq!(Vec2::ZERO.distance_squared_to(v), 25.0);
    }

    #[test]
    fn test_normalize() {
        let n = Vec2::new(0.0, 5.0).normalize();
        assert_relative_eq!(n.y, 1.0);
        assert_relative_eq!(n.x, 0.0);

        // Near-zero vector normalizes to zero, not NaN
        let z = Vec2::new(EPSILON / 2.0, 0.0).normalize();
        assert_eq!(z, Vec2::ZERO);
        assert!(z.is_finite());

        let mut m = Vec2::new(10.0, 0.0);
        m.normalize_in_place();
        assert_eq!(m, Vec2::UNIT_X);
    }

    #[test]
    fn test_div_or_zero() {
        let v = Vec2::new(4.0, 8.0);
        assert_eq!(v.div_or_zero(2.0), Vec2::new(2.0, 4.0));
        assert_eq!(v.div_or_zero(0.0), Vec2::ZERO);
        assert_eq!(v.div_or_zero(EPSILON / 10.0), Vec2::ZERO);
    }

    #[test]
    fn test_add_scaled() {
        let mut v = Vec2::new(1.0, 1.0);
        v.add_scaled(Vec2::new(2.0, -4.0), 0.5);
        assert_eq!(v, Vec2::new(2.0, -1.0));
    }

    #[test]
    fn test_reflect() {
        // Bounce off a vertical wall
        let v = Vec2::new(1.0, 1.0);
        let r = v.reflect(Vec2::new(-1.0, 0.0));
        assert_relative_eq!(r.x, -1.0);
        assert_relative_eq!(r.y, 1.0);
    }

    #[test]
    fn test_project() {
        let v = Vec2::new(3.0, 4.0);
        let p = v.project_onto(Vec2::UNIT_X);
        assert_relative_eq!(p.x, 3.0);
        assert_relative_eq!(p.y, 0.0);
        assert_eq!(v.project_onto(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_rotate() {
        let r = Vec2::UNIT_X.rotate(core::f64::consts::FRAC_PI_2);
        assert_relative_eq!(r.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(r.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lerp() {
        let a = Vec2::ZERO;
        let b = Vec2::new(10.0, 20.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Vec2::new(5.0, 10.0));
    }

    #[test]
    fn test_perpendicular() {
        let v = Vec2::new(3.0, 4.0);
        let p = v.perpendicular();
        assert_eq!(p, Vec2::new(-4.0, 3.0));
        assert_relative_eq!(v.dot(p), 0.0);
    }
}
