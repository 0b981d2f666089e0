//! Axis-Aligned Bounding Boxes
//!
//! [`Aabb`] is the currency of the broad phase: every shape lowers to one, the
//! spatial hash indexes them, and CCD raycasts against Minkowski-expanded ones.
//!
//! Overlap is strict (`<`), containment is inclusive (`<=`). The invariant
//! `min.x <= max.x && min.y <= max.y` holds for every constructor.

use crate::math::{Vec2, EPSILON};

// ============================================================================
// Aabb
// ============================================================================

/// Axis-aligned bounding box given by its minimum and maximum corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
}

impl Aabb {
    /// Create a new AABB from min and max corners.
    #[inline]
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create an AABB from a center point and full width/height.
    #[inline]
    #[must_use]
    pub fn from_center_size(center: Vec2, width: f64, height: f64) -> Self {
        let half = Vec2::new(width * 0.5, height * 0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Width along the X axis.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height along the Y axis.
    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// The smaller of width and height. Used by CCD to decide when a body
    /// moves far enough per step to risk tunneling.
    #[inline]
    #[must_use]
    pub fn min_extent(&self) -> f64 {
        self.width().min(self.height())
    }

    /// Center point.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap test. Boxes that merely touch do not overlap.
    #[inline]
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Inclusive point containment.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Smallest AABB enclosing both boxes.
    #[must_use]
    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: Vec2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Vec2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Expand symmetrically by the given half-extents on each side.
    ///
    /// This is the Minkowski sum with a box of size `2*half`, which reduces
    /// a swept box-vs-box test to a raycast against the expanded box.
    #[must_use]
    pub fn expand(&self, half: Vec2) -> Aabb {
        Aabb {
            min: self.min - half,
            max: self.max + half,
        }
    }

    /// Slab-method raycast: first time `t` in `[0, max_t]` at which a ray
    /// starting at `origin` with velocity `dir` enters this box.
    ///
    /// Returns the entry time and the outward normal of the slab that
    /// dominated the entry (the axis hit last). Rays parallel to an axis and
    /// outside that slab miss. A ray starting inside the box misses as well:
    /// overlapping shapes are the narrow phase's problem, not CCD's.
    #[must_use]
    pub fn raycast(&self, origin: Vec2, dir: Vec2, max_t: f64) -> Option<RayHit> {
        let (enter_x, exit_x) = slab_interval(origin.x, dir.x, self.min.x, self.max.x)?;
        let (enter_y, exit_y) = slab_interval(origin.y, dir.y, self.min.y, self.max.y)?;

        let t_min = enter_x.max(enter_y);
        let t_max = exit_x.min(exit_y);

        if t_min > t_max || t_max < 0.0 || t_min > max_t || t_min <= 0.0 {
            return None;
        }

        // The later-entered slab decides the contact normal.
        let normal = if enter_x > enter_y {
            if dir.x > 0.0 {
                Vec2::new(-1.0, 0.0)
            } else {
                Vec2::new(1.0, 0.0)
            }
        } else if dir.y > 0.0 {
            Vec2::new(0.0, -1.0)
        } else {
            Vec2::new(0.0, 1.0)
        };

        Some(RayHit { t: t_min, normal })
    }
}

/// Entry/exit times for one axis, or `None` when the ray is parallel to the
/// slab and outside it.
#[inline]
fn slab_interval(origin: f64, dir: f64, min: f64, max: f64) -> Option<(f64, f64)> {
    if dir.abs() < EPSILON {
        if origin < min || origin > max {
            return None;
        }
        return Some((f64::NEG_INFINITY, f64::INFINITY));
    }
    let inv = 1.0 / dir;
    let t0 = (min - origin) * inv;
    let t1 = (max - origin) * inv;
    if t0 <= t1 {
        Some((t0, t1))
    } else {
        Some((t1, t0))
    }
}

/// Result of [`Aabb::raycast`]: entry time and surface normal at entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Entry time along the ray, in the same unit as `max_t`.
    pub t: f64,
    /// Outward surface normal of the side that was hit.
    pub normal: Vec2,
}

// ============================================================================
// Tests
// ============================================================================
