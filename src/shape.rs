//! Collision Shapes
//!
//! [`Shape`] is a closed enum of the two primitives this engine simulates:
//! circles and axis-aligned rectangles. Every shape stores its own center,
//! and that center is the single source of truth for the owning body's
//! position — a rectangle's min/max corners are always derived, never stored.
//!
//! Boundary tests are epsilon-tolerant: a point sitting exactly on a
//! rectangle edge or a circle's rim counts as contained.

use crate::aabb::Aabb;
use crate::math::{Vec2, EPSILON, EPSILON_SQ};

// ============================================================================
// Shape
// ============================================================================

/// 2D collision shape. The center is world-space and mutable in place;
/// integration and position correction write straight through to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// Circle defined by center and radius.
    Circle {
        /// World-space center.
        center: Vec2,
        /// Radius of the circle.
        radius: f64,
    },
    /// Axis-aligned rectangle defined by center and full dimensions.
    Rectangle {
        /// World-space center.
        center: Vec2,
        /// Full width along X.
        width: f64,
        /// Full height along Y.
        height: f64,
    },
}

impl Shape {
    /// Construct a circle.
    #[inline]
    #[must_use]
    pub const fn circle(center: Vec2, radius: f64) -> Self {
        Self::Circle { center, radius }
    }

    /// Construct an axis-aligned rectangle.
    #[inline]
    #[must_use]
    pub const fn rectangle(center: Vec2, width: f64, height: f64) -> Self {
        Self::Rectangle {
            center,
            width,
            height,
        }
    }

    /// World-space center.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec2 {
        match self {
            Self::Circle { center, .. } | Self::Rectangle { center, .. } => *center,
        }
    }

    /// Mutable access to the center. This is the storage cell the owning
    /// body's position refers to.
    #[inline]
    pub fn center_mut(&mut self) -> &mut Vec2 {
        match self {
            Self::Circle { center, .. } | Self::Rectangle { center, .. } => center,
        }
    }

    /// Tight axis-aligned bounding box.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        match self {
            Self::Circle { center, radius } => {
                Aabb::from_center_size(*center, radius * 2.0, radius * 2.0)
            }
            Self::Rectangle {
                center,
                width,
                height,
            } => Aabb::from_center_size(*center, *width, *height),
        }
    }

    /// Surface area.
    #[must_use]
    pub fn area(&self) -> f64 {
        match self {
            Self::Circle { radius, .. } => core::f64::consts::PI * radius * radius,
            Self::Rectangle { width, height, .. } => width * height,
        }
    }

    /// Epsilon-tolerant point containment: circle rims and rectangle edges
    /// count as inside.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Self::Circle { center, radius } => {
                center.distance_squared_to(point) <= radius * radius + EPSILON_SQ
            }
            Self::Rectangle {
                center,
                width,
                height,
            } => {
                let hw = width * 0.5;
                let hh = height * 0.5;
                point.x >= center.x - hw - EPSILON
                    && point.x <= center.x + hw + EPSILON
                    && point.y >= center.y - hh - EPSILON
                    && point.y <= center.y + hh + EPSILON
            }
        }
    }

    /// Boolean overlap test, dispatched by shape pair. Manifold-free: region
    /// queries use this, the narrow phase computes full contacts separately.
    #[must_use]
    pub fn overlaps(&self, other: &Shape) -> bool {
        match (self, other) {
            (
                Self::Circle {
                    center: ca,
                    radius: ra,
                },
                Self::Circle {
                    center: cb,
                    radius: rb,
                },
            ) => {
                let r_sum = ra + rb;
                ca.distance_squared_to(*cb) < r_sum * r_sum
            }
            (
                Self::Circle { center, radius },
                Self::Rectangle {
                    center: rc,
                    width,
                    height,
                },
            )
            | (
                Self::Rectangle {
                    center: rc,
                    width,
                    height,
                },
                Self::Circle { center, radius },
            ) => {
                let closest = clamp_to_rectangle(*center, *rc, *width, *height);
                center.distance_squared_to(closest) <= radius * radius + EPSILON_SQ
            }
            (
                Self::Rectangle {
                    center: ca,
                    width: wa,
                    height: ha,
                },
                Self::Rectangle {
                    center: cb,
                    width: wb,
                    height: hb,
                },
            ) => {
                let overlap_x = (wa + wb) * 0.5 - (cb.x - ca.x).abs();
                let overlap_y = (ha + hb) * 0.5 - (cb.y - ca.y).abs();
                overlap_x > EPSILON && overlap_y > EPSILON
            }
        }
    }
}

/// Clamp a point into a rectangle given by center and full dimensions.
#[inline]
#[must_use]
pub(crate) fn clamp_to_rectangle(point: Vec2, center: Vec2, width: f64, height: f64) -> Vec2 {
    let hw = width * 0.5;
    let hh = height * 0.5;
    Vec2::new(
        point.x.clamp(center.x - hw, center.x + hw),
        point.y.clamp(center.y - hh, center.y + hh),
    )
}

// ============================================================================
// Tests
// ============================================================================
