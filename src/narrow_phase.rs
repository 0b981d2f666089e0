//! Narrow-Phase Collision Detection
//!
//! Exact per-pair tests that turn a broad-phase candidate into a contact
//! [`Manifold`]. One detector per unordered shape-kind pair; the dispatcher
//! [`detect`] canonicalizes every normal to point **from body A toward
//! body B**, whatever sign convention the individual detector uses
//! internally.
//!
//! Degenerate inputs never fail: coincident circle centers fall back to an
//! arbitrary fixed axis, and a circle center buried inside a rectangle exits
//! through the nearest edge.

use smallvec::SmallVec;

use crate::body::{Body, BodyId};
use crate::material::Material;
use crate::math::{Vec2, EPSILON};
use crate::shape::{clamp_to_rectangle, Shape};

// ============================================================================
// Contact & Manifold
// ============================================================================

/// A single point of collision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// World-space contact point.
    pub point: Vec2,
    /// Unit normal pointing from body A toward body B.
    pub normal: Vec2,
    /// Non-negative overlap depth along the normal.
    pub penetration: f64,
}

/// The record of one collision: the pair, its contacts, and the combined
/// surface coefficients the solver will use.
#[derive(Clone, Debug)]
pub struct Manifold {
    /// Id of the first body (the "A" role; normals point away from it).
    pub body_a: BodyId,
    /// Id of the second body.
    pub body_b: BodyId,
    /// One or two contact points.
    pub contacts: SmallVec<[Contact; 2]>,
    /// Combined restitution for the pair.
    pub restitution: f64,
    /// Combined friction for the pair.
    pub friction: f64,
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Run the shape-pair detector for two bodies and build a manifold with the
/// A-to-B normal convention.
///
/// `Shape` is a closed enum, so the match is exhaustive; there is no
/// unsupported-pair fallback.
#[must_use]
pub fn detect(a: &Body, b: &Body) -> Option<Manifold> {
    let contact = match (&a.shape, &b.shape) {
        (
            Shape::Circle {
                center: ca,
                radius: ra,
            },
            Shape::Circle {
                center: cb,
                radius: rb,
            },
        ) => circle_circle(*ca, *ra, *cb, *rb),
        (
            Shape::Circle { center, radius },
            Shape::Rectangle {
                center: rc,
                width,
                height,
            },
        ) => {
            // Detector normal points rect -> circle; A is the circle here.
            circle_rectangle(*center, *radius, *rc, *width, *height).map(flip_normal)
        }
        (
            Shape::Rectangle {
                center: rc,
                width,
                height,
            },
            Shape::Circle { center, radius },
        ) => circle_rectangle(*center, *radius, *rc, *width, *height),
        (
            Shape::Rectangle {
                center: ca,
                width: wa,
                height: ha,
            },
            Shape::Rectangle {
                center: cb,
                width: wb,
                height: hb,
            },
        ) => rectangle_rectangle(*ca, *wa, *ha, *cb, *wb, *hb),
    }?;

    let combined = Material::combine(a.material, b.material, a.is_static(), b.is_static());
    let mut contacts = SmallVec::new();
    contacts.push(contact);
    Some(Manifold {
        body_a: a.id(),
        body_b: b.id(),
        contacts,
        restitution: combined.restitution,
        friction: combined.friction,
    })
}

#[inline]
fn flip_normal(mut c: Contact) -> Contact {
    c.normal = -c.normal;
    c
}

// ============================================================================
// Detectors
// ============================================================================

/// Circle vs circle. Normal points from the first circle toward the second.
#[must_use]
pub fn circle_circle(pa: Vec2, ra: f64, pb: Vec2, rb: f64) -> Option<Contact> {
    let delta = pb - pa;
    let dist_sq = delta.length_squared();
    let r_sum = ra + rb;
    if dist_sq >= r_sum * r_sum {
        return None;
    }

    let dist = dist_sq.sqrt();
    if dist < EPSILON {
        // Coincident centers: any axis works, pick +X for determinism.
        return Some(Contact {
            point: pa,
            normal: Vec2::UNIT_X,
            penetration: r_sum,
        });
    }

    let normal = delta / dist;
    Some(Contact {
        point: pa + normal * ra,
        normal,
        penetration: r_sum - dist,
    })
}

/// Circle vs axis-aligned rectangle. Normal points from the rectangle toward
/// the circle; [`detect`] flips it when the circle plays the A role.
#[must_use]
pub fn circle_rectangle(
    circle_center: Vec2,
    radius: f64,
    rect_center: Vec2,
    width: f64,
    height: f64,
) -> Option<Contact> {
    let closest = clamp_to_rectangle(circle_center, rect_center, width, height);
    let offset = circle_center - closest;
    let dist_sq = offset.length_squared();

    if dist_sq > radius * radius + EPSILON {
        return None;
    }

    let dist = dist_sq.sqrt();
    if dist < EPSILON {
        // Center inside the rectangle: exit through the nearest edge.
        return Some(deepest_edge_contact(circle_center, radius, rect_center, width, height));
    }

    let normal = offset / dist;
    Some(Contact {
        point: circle_center - normal * radius,
        normal,
        penetration: radius - dist,
    })
}

/// Contact for a circle whose center lies inside the rectangle: push it out
/// through whichever edge is closest.
fn deepest_edge_contact(
    circle_center: Vec2,
    radius: f64,
    rect_center: Vec2,
    width: f64,
    height: f64,
) -> Contact {
    let hw = width * 0.5;
    let hh = height * 0.5;
    let local = circle_center - rect_center;

    let to_right = hw - local.x;
    let to_left = hw + local.x;
    let to_top = hh - local.y;
    let to_bottom = hh + local.y;

    let mut edge_dist = to_right;
    let mut normal = Vec2::UNIT_X;
    if to_left < edge_dist {
        edge_dist = to_left;
        normal = Vec2::new(-1.0, 0.0);
    }
    if to_top < edge_dist {
        edge_dist = to_top;
        normal = Vec2::UNIT_Y;
    }
    if to_bottom < edge_dist {
        edge_dist = to_bottom;
        normal = Vec2::new(0.0, -1.0);
    }

    Contact {
        point: circle_center,
        normal,
        penetration: radius + edge_dist,
    }
}

/// Rectangle vs rectangle via SAT on the two world axes. Normal points from
/// the first rectangle toward the second, along the axis of least overlap.
#[must_use]
pub fn rectangle_rectangle(
    ca: Vec2,
    wa: f64,
    ha: f64,
    cb: Vec2,
    wb: f64,
    hb: f64,
) -> Option<Contact> {
    let dx = cb.x - ca.x;
    let dy = cb.y - ca.y;
    let overlap_x = (wa + wb) * 0.5 - dx.abs();
    let overlap_y = (ha + hb) * 0.5 - dy.abs();

    if overlap_x <= EPSILON || overlap_y <= EPSILON {
        return None;
    }

    let (penetration, normal) = if overlap_x < overlap_y {
        let sign = if dx >= 0.0 { 1.0 } else { -1.0 };
        (overlap_x, Vec2::new(sign, 0.0))
    } else {
        let sign = if dy >= 0.0 { 1.0 } else { -1.0 };
        (overlap_y, Vec2::new(0.0, sign))
    };

    // Center of the overlap region.
    let min_x = (ca.x - wa * 0.5).max(cb.x - wb * 0.5);
    let max_x = (ca.x + wa * 0.5).min(cb.x + wb * 0.5);
    let min_y = (ca.y - ha * 0.5).max(cb.y - hb * 0.5);
    let max_y = (ca.y + ha * 0.5).min(cb.y + hb * 0.5);
    let point = Vec2::new((min_x + max_x) * 0.5, (min_y + max_y) * 0.5);

    Some(Contact {
        point,
        normal,
        penetration,
    })
}

// ============================================================================
// Tests
// ============================================================================
