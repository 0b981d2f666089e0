//! Continuous Collision Detection (CCD)
//!
//! Discrete stepping misses contacts whose whole approach and exit fit
//! inside one sub-step: a fast bullet simply reappears on the far side of a
//! thin wall. For bodies whose per-step displacement exceeds half their own
//! smallest extent, the world runs a swept test first and, on a hit,
//! advances both bodies only to the instant of contact.
//!
//! # Algorithms
//!
//! - **Circle vs circle**: exact quadratic time of impact on the relative
//!   motion.
//! - **Anything involving a rectangle**: Minkowski reduction — expand the
//!   target's AABB by the mover's half-extents and raycast the relative
//!   velocity against it (slab method, in [`Aabb::raycast`]).
//!
//! A returned [`TimeOfImpact`] promises that advancing both bodies by `t`
//! seconds puts them at (near-)zero penetration; pairs already overlapping
//! at the start of the step are left to the narrow phase instead.

use crate::aabb::Aabb;
use crate::body::Body;
use crate::math::{Vec2, EPSILON, EPSILON_SQ};
use crate::shape::Shape;

// ============================================================================
// TimeOfImpact
// ============================================================================

/// First instant two swept bodies touch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeOfImpact {
    /// Seconds from the start of the sub-step, in `(0, dt]`.
    pub t: f64,
    /// Surface normal at impact, pointing from body A toward body B.
    pub normal: Vec2,
}

/// Whether a body moves far enough this step to risk tunneling: its
/// displacement exceeds half its smallest AABB extent.
#[inline]
#[must_use]
pub fn needs_swept_test(body: &Body, dt: f64) -> bool {
    body.velocity().length() * dt > 0.5 * body.aabb().min_extent()
}

/// Time of impact for a body pair over the next `dt` seconds, or `None`
/// when they do not touch within the step (or already overlap).
#[must_use]
pub fn swept_test(a: &Body, b: &Body, dt: f64) -> Option<TimeOfImpact> {
    match (&a.shape, &b.shape) {
        (
            Shape::Circle {
                center: ca,
                radius: ra,
            },
            Shape::Circle {
                center: cb,
                radius: rb,
            },
        ) => swept_circle_circle(*ca, *ra, a.velocity(), *cb, *rb, b.velocity(), dt),
        _ => swept_aabb_pair(a, b, dt),
    }
}

/// Exact TOI for two moving circles: smaller root of
/// `|dp + dv t|^2 = (ra + rb)^2` within `(0, dt]`.
#[must_use]
pub fn swept_circle_circle(
    pa: Vec2,
    ra: f64,
    va: Vec2,
    pb: Vec2,
    rb: f64,
    vb: Vec2,
    dt: f64,
) -> Option<TimeOfImpact> {
    let dp = pb - pa;
    let dv = vb - va;
    let r_sum = ra + rb;

    let c = dp.length_squared() - r_sum * r_sum;
    if c <= 0.0 {
        // Already overlapping: a discrete problem, not a swept one.
        return None;
    }

    let qa = dv.length_squared();
    if qa < EPSILON_SQ {
        // No relative motion.
        return None;
    }

    let qb = 2.0 * dp.dot(dv);
    let discriminant = qb * qb - 4.0 * qa * c;
    if discriminant < 0.0 {
        return None;
    }

    let t = (-qb - discriminant.sqrt()) / (2.0 * qa);
    if t <= 0.0 || t > dt {
        return None;
    }

    let normal = (dp + dv * t).normalize();
    Some(TimeOfImpact { t, normal })
}

/// Swept test for any pair involving a rectangle: raycast A's center, moving
/// at the relative velocity, against B's AABB expanded by A's half-extents.
fn swept_aabb_pair(a: &Body, b: &Body, dt: f64) -> Option<TimeOfImpact> {
    let rel_velocity = a.velocity() - b.velocity();
    if rel_velocity.length_squared() < EPSILON_SQ {
        return None;
    }

    let half_a = {
        let aabb = a.aabb();
        Vec2::new(aabb.width() * 0.5, aabb.height() * 0.5)
    };
    let target = b.aabb().expand(half_a);

    if target.contains(a.position()) {
        // Already overlapping at the start of the step.
        return None;
    }

    let hit = target.raycast(a.position(), rel_velocity, dt)?;
    if hit.t < EPSILON {
        return None;
    }

    // The raycast reports the expanded box's outward surface normal; from
    // A's side that is B-toward-A, so flip it to the manifold convention.
    Some(TimeOfImpact {
        t: hit.t,
        normal: -hit.normal,
    })
}

/// Swept AABB entry time for a moving box against a static box, exposed for
/// region-sweep queries. Thin wrapper over [`Aabb::raycast`] with the
/// Minkowski expansion applied.
#[must_use]
pub fn swept_aabb(moving: &Aabb, velocity: Vec2, target: &Aabb, max_t: f64) -> Option<f64> {
    let half = Vec2::new(moving.width() * 0.5, moving.height() * 0.5);
    target
        .expand(half)
        .raycast(moving.center(), velocity, max_t)
        .map(|hit| hit.t)
}

// ============================================================================
// Tests
// ============================================================================
