//! Collision Filtering (Layer/Mask System)
//!
//! Bitmask-based filtering with two orthogonal masks per body:
//!
//! - `resolution_mask` is **bilateral**: both sides must accept the other's
//!   layer before the solver may exchange impulses.
//! - `event_mask` is **unilateral**: one interested side is enough for the
//!   pair to emit collision events.
//!
//! The broad phase filters on the union of both (a body's *collision mask*),
//! so a pair that can neither resolve nor emit is never even detected.
//!
//! # Usage
//!
//! ```
//! use planar_physics::{Body, Shape, Vec2};
//!
//! // Layer 0 = player, layer 1 = enemy, layer 2 = pickup zone
//! let mut player = Body::new(Shape::circle(Vec2::ZERO, 10.0), 1.0).unwrap();
//! player.layer = 1 << 0;
//! player.resolution_mask = 1 << 1;            // enemies push the player
//! player.event_mask = (1 << 1) | (1 << 2);    // but pickups only notify
//! ```

use crate::body::{Body, BodyId};

/// Bilateral broad-phase filter: each side's collision mask must accept the
/// other's layer.
#[inline]
#[must_use]
pub fn can_detect_collision(a: &Body, b: &Body) -> bool {
    (a.collision_mask() & b.layer) != 0 && (b.collision_mask() & a.layer) != 0
}

/// Bilateral solver filter: sensors never resolve, and both resolution masks
/// must accept the other body's layer.
#[inline]
#[must_use]
pub fn can_resolve_collision(a: &Body, b: &Body) -> bool {
    !a.is_sensor
        && !b.is_sensor
        && (a.resolution_mask & b.layer) != 0
        && (b.resolution_mask & a.layer) != 0
}

/// Event filter: sensor pairs always emit; otherwise one interested event
/// mask is enough. Static pairs never emit (the broad phase already drops
/// them, this guard is for direct callers).
#[inline]
#[must_use]
pub fn can_emit_event(a: &Body, b: &Body) -> bool {
    if a.is_static() && b.is_static() {
        return false;
    }
    if a.is_sensor || b.is_sensor {
        return true;
    }
    (a.event_mask & b.layer) != 0 || (b.event_mask & a.layer) != 0
}

/// Order-independent unique key for a body pair: Cantor pairing over the
/// sorted ids, widened to `u128` so the polynomial cannot overflow.
#[inline]
#[must_use]
pub fn pair_key(a: BodyId, b: BodyId) -> u128 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let (lo, hi) = (lo as u128, hi as u128);
    (lo + hi) * (lo + hi + 1) / 2 + hi
}

// ============================================================================
// Tests
// ============================================================================
