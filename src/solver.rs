//! Contact Resolution
//!
//! Sequential-impulse solver in two phases:
//!
//! 1. **Velocity phase** — per contact, a normal impulse sized by combined
//!    restitution and the bodies' inverse masses, then a Coulomb friction
//!    impulse clamped to `|jt| <= mu * |jn|`. Iterated so stacked and
//!    chained contacts propagate impulses to a fixed point.
//! 2. **Position phase** — Baumgarte projection: whatever penetration the
//!    velocity phase left behind is removed directly from the positions,
//!    split by inverse-mass ratio, with a small slop left in place so
//!    resting contacts do not jitter.
//!
//! Restitution is suppressed in two situations: a body deliberately
//! steering into a static wall (walking into a wall should not bounce you
//! off it), and contacts slower than the resting threshold (micro-bounces
//! at rest never die out on their own).

use hashbrown::HashMap;

use crate::body::{Body, BodyId};
use crate::math::{Vec2, EPSILON, EPSILON_SQ};
use crate::narrow_phase::{detect, Manifold};

// ============================================================================
// SolverConfig
// ============================================================================

/// Tuning parameters for contact resolution.
#[derive(Clone, Copy, Debug)]
pub struct SolverConfig {
    /// Passes over all manifolds in the velocity phase.
    pub velocity_iterations: usize,
    /// Passes over all manifolds in the position phase.
    pub position_iterations: usize,
    /// Penetration depth tolerated without correction.
    pub position_slop: f64,
    /// Fraction of the remaining penetration removed per position pass.
    pub position_correction: f64,
    /// Normal speeds below this resolve without restitution.
    pub resting_velocity_threshold: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            velocity_iterations: 6,
            position_iterations: 4,
            position_slop: 0.01,
            position_correction: 0.8,
            resting_velocity_threshold: 0.5,
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve a batch of manifolds against the body set. Manifolds are assumed
/// pre-filtered: no sensors, no static-static pairs.
pub fn resolve(bodies: &mut HashMap<BodyId, Body>, manifolds: &[Manifold], config: &SolverConfig) {
    for _ in 0..config.velocity_iterations {
        for manifold in manifolds {
            solve_velocity(bodies, manifold, config);
        }
    }
    for _ in 0..config.position_iterations {
        for manifold in manifolds {
            solve_position(bodies, manifold, config);
        }
    }
}

/// One velocity pass over one manifold.
fn solve_velocity(bodies: &mut HashMap<BodyId, Body>, manifold: &Manifold, config: &SolverConfig) {
    let Some(a) = bodies.get(&manifold.body_a) else {
        return;
    };
    let Some(b) = bodies.get(&manifold.body_b) else {
        return;
    };

    let inv_mass_a = a.inv_mass();
    let inv_mass_b = b.inv_mass();
    let inv_mass_sum = inv_mass_a + inv_mass_b;
    if inv_mass_sum < EPSILON {
        return;
    }

    let a_static = a.is_static();
    let b_static = b.is_static();
    let movement_a = a.movement();
    let movement_b = b.movement();
    let mut velocity_a = a.velocity();
    let mut velocity_b = b.velocity();

    for contact in &manifold.contacts {
        let normal = contact.normal;
        let relative = velocity_b - velocity_a;
        let normal_speed = relative.dot(normal);
        if normal_speed > 0.0 {
            // Already separating.
            continue;
        }

        let restitution = effective_restitution(
            manifold.restitution,
            normal,
            normal_speed,
            a_static,
            b_static,
            movement_a,
            movement_b,
            config,
        );

        let j = -(1.0 + restitution) * normal_speed / inv_mass_sum;
        velocity_a.add_scaled(normal, -j * inv_mass_a);
        velocity_b.add_scaled(normal, j * inv_mass_b);

        // Coulomb friction against the post-impulse relative velocity.
        let relative = velocity_b - velocity_a;
        let mut tangent = relative - normal * relative.dot(normal);
        if tangent.length_squared() <= EPSILON_SQ {
            continue;
        }
        tangent.normalize_in_place();

        let jt_raw = -relative.dot(tangent) / inv_mass_sum;
        let max_friction = j.abs() * manifold.friction;
        let jt = jt_raw.clamp(-max_friction, max_friction);
        velocity_a.add_scaled(tangent, -jt * inv_mass_a);
        velocity_b.add_scaled(tangent, jt * inv_mass_b);
    }

    if let Some(a) = bodies.get_mut(&manifold.body_a) {
        if !a_static {
            a.set_velocity_internal(velocity_a);
        }
    }
    if let Some(b) = bodies.get_mut(&manifold.body_b) {
        if !b_static {
            b.set_velocity_internal(velocity_b);
        }
    }
}

/// Restitution for one contact, with the resting and intentional-movement
/// overrides applied.
#[allow(clippy::too_many_arguments)]
fn effective_restitution(
    combined: f64,
    normal: Vec2,
    normal_speed: f64,
    a_static: bool,
    b_static: bool,
    movement_a: Vec2,
    movement_b: Vec2,
    config: &SolverConfig,
) -> f64 {
    // Deliberate movement into a static wall resolves dead, never bouncy.
    let pushing_into_wall = match (a_static, b_static) {
        (true, false) => {
            movement_b.length_squared() > EPSILON_SQ && movement_b.dot(normal) < -EPSILON
        }
        (false, true) => {
            movement_a.length_squared() > EPSILON_SQ && movement_a.dot(normal) > EPSILON
        }
        _ => false,
    };
    if pushing_into_wall {
        return 0.0;
    }

    // Resting contacts get no bounce either, or stacks never settle.
    if normal_speed.abs() < config.resting_velocity_threshold {
        return 0.0;
    }

    combined
}

/// One position pass over one manifold: re-detect at current positions and
/// project the residual penetration out, split by inverse-mass ratio.
fn solve_position(bodies: &mut HashMap<BodyId, Body>, manifold: &Manifold, config: &SolverConfig) {
    let (Some(a), Some(b)) = (bodies.get(&manifold.body_a), bodies.get(&manifold.body_b)) else {
        return;
    };

    let inv_mass_a = a.inv_mass();
    let inv_mass_b = b.inv_mass();
    let inv_mass_sum = inv_mass_a + inv_mass_b;
    if inv_mass_sum < EPSILON {
        return;
    }

    // Fresh penetration: earlier corrections of this pass (and neighboring
    // stacked pairs) have already moved these bodies.
    let Some(fresh) = detect(a, b) else {
        return;
    };

    for contact in &fresh.contacts {
        let depth = (contact.penetration - config.position_slop).max(0.0);
        if depth <= 0.0 {
            continue;
        }
        let correction = contact.normal * (depth * config.position_correction / inv_mass_sum);

        if let Some(a) = bodies.get_mut(&manifold.body_a) {
            let shift = correction * inv_mass_a;
            *a.position_mut() -= shift;
        }
        if let Some(b) = bodies.get_mut(&manifold.body_b) {
            let shift = correction * inv_mass_b;
            *b.position_mut() += shift;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
