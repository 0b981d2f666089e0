//! Rigid Bodies
//!
//! A [`Body`] binds a [`Shape`] to physical state: mass, velocity,
//! accumulated force, an intentional movement direction, a material, and
//! the layer/mask bits that decide who it collides with and who hears
//! about it.
//!
//! The body's position *is* its shape's center — one storage cell, no
//! synchronization. [`Body::position`] and [`Body::set_position`] delegate
//! straight to the shape.
//!
//! # Static bodies
//!
//! Staticness is encoded exclusively as infinite mass (`inv_mass == 0`).
//! Bodies are always constructed dynamic — passing a non-finite or
//! non-positive mass is an error — and become static through
//! [`Body::set_static`], which also zeroes their velocity and acceleration.
//! Forces, impulses and mass changes on a static body are logged no-ops.

use core::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use crate::aabb::Aabb;
use crate::error::PhysicsError;
use crate::event::{CollisionEvent, CollisionEventKind, EventEmitter, HandlerId};
use crate::material::Material;
use crate::math::{Vec2, EPSILON_SQ};
use crate::shape::Shape;

/// Unique body identifier, monotonic across the whole process. Ids are never
/// reused, even across worlds.
pub type BodyId = u64;

static NEXT_BODY_ID: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// Body
// ============================================================================

/// A rigid body: shape, mass, kinematic state, filtering bits, and a
/// per-body event emitter.
#[derive(Debug)]
pub struct Body {
    id: BodyId,
    /// Collision shape. Its center is the body's position.
    pub shape: Shape,
    velocity: Vec2,
    acceleration: Vec2,
    force_accumulator: Vec2,
    /// Intentional movement direction, unit-length or zero. Set through
    /// [`Body::apply_movement`], cleared at the end of every step.
    movement: Vec2,
    mass: f64,
    inv_mass: f64,
    /// Mass to restore when a static body is made dynamic again.
    stored_mass: f64,
    /// Surface material.
    pub material: Material,
    /// Sensors detect and always emit, but never produce impulses.
    pub is_sensor: bool,
    /// Which layer bits this body occupies.
    pub layer: u32,
    /// Bilateral: layers that may exchange impulses with this body.
    pub resolution_mask: u32,
    /// Unilateral: layers whose contact notifies this body's listeners.
    pub event_mask: u32,
    emitter: EventEmitter,
}

impl Body {
    /// Create a dynamic body.
    ///
    /// # Errors
    ///
    /// `mass` must be finite and positive; static bodies are made with
    /// [`Body::set_static`], not by passing infinity here.
    pub fn new(shape: Shape, mass: f64) -> Result<Self, PhysicsError> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(PhysicsError::InvalidMass { mass });
        }
        Ok(Self {
            id: NEXT_BODY_ID.fetch_add(1, Ordering::Relaxed),
            shape,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            force_accumulator: Vec2::ZERO,
            movement: Vec2::ZERO,
            mass,
            inv_mass: 1.0 / mass,
            stored_mass: mass,
            material: Material::DEFAULT,
            is_sensor: false,
            layer: 1,
            resolution_mask: u32::MAX,
            event_mask: u32::MAX,
            emitter: EventEmitter::new(),
        })
    }

    /// Unique id assigned at construction.
    #[inline]
    #[must_use]
    pub fn id(&self) -> BodyId {
        self.id
    }

    /// World-space position (the shape's center).
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.shape.center()
    }

    /// Teleport the body. Writes through to the shape's center.
    #[inline]
    pub fn set_position(&mut self, position: Vec2) {
        *self.shape.center_mut() = position;
    }

    /// Mutable access to the position cell, for integration and the solver's
    /// position correction.
    #[inline]
    pub(crate) fn position_mut(&mut self) -> &mut Vec2 {
        self.shape.center_mut()
    }

    /// Current velocity.
    #[inline]
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Set the velocity. A logged no-op on static bodies, which are
    /// immovable by invariant.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        if self.is_static() {
            debug!("set_velocity ignored on static body {}", self.id);
            return;
        }
        self.velocity = velocity;
    }

    /// Acceleration computed from last step's forces.
    #[inline]
    #[must_use]
    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    /// Intentional movement direction (unit-length or zero).
    #[inline]
    #[must_use]
    pub fn movement(&self) -> Vec2 {
        self.movement
    }

    /// Mass in `(0, +inf]`; infinite for static bodies.
    #[inline]
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Inverse mass; zero for static bodies.
    #[inline]
    #[must_use]
    pub fn inv_mass(&self) -> f64 {
        self.inv_mass
    }

    /// Whether this body has infinite mass.
    #[inline]
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// Change the mass of a dynamic body. A logged no-op on static bodies.
    ///
    /// # Errors
    ///
    /// The new mass must be finite and positive.
    pub fn set_mass(&mut self, mass: f64) -> Result<(), PhysicsError> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(PhysicsError::InvalidMass { mass });
        }
        if self.is_static() {
            debug!("set_mass ignored on static body {}", self.id);
            return Ok(());
        }
        self.mass = mass;
        self.inv_mass = 1.0 / mass;
        self.stored_mass = mass;
        Ok(())
    }

    /// Toggle staticness. Making a body static zeroes its velocity and
    /// acceleration; making it dynamic again restores its last finite mass.
    pub fn set_static(&mut self, is_static: bool) {
        if is_static == self.is_static() {
            return;
        }
        if is_static {
            self.stored_mass = self.mass;
            self.mass = f64::INFINITY;
            self.inv_mass = 0.0;
            self.velocity = Vec2::ZERO;
            self.acceleration = Vec2::ZERO;
        } else {
            self.mass = self.stored_mass;
            self.inv_mass = 1.0 / self.stored_mass;
        }
    }

    /// Accumulate a force for the next integration. No-op on static bodies.
    pub fn apply_force(&mut self, force: Vec2) {
        if self.is_static() {
            return;
        }
        self.force_accumulator += force;
    }

    /// Apply an instantaneous velocity change. No-op on static bodies.
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        if self.is_static() {
            return;
        }
        self.velocity.add_scaled(impulse, self.inv_mass);
    }

    /// Declare an intentional movement direction for this step. The
    /// direction is normalized (zero stays zero); the solver uses it to
    /// suppress restitution when a body is deliberately pushing into a
    /// static wall. Cleared at the end of every step.
    pub fn apply_movement(&mut self, direction: Vec2) {
        self.movement = direction.normalize();
    }

    /// Axis-aligned bounding box of the shape at its current position.
    #[inline]
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        self.shape.aabb()
    }

    /// Kinetic energy `m * |v|^2 / 2`. Zero for static bodies.
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        if self.is_static() {
            return 0.0;
        }
        0.5 * self.mass * self.velocity.length_squared()
    }

    /// Union of the two masks; the broad phase detects a pair when either
    /// resolution or events could come of it.
    #[inline]
    #[must_use]
    pub fn collision_mask(&self) -> u32 {
        self.event_mask | self.resolution_mask
    }

    /// Semi-implicit Euler integration over `dt` seconds with top-down drag.
    ///
    /// The drag factor `1 - damping * friction * mass * dt` is mass-weighted
    /// so heavier bodies shed speed faster, modeling ground contact from a
    /// top-down camera. Velocities below the epsilon floor snap to zero so
    /// resting bodies come to an exact stop.
    pub fn integrate(&mut self, dt: f64, damping: f64) {
        if self.is_static() {
            return;
        }
        self.acceleration = self.force_accumulator * self.inv_mass;
        self.velocity.add_scaled(self.acceleration, dt);

        let drag = 1.0 - damping * self.material.friction * self.mass * dt;
        self.velocity *= drag.max(0.0);

        if self.velocity.length_squared() < EPSILON_SQ {
            self.velocity = Vec2::ZERO;
        }
        let velocity = self.velocity;
        self.shape.center_mut().add_scaled(velocity, dt);
    }

    /// Drop accumulated force and movement intent. Called by the world at
    /// the end of every fixed step.
    pub(crate) fn clear_step_inputs(&mut self) {
        self.force_accumulator = Vec2::ZERO;
        self.movement = Vec2::ZERO;
    }

    /// Direct velocity write for the solver, bypassing the static guard the
    /// caller has already checked.
    #[inline]
    pub(crate) fn set_velocity_internal(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    // ------------------------------------------------------------------
    // Per-body events
    // ------------------------------------------------------------------

    /// Subscribe to this body's collision events.
    pub fn on<F>(&mut self, kind: CollisionEventKind, handler: F) -> HandlerId
    where
        F: FnMut(&CollisionEvent) + 'static,
    {
        self.emitter.on(kind, handler)
    }

    /// Unsubscribe a handler registered with [`Body::on`].
    pub fn off(&mut self, kind: CollisionEventKind, id: HandlerId) -> bool {
        self.emitter.off(kind, id)
    }

    /// Drop this body's handlers for `kind`, or all of them when `None`.
    pub fn remove_all_listeners(&mut self, kind: Option<CollisionEventKind>) {
        self.emitter.remove_all_listeners(kind);
    }

    #[inline]
    pub(crate) fn emitter_mut(&mut self) -> &mut EventEmitter {
        &mut self.emitter
    }
}

// ============================================================================
// Tests
// ============================================================================
