//! Physics World
//!
//! [`World`] owns the body set and orchestrates one simulation frame:
//! a fixed-timestep accumulator on the outside, and inside each sub-step
//! the phase sequence CCD -> broad phase -> narrow phase -> event dispatch
//! -> resolution -> remaining integration -> broad-phase sync.
//!
//! Real time is fed to [`World::step`] in arbitrary slices; the accumulator
//! converts them into uniform `time_step` sub-steps and carries the
//! remainder. A slice longer than `max_sub_steps` whole steps is clamped
//! first, so one long stall cannot snowball into an ever-growing backlog
//! (the "spiral of death").
//!
//! Everything is single-threaded and synchronous: `step` runs to completion,
//! event handlers run inline between detection and resolution, and queries
//! are safe between steps but not during one.

use hashbrown::HashMap;
use log::{debug, trace};

use crate::aabb::Aabb;
use crate::body::{Body, BodyId};
use crate::ccd;
use crate::error::PhysicsError;
use crate::event::{CollisionEvent, CollisionEventKind, EventEmitter, HandlerId};
use crate::filter::{can_emit_event, can_resolve_collision, pair_key};
use crate::math::Vec2;
use crate::narrow_phase::{detect, Manifold};
use crate::shape::Shape;
use crate::solver::{resolve, SolverConfig};
use crate::spatial_hash::SpatialHash;

// ============================================================================
// WorldConfig
// ============================================================================

/// World construction parameters. All fields have workable defaults.
#[derive(Clone, Copy, Debug)]
pub struct WorldConfig {
    /// Velocity-proportional drag coefficient for the top-down ground
    /// plane. Historically called "gravity"; it scales a mass-weighted
    /// damping term, it is not a directional acceleration.
    pub damping: f64,
    /// Fixed sub-step duration in seconds.
    pub time_step: f64,
    /// Maximum sub-steps per `step` call.
    pub max_sub_steps: usize,
    /// Broad-phase grid cell side length.
    pub cell_size: f64,
    /// Contact solver tuning.
    pub solver: SolverConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            damping: 1.0,
            time_step: 1.0 / 60.0,
            max_sub_steps: 8,
            cell_size: 100.0,
            solver: SolverConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Validate every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(PhysicsError::InvalidConfig {
                reason: "time_step must be finite and positive",
            });
        }
        if self.max_sub_steps == 0 {
            return Err(PhysicsError::InvalidConfig {
                reason: "max_sub_steps must be at least 1",
            });
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(PhysicsError::InvalidConfig {
                reason: "cell_size must be finite and positive",
            });
        }
        if !self.damping.is_finite() || self.damping < 0.0 {
            return Err(PhysicsError::InvalidConfig {
                reason: "damping must be finite and non-negative",
            });
        }
        if self.solver.velocity_iterations == 0 {
            return Err(PhysicsError::InvalidConfig {
                reason: "velocity_iterations must be at least 1",
            });
        }
        if self.solver.position_iterations == 0 {
            return Err(PhysicsError::InvalidConfig {
                reason: "position_iterations must be at least 1",
            });
        }
        if !(0.0..=1.0).contains(&self.solver.position_correction) {
            return Err(PhysicsError::InvalidConfig {
                reason: "position_correction must be in [0, 1]",
            });
        }
        if self.solver.position_slop < 0.0 {
            return Err(PhysicsError::InvalidConfig {
                reason: "position_slop must be non-negative",
            });
        }
        Ok(())
    }
}

// ============================================================================
// World
// ============================================================================

/// State kept per colliding pair for lifecycle diffing.
#[derive(Clone, Debug)]
struct PairRecord {
    body_a: BodyId,
    body_b: BodyId,
    is_sensor: bool,
    manifold: Manifold,
}

/// A 2D physics world: the body set, broad phase, event surface, and the
/// fixed-step simulation loop.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    bodies: HashMap<BodyId, Body>,
    broad_phase: SpatialHash,
    emitter: EventEmitter,
    /// Pairs colliding this frame, keyed by Cantor pair key.
    current: HashMap<u128, PairRecord>,
    /// Pairs that were colliding last frame.
    previous: HashMap<u128, PairRecord>,
    /// Seconds already integrated this sub-step by the CCD pass.
    consumed_time: HashMap<BodyId, f64>,
    accumulator: f64,
    time: f64,
}

impl World {
    /// Create a world from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidConfig`] when a parameter is out of
    /// range.
    pub fn new(config: WorldConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self {
            bodies: HashMap::new(),
            broad_phase: SpatialHash::new(config.cell_size),
            emitter: EventEmitter::new(),
            current: HashMap::new(),
            previous: HashMap::new(),
            consumed_time: HashMap::new(),
            accumulator: 0.0,
            time: 0.0,
            config,
        })
    }

    // ------------------------------------------------------------------
    // Body management
    // ------------------------------------------------------------------

    /// Take ownership of a body and register it in the broad phase.
    pub fn add_body(&mut self, body: Body) -> BodyId {
        let id = body.id();
        self.broad_phase.insert(&body);
        self.bodies.insert(id, body);
        id
    }

    /// Remove a body, evicting it from the broad phase. Collision pairs it
    /// was part of produce their end event on the next step.
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        self.broad_phase.remove_id(id);
        self.bodies.remove(&id)
    }

    /// Shared access to a body.
    #[inline]
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    /// Mutable access to a body. Positions changed through this handle are
    /// picked up by the broad phase at the next step.
    #[inline]
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(&id)
    }

    /// Iterate over all bodies (unspecified order).
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values()
    }

    /// Number of bodies in the world.
    #[inline]
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Drop every body and all pair tracking.
    pub fn clear_bodies(&mut self) {
        self.bodies.clear();
        self.broad_phase.clear();
        self.current.clear();
        self.previous.clear();
        self.consumed_time.clear();
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Current drag coefficient.
    #[inline]
    #[must_use]
    pub fn damping(&self) -> f64 {
        self.config.damping
    }

    /// Change the drag coefficient.
    #[inline]
    pub fn set_damping(&mut self, damping: f64) {
        self.config.damping = damping;
    }

    /// Accumulated simulation time in seconds (whole sub-steps only).
    #[inline]
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The active configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // World-wide events
    // ------------------------------------------------------------------

    /// Subscribe to collision events for every pair in the world.
    pub fn on<F>(&mut self, kind: CollisionEventKind, handler: F) -> HandlerId
    where
        F: FnMut(&CollisionEvent) + 'static,
    {
        self.emitter.on(kind, handler)
    }

    /// Unsubscribe a world-wide handler.
    pub fn off(&mut self, kind: CollisionEventKind, id: HandlerId) -> bool {
        self.emitter.off(kind, id)
    }

    /// Drop world-wide handlers for `kind`, or all of them when `None`.
    pub fn remove_all_listeners(&mut self, kind: Option<CollisionEventKind>) {
        self.emitter.remove_all_listeners(kind);
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    /// Advance the simulation by `delta` real seconds.
    ///
    /// Runs zero or more fixed sub-steps depending on the accumulator;
    /// leftover time below one `time_step` is carried to the next call.
    pub fn step(&mut self, delta: f64) {
        if !delta.is_finite() || delta <= 0.0 {
            return;
        }
        let cap = self.config.max_sub_steps as f64 * self.config.time_step;
        self.accumulator += delta.min(cap);

        let mut steps = 0;
        while self.accumulator >= self.config.time_step && steps < self.config.max_sub_steps {
            self.fixed_step(self.config.time_step);
            self.accumulator -= self.config.time_step;
            self.time += self.config.time_step;
            steps += 1;
        }
    }

    /// One fixed sub-step of `dt` seconds.
    fn fixed_step(&mut self, dt: f64) {
        trace!("fixed_step: dt={dt} bodies={}", self.bodies.len());
        self.consumed_time.clear();

        let pairs = self.broad_phase.pairs(&self.bodies);

        self.ccd_pass(&pairs, dt);
        let resolvable = self.detect_pass(&pairs);
        self.dispatch_events();
        resolve(&mut self.bodies, &resolvable, &self.config.solver);
        self.finish_integration(dt);

        for body in self.bodies.values() {
            self.broad_phase.update(body);
        }
        for body in self.bodies.values_mut() {
            body.clear_step_inputs();
        }

        // This frame's pairs become next frame's baseline.
        core::mem::swap(&mut self.previous, &mut self.current);
        self.current.clear();
    }

    /// Swept tests for fast movers: advance hit pairs to their time of
    /// impact and log the time as consumed. One advancement per body per
    /// step, at most.
    fn ccd_pass(&mut self, pairs: &[(BodyId, BodyId)], dt: f64) {
        for &(id_a, id_b) in pairs {
            if self.consumed_time.contains_key(&id_a) || self.consumed_time.contains_key(&id_b) {
                continue;
            }
            let (Some(a), Some(b)) = (self.bodies.get(&id_a), self.bodies.get(&id_b)) else {
                continue;
            };
            if !ccd::needs_swept_test(a, dt) && !ccd::needs_swept_test(b, dt) {
                continue;
            }
            let Some(toi) = ccd::swept_test(a, b, dt) else {
                continue;
            };

            debug!("ccd: pair ({id_a}, {id_b}) advanced by {:.6}s", toi.t);
            let damping = self.config.damping;
            if let Some(a) = self.bodies.get_mut(&id_a) {
                a.integrate(toi.t, damping);
            }
            if let Some(b) = self.bodies.get_mut(&id_b) {
                b.integrate(toi.t, damping);
            }
            self.consumed_time.insert(id_a, toi.t);
            self.consumed_time.insert(id_b, toi.t);
        }
    }

    /// Narrow phase over all candidate pairs. Fills `current` with the
    /// event-eligible pairs and returns the manifolds the solver may touch.
    fn detect_pass(&mut self, pairs: &[(BodyId, BodyId)]) -> Vec<Manifold> {
        let mut resolvable = Vec::new();

        for &(id_a, id_b) in pairs {
            let (Some(a), Some(b)) = (self.bodies.get(&id_a), self.bodies.get(&id_b)) else {
                continue;
            };
            let Some(manifold) = detect(a, b) else {
                continue;
            };

            if can_emit_event(a, b) {
                self.current.insert(
                    pair_key(id_a, id_b),
                    PairRecord {
                        body_a: id_a,
                        body_b: id_b,
                        is_sensor: a.is_sensor || b.is_sensor,
                        manifold: manifold.clone(),
                    },
                );
            }
            if can_resolve_collision(a, b) {
                resolvable.push(manifold);
            }
        }

        resolvable
    }

    /// Diff `current` against `previous` and dispatch start/active/end.
    /// World-wide handlers run before the two per-body emitters; listeners
    /// observe pre-impulse velocities.
    fn dispatch_events(&mut self) {
        let mut batch: Vec<(CollisionEventKind, CollisionEvent)> = Vec::new();

        let mut keys: Vec<u128> = self.current.keys().copied().collect();
        keys.sort_unstable();
        for key in keys {
            let record = &self.current[&key];
            let kind = if self.previous.contains_key(&key) {
                CollisionEventKind::Active
            } else {
                CollisionEventKind::Start
            };
            batch.push((
                kind,
                CollisionEvent {
                    body_a: record.body_a,
                    body_b: record.body_b,
                    is_sensor: record.is_sensor,
                    manifold: Some(record.manifold.clone()),
                },
            ));
        }

        let mut ended: Vec<u128> = self
            .previous
            .keys()
            .filter(|key| !self.current.contains_key(*key))
            .copied()
            .collect();
        ended.sort_unstable();
        for key in ended {
            let record = &self.previous[&key];
            batch.push((
                CollisionEventKind::End,
                CollisionEvent {
                    body_a: record.body_a,
                    body_b: record.body_b,
                    is_sensor: record.is_sensor,
                    manifold: None,
                },
            ));
        }

        for (kind, event) in &batch {
            self.emitter.emit(*kind, event);
            if let Some(a) = self.bodies.get_mut(&event.body_a) {
                a.emitter_mut().emit(*kind, event);
            }
            if let Some(b) = self.bodies.get_mut(&event.body_b) {
                b.emitter_mut().emit(*kind, event);
            }
        }
    }

    /// Integrate every body by whatever part of the step CCD has not
    /// already consumed.
    fn finish_integration(&mut self, dt: f64) {
        let damping = self.config.damping;
        for body in self.bodies.values_mut() {
            let consumed = self
                .consumed_time
                .get(&body.id())
                .copied()
                .unwrap_or(0.0);
            let remaining = (dt - consumed).max(0.0);
            if remaining > 0.0 {
                body.integrate(remaining, damping);
            }
        }
    }

    // ------------------------------------------------------------------
    // Queries (read-only; call between steps)
    // ------------------------------------------------------------------

    /// Bodies whose shape contains the point.
    #[must_use]
    pub fn query_point(&self, point: Vec2) -> Vec<&Body> {
        let probe = Aabb::new(point, point);
        let mut out: Vec<&Body> = self
            .broad_phase
            .query_region(&probe)
            .into_iter()
            .filter_map(|id| self.bodies.get(&id))
            .filter(|body| body.shape.contains(point))
            .collect();
        out.sort_unstable_by_key(|body| body.id());
        out
    }

    /// Bodies whose AABB overlaps the region.
    #[must_use]
    pub fn query_region(&self, region: &Aabb) -> Vec<&Body> {
        let mut out: Vec<&Body> = self
            .broad_phase
            .query_region(region)
            .into_iter()
            .filter_map(|id| self.bodies.get(&id))
            .filter(|body| body.aabb().overlaps(region))
            .collect();
        out.sort_unstable_by_key(|body| body.id());
        out
    }

    /// Bodies whose shape overlaps the given shape.
    #[must_use]
    pub fn query_overlaps_with_shape(&self, shape: &Shape) -> Vec<&Body> {
        let mut out: Vec<&Body> = self
            .broad_phase
            .query_region(&shape.aabb())
            .into_iter()
            .filter_map(|id| self.bodies.get(&id))
            .filter(|body| body.shape.overlaps(shape))
            .collect();
        out.sort_unstable_by_key(|body| body.id());
        out
    }

    /// Bodies overlapping the given body (itself excluded).
    #[must_use]
    pub fn query_overlaps_with_body(&self, id: BodyId) -> Vec<&Body> {
        let Some(body) = self.bodies.get(&id) else {
            return Vec::new();
        };
        self.query_overlaps_with_shape(&body.shape)
            .into_iter()
            .filter(|other| other.id() != id)
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
