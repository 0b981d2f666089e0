//! planar-physics: Deterministic Fixed-Timestep 2D Physics for Top-Down Games
//!
//! A 2D rigid-body engine built for top-down gameplay: bodies are circles
//! and axis-aligned rectangles, there is no rotational state, and the
//! world's "gravity" is a ground-drag coefficient instead of a downward
//! pull. The simulation advances in fixed sub-steps driven by a real-time
//! accumulator, detects and resolves contacts, and reports every colliding
//! pair through a start/active/end event lifecycle.
//!
//! # Features
//!
//! - **Fixed timestep**: real-time slices accumulate into uniform sub-steps,
//!   clamped so one stall cannot snowball
//! - **Spatial-hash broad phase**: sub-quadratic candidate pairs with a
//!   reverse index for cheap removal
//! - **Continuous collision detection**: exact circle-circle time of impact
//!   and Minkowski slab raycasts keep fast bodies out of thin walls
//! - **Sequential-impulse solver**: restitution + Coulomb friction impulses,
//!   then Baumgarte position correction for stacked contacts
//! - **Collision lifecycle events**: world-wide and per-body typed pub/sub,
//!   with sensors that detect and notify but never push
//! - **Layer masks**: bilateral resolution masks and unilateral event masks
//!   decide independently who gets pushed and who gets notified
//!
//! # Example
//!
//! ```rust
//! use planar_physics::{Body, Shape, Vec2, World, WorldConfig};
//!
//! let mut world = World::new(WorldConfig::default())?;
//!
//! // A ball rolling toward a static wall
//! let mut ball = Body::new(Shape::circle(Vec2::new(0.0, 0.0), 10.0), 1.0)?;
//! ball.set_velocity(Vec2::new(50.0, 0.0));
//! let ball_id = world.add_body(ball);
//!
//! let mut wall = Body::new(Shape::rectangle(Vec2::new(200.0, 0.0), 20.0, 400.0), 1.0)?;
//! wall.set_static(true);
//! world.add_body(wall);
//!
//! // Tick on the host's clock; the world sub-steps at 1/60 s internally
//! for _ in 0..120 {
//!     world.step(1.0 / 60.0);
//! }
//!
//! assert!(world.body(ball_id).unwrap().position().x < 190.0);
//! # Ok::<(), planar_physics::PhysicsError>(())
//! ```
//!
//! # Modules
//!
//! - [`math`]: `Vec2` and the epsilon guards every other module leans on
//! - [`aabb`]: bounding boxes and the slab raycast used by CCD
//! - [`shape`]: circle and rectangle primitives; a shape's center *is* the
//!   owning body's position
//! - [`material`]: restitution/friction pairs and their combine rules
//! - [`body`]: rigid bodies, mass encoding, per-body events
//! - [`filter`]: layer/mask predicates and the Cantor pair key
//! - [`spatial_hash`]: the uniform-grid broad phase
//! - [`narrow_phase`]: per-shape-pair manifold computation
//! - [`ccd`]: swept tests and time of impact
//! - [`solver`]: impulse resolution and position correction
//! - [`event`]: the collision event types and emitter
//! - [`world`]: the owning world and its fixed-step loop
//! - [`error`]: the error type for invariant violations
//!
//! # Threading
//!
//! A world is single-threaded: `step` runs every phase to completion on the
//! calling thread, and event handlers are invoked inline between detection
//! and resolution. The only process-global state is the body id counter.

#![warn(missing_docs)]

pub mod aabb;
pub mod body;
pub mod ccd;
pub mod error;
pub mod event;
pub mod filter;
pub mod material;
pub mod math;
pub mod narrow_phase;
pub mod shape;
pub mod solver;
pub mod spatial_hash;
pub mod world;

// Re-export the everyday surface at the crate root.
pub use aabb::{Aabb, RayHit};
pub use body::{Body, BodyId};
pub use ccd::{needs_swept_test, swept_test, TimeOfImpact};
pub use error::PhysicsError;
pub use event::{CollisionEvent, CollisionEventKind, EventEmitter, HandlerId};
pub use filter::{can_detect_collision, can_emit_event, can_resolve_collision, pair_key};
pub use material::Material;
pub use math::{Vec2, EPSILON, EPSILON_SQ};
pub use narrow_phase::{Contact, Manifold};
pub use shape::Shape;
pub use solver::SolverConfig;
pub use spatial_hash::SpatialHash;
pub use world::{World, WorldConfig};
