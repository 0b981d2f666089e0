//! Integration tests for planar-physics
//!
//! End-to-end scenarios through the public API only: whole worlds stepped
//! for many frames, with assertions on final kinematic state and on the
//! collision event streams observed along the way.

use std::cell::RefCell;
use std::rc::Rc;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use planar_physics::{
    Aabb, Body, CollisionEventKind, Material, Shape, SolverConfig, Vec2, World, WorldConfig,
};

// ============================================================================
// Helpers
// ============================================================================

const DT: f64 = 1.0 / 60.0;

/// World with drag disabled, so scenarios control their energy budget.
fn frictionless_world() -> World {
    let config = WorldConfig {
        damping: 0.0,
        ..WorldConfig::default()
    };
    World::new(config).expect("default-based config is valid")
}

/// Run a world for `steps` fixed frames.
fn run_world(world: &mut World, steps: usize) {
    for _ in 0..steps {
        world.step(DT);
    }
}

fn ball(x: f64, y: f64, r: f64, velocity: Vec2, material: Material) -> Body {
    let mut body = Body::new(Shape::circle(Vec2::new(x, y), r), 1.0).unwrap();
    body.material = material;
    body.set_velocity(velocity);
    body
}

fn static_rect(x: f64, y: f64, width: f64, height: f64) -> Body {
    let mut body = Body::new(Shape::rectangle(Vec2::new(x, y), width, height), 1.0).unwrap();
    body.set_static(true);
    body
}

/// Count events of one kind, filtered to pairs involving `id`.
fn count_events(world: &mut World, kind: CollisionEventKind, id: u64) -> Rc<RefCell<usize>> {
    let counter = Rc::new(RefCell::new(0));
    let counter_in = Rc::clone(&counter);
    world.on(kind, move |event| {
        if event.body_a == id || event.body_b == id {
            *counter_in.borrow_mut() += 1;
        }
    });
    counter
}

// ============================================================================
// Scenario 1 — Elastic head-on circles
// ============================================================================

/// Two equal elastic circles meeting head-on swap velocities.
#[test]
fn test_elastic_head_on_circles_swap_velocities() {
    let mut world = frictionless_world();
    let elastic = Material::new(1.0, 0.0);
    let a = world.add_body(ball(0.0, 0.0, 10.0, Vec2::new(10.0, 0.0), elastic));
    let b = world.add_body(ball(30.0, 0.0, 10.0, Vec2::new(-10.0, 0.0), elastic));

    // Surfaces meet after 0.5 s; give the contact time to resolve fully
    run_world(&mut world, 60);

    let va = world.body(a).unwrap().velocity();
    let vb = world.body(b).unwrap().velocity();
    assert_abs_diff_eq!(va.x, -10.0, epsilon = 1e-3);
    assert_abs_diff_eq!(va.y, 0.0, epsilon = 1e-3);
    assert_abs_diff_eq!(vb.x, 10.0, epsilon = 1e-3);
    assert_abs_diff_eq!(vb.y, 0.0, epsilon = 1e-3);
}

// ============================================================================
// Scenario 2 — Bounce off a static wall
// ============================================================================

/// A ball with restitution 0.5 rebounds from a static wall at half speed
/// and never sinks past the wall face.
#[test]
fn test_bounce_off_static_wall() {
    let mut world = frictionless_world();
    let id = world.add_body(ball(
        200.0,
        300.0,
        20.0,
        Vec2::new(100.0, 0.0),
        Material::new(0.5, 0.0),
    ));
    world.add_body(static_rect(500.0, 300.0, 20.0, 600.0));

    // Step until the rebound shows up
    let mut bounced = false;
    for _ in 0..600 {
        world.step(DT);
        if world.body(id).unwrap().velocity().x < 0.0 {
            bounced = true;
            break;
        }
    }
    assert!(bounced, "ball never rebounded off the wall");

    let body = world.body(id).unwrap();
    assert!(
        body.velocity().x.abs() <= 50.0 + 1e-6,
        "rebound speed {} exceeds restitution budget",
        body.velocity().x.abs()
    );
    // Wall face at 490, ball radius 20, solver slop allowance
    assert!(
        body.position().x > 500.0 - 10.0 - 20.0 - 6.0,
        "ball sank into the wall: x = {}",
        body.position().x
    );
}

// ============================================================================
// Scenario 3 — Sensor pass-through with events
// ============================================================================

/// A sensor notifies exactly once on entry and once on exit but never
/// obstructs; the solid wall behind it does.
#[test]
fn test_sensor_pass_through_with_events() {
    let mut world = frictionless_world();
    let ball_id = world.add_body(ball(
        0.0,
        0.0,
        10.0,
        Vec2::new(50.0, 0.0),
        Material::DEFAULT,
    ));

    let mut sensor = static_rect(100.0, 0.0, 50.0, 50.0);
    sensor.is_sensor = true;
    let sensor_id = world.add_body(sensor);
    let wall_id = world.add_body(static_rect(200.0, 0.0, 20.0, 100.0));

    let sensor_starts = count_events(&mut world, CollisionEventKind::Start, sensor_id);
    let sensor_ends = count_events(&mut world, CollisionEventKind::End, sensor_id);
    let wall_starts = count_events(&mut world, CollisionEventKind::Start, wall_id);

    run_world(&mut world, 250);

    assert_eq!(*sensor_starts.borrow(), 1, "one sensor entry");
    assert_eq!(*sensor_ends.borrow(), 1, "one sensor exit");
    assert!(*wall_starts.borrow() >= 1, "the wall was hit");

    let x = world.body(ball_id).unwrap().position().x;
    assert!(x < 200.0 - 10.0, "wall stopped the ball: x = {x}");
}

// ============================================================================
// Scenario 4 — Stacked position correction
// ============================================================================

/// Three overlapping circles piled on a static floor separate to their
/// radii within a few steps of position correction.
#[test]
fn test_stacked_circles_separate() {
    let config = WorldConfig {
        damping: 0.0,
        solver: SolverConfig {
            position_iterations: 3,
            ..SolverConfig::default()
        },
        ..WorldConfig::default()
    };
    let mut world = World::new(config).unwrap();
    let slop = world.config().solver.position_slop;

    // Floor surface at y = 0; each adjacent pair overlaps by 2 units
    world.add_body(static_rect(0.0, -10.0, 200.0, 20.0));
    let dead = Material::new(0.0, 0.0);
    let c1 = world.add_body(ball(0.0, 8.0, 10.0, Vec2::ZERO, dead));
    let c2 = world.add_body(ball(0.0, 26.0, 10.0, Vec2::ZERO, dead));
    let c3 = world.add_body(ball(0.0, 44.0, 10.0, Vec2::ZERO, dead));

    // Correction drives residual penetration down to the slop; a chain of
    // three needs a dozen steps to flatten out there.
    run_world(&mut world, 12);

    let y1 = world.body(c1).unwrap().position().y;
    let y2 = world.body(c2).unwrap().position().y;
    let y3 = world.body(c3).unwrap().position().y;

    let floor = 10.0 - 2.0 * slop;
    assert!(y1 >= floor, "bottom circle rests on the floor: y1 = {y1}");
    assert!(y2 - y1 >= 20.0 - 2.0 * slop, "lower pair separated: {}", y2 - y1);
    assert!(y3 - y2 >= 20.0 - 2.0 * slop, "upper pair separated: {}", y3 - y2);
}

// ============================================================================
// Scenario 5 — Layer/mask filtering
// ============================================================================

/// Resolution masks and event masks act independently: clearing one side's
/// resolution mask keeps the events and removes the impulses.
#[test]
fn test_layer_mask_filtering() {
    let make_pair = |resolution_mask_a: u32| {
        let mut world = frictionless_world();
        let mut a = ball(0.0, 0.0, 10.0, Vec2::new(10.0, 0.0), Material::DEFAULT);
        a.layer = 0b001;
        a.event_mask = 0b010;
        a.resolution_mask = resolution_mask_a;
        let mut b = ball(15.0, 0.0, 10.0, Vec2::new(-10.0, 0.0), Material::DEFAULT);
        b.layer = 0b010;
        b.event_mask = 0b001;
        b.resolution_mask = 0b001;
        let a = world.add_body(a);
        let b = world.add_body(b);
        (world, a, b)
    };

    // Full masks: events and impulses both happen
    let (mut world, a, _b) = make_pair(0b010);
    let starts = count_events(&mut world, CollisionEventKind::Start, a);
    world.step(DT);
    assert_eq!(*starts.borrow(), 1);
    assert_ne!(
        world.body(a).unwrap().velocity(),
        Vec2::new(10.0, 0.0),
        "impulse changed the velocity"
    );

    // Cleared resolution mask: events persist, impulses vanish
    let (mut world, a, b) = make_pair(0b000);
    let starts = count_events(&mut world, CollisionEventKind::Start, a);
    world.step(DT);
    assert_eq!(*starts.borrow(), 1, "events fire without resolution");
    assert_eq!(world.body(a).unwrap().velocity(), Vec2::new(10.0, 0.0));
    assert_eq!(world.body(b).unwrap().velocity(), Vec2::new(-10.0, 0.0));
}

// ============================================================================
// Scenario 6 — No tunneling through a thin wall
// ============================================================================

/// A bullet-speed ball stops at a 2-unit-thick wall inside a single step
/// thanks to the swept test.
#[test]
fn test_ccd_stops_bullet_at_thin_wall() {
    let mut world = frictionless_world();
    let slop = world.config().solver.position_slop;
    let id = world.add_body(ball(
        70.0,
        0.0,
        5.0,
        Vec2::new(2000.0, 0.0),
        Material::new(0.0, 0.0),
    ));
    world.add_body(static_rect(100.0, 0.0, 2.0, 100.0));

    world.step(DT);

    let x = world.body(id).unwrap().position().x;
    assert!(
        x <= 100.0 - 5.0 + slop,
        "ball tunneled or penetrated: x = {x}"
    );
}

/// Below the swept-test threshold, plain discrete detection already keeps
/// the body on the near side.
#[test]
fn test_slow_body_needs_no_ccd() {
    let mut world = frictionless_world();
    let slop = world.config().solver.position_slop;
    let id = world.add_body(ball(
        70.0,
        0.0,
        5.0,
        Vec2::new(100.0, 0.0),
        Material::new(0.0, 0.0),
    ));
    world.add_body(static_rect(100.0, 0.0, 2.0, 100.0));

    run_world(&mut world, 60);

    let x = world.body(id).unwrap().position().x;
    assert!(x <= 100.0 - 5.0 + slop, "slow ball crossed the wall: x = {x}");
}

// ============================================================================
// Invariant — Static immovability
// ============================================================================

/// No sequence of public-API forces or impulses moves a static body.
#[test]
fn test_static_bodies_are_immovable() {
    let mut world = frictionless_world();
    let wall_id = world.add_body(static_rect(100.0, 0.0, 20.0, 100.0));
    let _ball = world.add_body(ball(
        70.0,
        0.0,
        20.0,
        Vec2::new(100.0, 0.0),
        Material::DEFAULT,
    ));

    let before = world.body(wall_id).unwrap().position();
    for _ in 0..120 {
        let wall = world.body_mut(wall_id).unwrap();
        wall.apply_force(Vec2::new(1e6, 1e6));
        wall.apply_impulse(Vec2::new(1e6, -1e6));
        world.step(DT);
    }

    let wall = world.body(wall_id).unwrap();
    assert_eq!(wall.position(), before, "position is bit-exact unchanged");
    assert_eq!(wall.velocity(), Vec2::ZERO);
}

// ============================================================================
// Invariant — Body/shape position coupling
// ============================================================================

/// The body position and the shape center stay one value through steps,
/// impulses and teleports.
#[test]
fn test_body_position_is_shape_center_throughout() {
    let mut world = frictionless_world();
    let id = world.add_body(ball(
        0.0,
        0.0,
        10.0,
        Vec2::new(35.0, -12.0),
        Material::DEFAULT,
    ));

    for i in 0..30 {
        world.step(DT);
        if i == 10 {
            world.body_mut(id).unwrap().set_position(Vec2::new(5.0, 5.0));
        }
        let body = world.body(id).unwrap();
        assert_eq!(body.position(), body.shape.center());
    }
}

// ============================================================================
// Invariant — Energy bound
// ============================================================================

/// In a closed system with restitution <= 1 and no external input, kinetic
/// energy does not grow (10% numeric margin per collision).
#[test]
fn test_kinetic_energy_non_increasing() {
    let mut world = frictionless_world();
    let elastic = Material::new(1.0, 0.0);
    let ids = [
        world.add_body(ball(0.0, 0.0, 10.0, Vec2::new(20.0, 3.0), elastic)),
        world.add_body(ball(40.0, 2.0, 10.0, Vec2::new(-15.0, 0.0), elastic)),
        world.add_body(ball(80.0, -2.0, 10.0, Vec2::new(-5.0, -3.0), elastic)),
    ];

    let total = |world: &World| -> f64 {
        ids.iter()
            .map(|id| world.body(*id).unwrap().kinetic_energy())
            .sum()
    };

    let budget = total(&world) * 1.1;
    for _ in 0..240 {
        world.step(DT);
        let now = total(&world);
        assert!(
            now <= budget,
            "kinetic energy grew beyond margin: {now} > {budget}"
        );
    }
}

// ============================================================================
// Invariant — Event lifecycle ordering
// ============================================================================

/// Per pair, the event stream is a subsequence of (start, active*, end)
/// repeated; a start only follows nothing or an end.
#[test]
fn test_event_stream_is_well_formed() {
    let mut world = frictionless_world();
    // A ball bouncing between two elastic walls crosses the sensor in the
    // middle repeatedly, producing several contact episodes.
    let bouncy = Material::new(1.0, 0.0);
    let a = world.add_body(ball(0.0, 0.0, 10.0, Vec2::new(60.0, 0.0), bouncy));
    let mut mid = ball(60.0, 0.0, 10.0, Vec2::ZERO, bouncy);
    mid.is_sensor = true;
    mid.set_static(true);
    let b = world.add_body(mid);
    world.add_body(static_rect(120.0, 0.0, 20.0, 100.0));
    world.add_body(static_rect(-120.0, 0.0, 20.0, 100.0));

    let log: Rc<RefCell<Vec<CollisionEventKind>>> = Rc::default();
    for kind in [
        CollisionEventKind::Start,
        CollisionEventKind::Active,
        CollisionEventKind::End,
    ] {
        let log_in = Rc::clone(&log);
        world.on(kind, move |event| {
            if (event.body_a, event.body_b) == (a.min(b), a.max(b)) {
                log_in.borrow_mut().push(kind);
            }
        });
    }

    run_world(&mut world, 300);

    let mut inside = false;
    for kind in log.borrow().iter() {
        match kind {
            CollisionEventKind::Start => {
                assert!(!inside, "start without an intervening end");
                inside = true;
            }
            CollisionEventKind::Active => assert!(inside, "active outside an episode"),
            CollisionEventKind::End => {
                assert!(inside, "end without a start");
                inside = false;
            }
        }
    }
    assert!(!log.borrow().is_empty(), "the pair produced events at all");
}

// ============================================================================
// Invariant — Sensors never impulse
// ============================================================================

/// A sensor pair emits despite restrictive event masks and leaves
/// velocities untouched.
#[test]
fn test_sensor_bypasses_event_masks_and_impulses() {
    let mut world = frictionless_world();
    let mut probe = ball(0.0, 0.0, 10.0, Vec2::new(20.0, 0.0), Material::DEFAULT);
    probe.is_sensor = true;
    probe.event_mask = 0; // ignored for sensors
    let probe_id = world.add_body(probe);

    let mut other = ball(25.0, 0.0, 10.0, Vec2::ZERO, Material::DEFAULT);
    other.event_mask = 0;
    let other_id = world.add_body(other);

    let starts = count_events(&mut world, CollisionEventKind::Start, probe_id);
    run_world(&mut world, 30);

    assert!(*starts.borrow() >= 1, "sensor overlap emitted");
    assert_eq!(
        world.body(other_id).unwrap().velocity(),
        Vec2::ZERO,
        "sensor produced no impulse"
    );
}

// ============================================================================
// Queries after simulation
// ============================================================================

/// Region and point queries reflect post-step positions.
#[test]
fn test_queries_track_moved_bodies() {
    let mut world = frictionless_world();
    let id = world.add_body(ball(
        0.0,
        0.0,
        10.0,
        Vec2::new(120.0, 0.0),
        Material::DEFAULT,
    ));

    run_world(&mut world, 60);
    let x = world.body(id).unwrap().position().x;
    assert_relative_eq!(x, 120.0, epsilon = 1e-6);

    let here = world.query_region(&Aabb::from_center_size(Vec2::new(x, 0.0), 30.0, 30.0));
    assert_eq!(here.len(), 1);

    let there = world.query_region(&Aabb::from_center_size(Vec2::ZERO, 15.0, 15.0));
    assert!(there.is_empty(), "broad phase was re-synced after movement");
}
