//! End-to-end properties of the simulation core.

use std::time::Duration;

use arena_core::{
    EngineContext, EntityFlags, Field, FixedStepScheduler, MovementIntegrator, ObjectPool,
    PhysicsIntegrator, SimConfig, SpatialHash, SpawnDesc, World,
};

const DT: f32 = 1.0 / 60.0;

fn physics(world_radius: f32) -> PhysicsIntegrator {
    PhysicsIntegrator {
        world_radius,
        ..PhysicsIntegrator::default()
    }
}

#[test]
fn frame_rate_independence_without_friction() {
    let integrator = physics(1.0e6);

    let mut fine = World::new(4);
    let a = fine
        .spawn(&SpawnDesc::projectile(0.0, 0.0, 120.0, -45.0))
        .unwrap();
    for _ in 0..60 {
        integrator.step(&mut fine, DT);
    }

    let mut coarse = World::new(4);
    let b = coarse
        .spawn(&SpawnDesc::projectile(0.0, 0.0, 120.0, -45.0))
        .unwrap();
    integrator.step(&mut coarse, 0.3);
    integrator.step(&mut coarse, 0.7);

    for field in [Field::X, Field::Y, Field::VelocityX, Field::VelocityY] {
        let f = fine.field(a.slot(), field);
        let c = coarse.field(b.slot(), field);
        assert!((f - c).abs() < 1e-2, "{field:?}: {f} vs {c}");
    }
}

#[test]
fn friction_decays_by_reference_rate() {
    let integrator = physics(1.0e6);
    let mut world = World::new(4);
    let id = world
        .spawn(
            &SpawnDesc::bot(0.0, 0.0)
                .with_velocity(200.0, 0.0)
                .with_friction(0.9),
        )
        .unwrap();

    for _ in 0..60 {
        integrator.step(&mut world, DT);
    }

    let expected = 200.0 * 0.9_f32.powi(60);
    let vx = world.field(id.slot(), Field::VelocityX);
    assert!((vx - expected).abs() < 1e-2, "{vx} vs {expected}");

    // Same law when the second is split unevenly.
    let mut uneven = World::new(4);
    let id = uneven
        .spawn(
            &SpawnDesc::bot(0.0, 0.0)
                .with_velocity(200.0, 0.0)
                .with_friction(0.9),
        )
        .unwrap();
    integrator.step(&mut uneven, 0.25);
    integrator.step(&mut uneven, 0.75);
    let vx = uneven.field(id.slot(), Field::VelocityX);
    assert!((vx - expected).abs() < 1e-2, "{vx} vs {expected}");
}

#[test]
fn boundary_contains_fast_movers() {
    let boundary = 500.0;
    let integrator = PhysicsIntegrator {
        world_radius: boundary,
        boundary_damping: 1.5,
        ..PhysicsIntegrator::default()
    };
    let mut world = World::new(64);
    for i in 0..32 {
        let angle = i as f32 * 0.2;
        world
            .spawn(
                &SpawnDesc::projectile(
                    angle.cos() * 480.0,
                    angle.sin() * 480.0,
                    angle.cos() * 390.0,
                    angle.sin() * 390.0,
                )
                .with_radius(5.0 + i as f32),
            )
            .unwrap();
    }

    for _ in 0..600 {
        integrator.step(&mut world, DT);
        for index in world.iter_live() {
            let t = world.transforms.get(index).unwrap();
            assert!(t.distance_from_origin() <= boundary + 1e-3);
        }
    }
}

#[test]
fn boundary_scenario_moving_outward() {
    let boundary = 3000.0;
    let integrator = physics(boundary);
    let mut world = World::new(4);
    let id = world
        .spawn(&SpawnDesc::bot(boundary - 50.0, 0.0).with_velocity(100.0, 0.0))
        .unwrap();

    for _ in 0..60 {
        integrator.step(&mut world, DT);
    }
    let t = world.transforms.get(id.slot()).unwrap();
    assert!(t.distance_from_origin() <= boundary);
}

#[test]
fn inactive_entities_never_change() {
    let movement = MovementIntegrator::default();
    let integrator = physics(3000.0);
    let mut world = World::new(16);
    let alive = world
        .spawn(&SpawnDesc::bot(0.0, 0.0).with_velocity(50.0, 0.0))
        .unwrap();
    let gone = world
        .spawn(&SpawnDesc::bot(100.0, 100.0).with_velocity(50.0, 50.0))
        .unwrap();
    world.seek(gone.slot(), 900.0, 900.0);
    world.destroy(gone);

    let before_t = *world.transforms.get(gone.slot()).unwrap();
    let before_p = *world.physics.get(gone.slot()).unwrap();

    for _ in 0..120 {
        movement.step(&mut world, DT);
        integrator.step(&mut world, DT);
    }

    assert_eq!(*world.transforms.get(gone.slot()).unwrap(), before_t);
    assert_eq!(*world.physics.get(gone.slot()).unwrap(), before_p);
    assert!(world.field(alive.slot(), Field::X) > 0.0);
}

#[test]
fn query_finds_neighbour_within_radius() {
    let mut world = World::new(16);
    let a = world.spawn(&SpawnDesc::player(10.0, 10.0)).unwrap();
    let b = world.spawn(&SpawnDesc::food(10.0 + 60.0, 10.0 + 80.0)).unwrap(); // d = 100

    let mut hash = SpatialHash::new(&[150.0, 450.0, 1500.0], 60).unwrap();
    hash.rebuild(&world);

    let found = hash.query(10.0, 10.0, 120.0);
    assert!(found.contains(&b.index()));
    assert!(found.contains(&a.index()));

    let found = hash.query(10.0, 10.0, 90.0);
    assert!(!found.contains(&b.index()));
}

#[test]
fn query_misses_neighbour_beyond_layer_reach() {
    let mut world = World::new(16);
    world.spawn(&SpawnDesc::player(10.0, 10.0)).unwrap();
    let far = world.spawn(&SpawnDesc::food(4610.0, 10.0)).unwrap();

    let mut hash = SpatialHash::new(&[150.0, 450.0, 1500.0], 60).unwrap();
    hash.rebuild(&world);

    // d = 4600 < 5000, but the coarsest layer's 3x3 block ends well short of it.
    assert!(!hash.query(10.0, 10.0, 5000.0).contains(&far.index()));
}

#[test]
fn pool_round_trip_allocates_once() {
    let mut pool = ObjectPool::with_reset(|| Vec::<u32>::with_capacity(32), Vec::clear);
    for i in 0..10_000 {
        let mut buf = pool.acquire();
        buf.push(i);
        pool.release(buf);
    }
    assert_eq!(pool.created(), 1);
}

fn replay(seed: u64, frames: &[u64]) -> Vec<(u32, u32, u32, u32)> {
    let config = SimConfig {
        capacity: 256,
        tick_rate: 50,
        ..SimConfig::default()
    };
    let mut scheduler = FixedStepScheduler::from_config(&config);
    let mut ctx = EngineContext::with_seed(config, seed).unwrap();
    let bots = ctx.spawn_scattered(&SpawnDesc::bot(0.0, 0.0), 40).unwrap();
    ctx.spawn_scattered(&SpawnDesc::food(0.0, 0.0), 80).unwrap();

    scheduler.start();
    for (n, &ms) in frames.iter().enumerate() {
        let target = ctx.rng_mut().point_in_disc(2500.0);
        let bot = bots[n % bots.len()].slot();
        ctx.world_mut().seek(bot, target.0, target.1);
        scheduler.advance(
            Duration::from_millis(ms),
            |dt| {
                ctx.step(dt);
                Ok(())
            },
            |_| Ok(()),
        );
    }

    let world = ctx.world();
    world
        .iter_live()
        .map(|i| {
            (
                world.field(i, Field::X).to_bits(),
                world.field(i, Field::Y).to_bits(),
                world.field(i, Field::VelocityX).to_bits(),
                world.field(i, Field::VelocityY).to_bits(),
            )
        })
        .collect()
}

#[test]
fn replay_is_bit_identical() {
    let frames = [20, 40, 20, 60, 20, 100, 20, 20, 80, 20];
    assert_eq!(replay(7, &frames), replay(7, &frames));
}

#[test]
fn chunking_of_wall_clock_does_not_change_result() {
    let config = SimConfig {
        capacity: 16,
        tick_rate: 50,
        ..SimConfig::default()
    };

    let run = |chunks: &[u64]| {
        let mut scheduler = FixedStepScheduler::from_config(&config);
        let mut ctx = EngineContext::new(config.clone()).unwrap();
        let id = ctx
            .spawn(&SpawnDesc::bot(0.0, 0.0).with_velocity(80.0, 20.0))
            .unwrap();
        ctx.world_mut().seek(id.slot(), 400.0, -300.0);
        scheduler.start();
        for &ms in chunks {
            scheduler.advance(
                Duration::from_millis(ms),
                |dt| {
                    ctx.step(dt);
                    Ok(())
                },
                |_| Ok(()),
            );
        }
        let w = ctx.world();
        (
            w.tick(),
            w.field(id.slot(), Field::X).to_bits(),
            w.field(id.slot(), Field::Y).to_bits(),
        )
    };

    let whole = run(&[200, 200, 200]);
    let split = run(&[13, 7, 180, 99, 1, 100, 150, 50]);
    assert_eq!(whole.0, 30);
    assert_eq!(whole, split);
}

#[test]
fn scenario_radius_28_bot_slows_and_moves() {
    let integrator = physics(3000.0);
    let mut world = World::new(4);
    let id = world
        .spawn(
            &SpawnDesc::bot(0.0, 0.0)
                .with_radius(28.0)
                .with_velocity(50.0, 30.0)
                .with_friction(0.9),
        )
        .unwrap();

    for _ in 0..60 {
        integrator.step(&mut world, DT);
    }

    let vx = world.field(id.slot(), Field::VelocityX);
    let vy = world.field(id.slot(), Field::VelocityY);
    assert!(vx.abs() < 50.0);
    assert!(vy.abs() < 30.0);

    let x = world.field(id.slot(), Field::X);
    let y = world.field(id.slot(), Field::Y);
    assert!(x > 0.0 && y > 0.0);
    assert!(x.hypot(y) > 0.0);
}

#[test]
fn destroyed_slot_is_reused_only_after_a_tick() {
    let mut ctx = EngineContext::new(SimConfig {
        capacity: 2,
        ..SimConfig::default()
    })
    .unwrap();
    let a = ctx.spawn(&SpawnDesc::food(0.0, 0.0)).unwrap();
    ctx.spawn(&SpawnDesc::food(5.0, 0.0)).unwrap();
    assert!(ctx.spawn(&SpawnDesc::food(9.0, 0.0)).is_err());

    ctx.step(DT);
    assert!(ctx.world_mut().destroy(a));
    assert!(ctx.spawn(&SpawnDesc::food(9.0, 0.0)).is_err());

    // Destroyed during tick 1; cleanup of tick 2 recycles it.
    let report = ctx.step(DT);
    assert_eq!(report.recycled, 1);

    let b = ctx.spawn(&SpawnDesc::pickup(9.0, 0.0)).unwrap();
    assert_eq!(b.slot(), a.slot());
    assert!(!ctx.world().is_current(a));
    assert!(ctx.world().flags(b.slot()).contains(EntityFlags::PICKUP));
    assert!(!ctx.world().flags(b.slot()).contains(EntityFlags::FOOD));
}
