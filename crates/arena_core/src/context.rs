//! # Engine Context
//!
//! Everything one game session owns: tables, spatial index, query buffer
//! pool, integrators and the collaborator systems. Two contexts never share
//! mutable state, so sessions are isolated by construction.
//!
//! ## Tick Order
//!
//! 1. input-sync systems
//! 2. movement integrator
//! 3. physics integrator
//! 4. spatial rebuild
//! 5. gameplay systems
//! 6. cleanup (recycle slots destroyed on an earlier tick)
//!
//! Gameplay systems see the spatial index as of step 4. Anything they move
//! shows up in the index on the next tick.

use std::time::{Duration, Instant};

use tracing::{error, trace, warn};

use crate::config::SimConfig;
use crate::ecs::{EntityId, SpawnDesc, World};
use crate::error::{CoreError, CoreResult};
use crate::memory::ObjectPool;
use crate::physics::{MovementIntegrator, PhysicsIntegrator, PhysicsStats};
use crate::rng::SessionRng;
use crate::spatial::SpatialHash;
use crate::time::{FixedStepScheduler, FrameReport, SchedulerState, StepHandler, StopHandle};

/// Where a collaborator system runs within the tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before movement: remote input, AI target selection.
    Input,
    /// After the spatial rebuild: collisions, pickups, abilities.
    Gameplay,
}

/// Mutable view of the session handed to collaborator systems.
pub struct TickContext<'a> {
    /// Component tables.
    pub world: &'a mut World,
    /// Spatial index, rebuilt this tick.
    pub spatial: &'a mut SpatialHash,
    /// Pool of query result buffers.
    pub buffers: &'a mut ObjectPool<Vec<u32>>,
    /// Session RNG.
    pub rng: &'a mut SessionRng,
    /// Step length in seconds.
    pub dt: f32,
    /// Current tick.
    pub tick: u64,
}

/// A gameplay, AI or input collaborator driven by the tick.
pub trait TickSystem: Send {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Runs once per tick in the phase the system was registered for.
    ///
    /// # Errors
    ///
    /// Errors are logged and counted; they never abort the tick.
    fn run(&mut self, ctx: &mut TickContext<'_>) -> CoreResult<()>;
}

/// What one tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number.
    pub tick: u64,
    /// Entities steered toward a target.
    pub steered: usize,
    /// Physics counters.
    pub physics: PhysicsStats,
    /// Entities in the spatial index.
    pub indexed: usize,
    /// Slots recycled during cleanup.
    pub recycled: usize,
    /// Systems that failed.
    pub system_errors: u32,
}

/// One session's simulation state.
pub struct EngineContext {
    config: SimConfig,
    world: World,
    spatial: SpatialHash,
    buffers: ObjectPool<Vec<u32>>,
    rng: SessionRng,
    movement: MovementIntegrator,
    physics: PhysicsIntegrator,
    input_systems: Vec<Box<dyn TickSystem>>,
    gameplay_systems: Vec<Box<dyn TickSystem>>,
}

impl EngineContext {
    /// Builds a context from a configuration with RNG seed 0.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: SimConfig) -> CoreResult<Self> {
        Self::with_seed(config, 0)
    }

    /// Builds a context with an explicit RNG seed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the configuration is invalid.
    pub fn with_seed(config: SimConfig, seed: u64) -> CoreResult<Self> {
        config.validate()?;

        let spatial = SpatialHash::new(&config.grid_layers, config.bucket_sweep_interval)?;
        let mut buffers = ObjectPool::with_reset(|| Vec::with_capacity(64), Vec::clear);
        buffers.warm(config.query_buffer_pool);

        Ok(Self {
            world: World::from_config(&config),
            spatial,
            buffers,
            rng: SessionRng::new(seed),
            movement: MovementIntegrator::from_config(&config),
            physics: PhysicsIntegrator::from_config(&config),
            input_systems: Vec::new(),
            gameplay_systems: Vec::new(),
            config,
        })
    }

    /// Session configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Component tables.
    #[inline]
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable component tables.
    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Spatial index.
    #[inline]
    #[must_use]
    pub const fn spatial(&self) -> &SpatialHash {
        &self.spatial
    }

    /// Mutable spatial index, for queries into its scratch buffer.
    #[inline]
    pub fn spatial_mut(&mut self) -> &mut SpatialHash {
        &mut self.spatial
    }

    /// Query buffer pool.
    #[inline]
    pub fn buffers_mut(&mut self) -> &mut ObjectPool<Vec<u32>> {
        &mut self.buffers
    }

    /// Session RNG.
    #[inline]
    pub fn rng_mut(&mut self) -> &mut SessionRng {
        &mut self.rng
    }

    /// Registers a collaborator system. Systems run in registration order.
    pub fn register(&mut self, phase: Phase, system: Box<dyn TickSystem>) {
        match phase {
            Phase::Input => self.input_systems.push(system),
            Phase::Gameplay => self.gameplay_systems.push(system),
        }
    }

    /// Spawns an entity.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Capacity`] when the world is full.
    pub fn spawn(&mut self, desc: &SpawnDesc) -> CoreResult<EntityId> {
        self.world.spawn(desc)
    }

    /// Spawns `count` copies of `desc` at uniform random points in the arena.
    ///
    /// Stops at the first capacity failure and returns it; entities spawned
    /// before it stay.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Capacity`] when the world fills up.
    pub fn spawn_scattered(&mut self, desc: &SpawnDesc, count: usize) -> CoreResult<Vec<EntityId>> {
        let reach = (self.config.world_radius - desc.radius).max(0.0);
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let (x, y) = self.rng.point_in_disc(reach);
            ids.push(self.world.spawn(&SpawnDesc { x, y, ..*desc })?);
        }
        Ok(ids)
    }

    /// Runs one full tick of `dt` seconds.
    pub fn step(&mut self, dt: f32) -> TickReport {
        self.world.begin_tick();
        let tick = self.world.tick();
        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };

        report.system_errors += self.run_phase(Phase::Input, dt);
        report.steered = self.movement.step(&mut self.world, dt);
        report.physics = self.physics.step(&mut self.world, dt);
        self.spatial.rebuild(&self.world);
        report.indexed = self.spatial.len();
        report.system_errors += self.run_phase(Phase::Gameplay, dt);
        report.recycled = self.world.compact();

        trace!(
            tick,
            steered = report.steered,
            integrated = report.physics.integrated,
            indexed = report.indexed,
            recycled = report.recycled,
            "tick complete"
        );
        report
    }

    fn run_phase(&mut self, phase: Phase, dt: f32) -> u32 {
        let systems = match phase {
            Phase::Input => &mut self.input_systems,
            Phase::Gameplay => &mut self.gameplay_systems,
        };
        if systems.is_empty() {
            return 0;
        }

        let tick = self.world.tick();
        let mut ctx = TickContext {
            world: &mut self.world,
            spatial: &mut self.spatial,
            buffers: &mut self.buffers,
            rng: &mut self.rng,
            dt,
            tick,
        };

        let mut failures = 0;
        for system in systems.iter_mut() {
            if let Err(err) = system.run(&mut ctx) {
                warn!(system = system.name(), ?phase, tick, "system failed: {err}");
                failures += 1;
            }
        }
        failures
    }
}

/// Scheduler plus the engine context it drives.
///
/// The context is attached explicitly; driving a session without one is an
/// ordering error reported as [`CoreError::UnboundContext`].
pub struct Session {
    scheduler: FixedStepScheduler,
    context: Option<EngineContext>,
    last_tick: Option<TickReport>,
}

struct SessionFrame<'a, R> {
    context: &'a mut EngineContext,
    render: R,
    last_tick: &'a mut Option<TickReport>,
}

impl<R> StepHandler for SessionFrame<'_, R>
where
    R: FnMut(&World, f32) -> CoreResult<()>,
{
    fn update(&mut self, dt: f32) -> CoreResult<()> {
        let report = self.context.step(dt);
        *self.last_tick = Some(report);
        if report.system_errors > 0 {
            return Err(CoreError::system(
                "tick",
                format!("{} system(s) failed on tick {}", report.system_errors, report.tick),
            ));
        }
        Ok(())
    }

    fn render(&mut self, interpolation: f32) -> CoreResult<()> {
        (self.render)(&self.context.world, interpolation)
    }
}

impl Session {
    /// Creates a stopped session with no context.
    #[must_use]
    pub fn new(scheduler: FixedStepScheduler) -> Self {
        Self {
            scheduler,
            context: None,
            last_tick: None,
        }
    }

    /// Creates a stopped session with a scheduler for `config`.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(FixedStepScheduler::from_config(config))
    }

    /// Attaches a context, returning the previous one.
    pub fn attach(&mut self, context: EngineContext) -> Option<EngineContext> {
        self.context.replace(context)
    }

    /// Detaches the context.
    pub fn detach(&mut self) -> Option<EngineContext> {
        self.context.take()
    }

    /// The attached context.
    #[must_use]
    pub fn context(&self) -> Option<&EngineContext> {
        self.context.as_ref()
    }

    /// The attached context, mutably.
    pub fn context_mut(&mut self) -> Option<&mut EngineContext> {
        self.context.as_mut()
    }

    /// The scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &FixedStepScheduler {
        &self.scheduler
    }

    /// Report of the most recent tick.
    #[must_use]
    pub const fn last_tick(&self) -> Option<&TickReport> {
        self.last_tick.as_ref()
    }

    /// Starts the scheduler.
    pub fn start(&mut self) {
        self.scheduler.start();
    }

    /// Stops the scheduler. Idempotent.
    pub fn stop(&self) {
        self.scheduler.stop();
    }

    /// Handle that stops this session from another thread.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.scheduler.stop_handle()
    }

    /// Scheduler state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Handles a frame at wall-clock time `now`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnboundContext`] if no context is attached.
    pub fn frame(
        &mut self,
        now: Instant,
        render: impl FnMut(&World, f32) -> CoreResult<()>,
    ) -> CoreResult<FrameReport> {
        let context = Self::bound(&mut self.context, "session frame")?;
        let mut frame = SessionFrame {
            context,
            render,
            last_tick: &mut self.last_tick,
        };
        Ok(self.scheduler.frame_with(now, &mut frame))
    }

    /// Advances by an explicit elapsed time.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnboundContext`] if no context is attached.
    pub fn advance(
        &mut self,
        elapsed: Duration,
        render: impl FnMut(&World, f32) -> CoreResult<()>,
    ) -> CoreResult<FrameReport> {
        let context = Self::bound(&mut self.context, "session advance")?;
        let mut frame = SessionFrame {
            context,
            render,
            last_tick: &mut self.last_tick,
        };
        Ok(self.scheduler.advance_with(elapsed, &mut frame))
    }

    fn bound<'a>(
        context: &'a mut Option<EngineContext>,
        subsystem: &'static str,
    ) -> CoreResult<&'a mut EngineContext> {
        context.as_mut().ok_or_else(|| {
            error!(subsystem, "no engine context attached");
            CoreError::UnboundContext { subsystem }
        })
    }
}
