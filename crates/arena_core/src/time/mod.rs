//! # Fixed-Timestep Scheduler
//!
//! Turns irregular frame signals into a whole number of fixed simulation
//! steps plus an interpolation factor for rendering.
//!
//! ## Design
//!
//! - Time is accumulated as a [`Duration`] (integer nanoseconds), so the
//!   number of steps depends only on the total elapsed time and never on how
//!   it was split across frames
//! - Elapsed time is clamped to `max_frame` before accumulating, so a stall
//!   costs at most that much catch-up
//! - Callback failures are logged and counted; the frame carries on
//! - `stop()` can be called from any thread through a [`StopHandle`] and is
//!   observed before every step

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::config::SimConfig;
use crate::error::CoreResult;

/// Scheduler state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    /// Frames are ignored.
    Stopped,
    /// Frames advance the simulation.
    Running,
}

/// Cloneable handle that stops a scheduler from outside the tick.
#[derive(Clone, Debug)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Requests a stop. Idempotent.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// `true` once a stop has been requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Receiver of the scheduler's callbacks.
pub trait StepHandler {
    /// Runs one fixed step of `dt` seconds.
    ///
    /// # Errors
    ///
    /// Any error is logged and counted by the scheduler.
    fn update(&mut self, dt: f32) -> CoreResult<()>;

    /// Presents the frame with the interpolation factor in `[0, 1)`.
    ///
    /// # Errors
    ///
    /// Any error is logged and counted by the scheduler.
    fn render(&mut self, _interpolation: f32) -> CoreResult<()> {
        Ok(())
    }
}

struct Callbacks<U, R> {
    update: U,
    render: R,
}

impl<U, R> StepHandler for Callbacks<U, R>
where
    U: FnMut(f32) -> CoreResult<()>,
    R: FnMut(f32) -> CoreResult<()>,
{
    fn update(&mut self, dt: f32) -> CoreResult<()> {
        (self.update)(dt)
    }

    fn render(&mut self, interpolation: f32) -> CoreResult<()> {
        (self.render)(interpolation)
    }
}

/// Outcome of one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Fixed steps executed.
    pub steps: u32,
    /// Fraction of a step left in the accumulator.
    pub interpolation: f32,
    /// Update callbacks that failed.
    pub update_errors: u32,
    /// Render callbacks that failed (0 or 1).
    pub render_errors: u32,
    /// Elapsed time exceeded the frame clamp.
    pub clamped: bool,
    /// The render callback ran.
    pub rendered: bool,
}

/// Lifetime counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Fixed steps executed.
    pub ticks: u64,
    /// Frames that ran while the scheduler was running.
    pub frames: u64,
    /// Frames whose elapsed time was clamped.
    pub clamped_frames: u64,
    /// Failed update callbacks.
    pub update_errors: u64,
    /// Failed render callbacks.
    pub render_errors: u64,
}

/// Fixed-timestep scheduler.
pub struct FixedStepScheduler {
    fixed_step: Duration,
    max_frame: Duration,
    accumulator: Duration,
    stopped: Arc<AtomicBool>,
    last_frame: Option<Instant>,
    stats: SchedulerStats,
}

impl FixedStepScheduler {
    /// Creates a stopped scheduler.
    ///
    /// # Panics
    ///
    /// Panics if `fixed_step` is zero.
    #[must_use]
    pub fn new(fixed_step: Duration, max_frame: Duration) -> Self {
        assert!(!fixed_step.is_zero(), "Fixed step must be non-zero");
        Self {
            fixed_step,
            max_frame,
            accumulator: Duration::ZERO,
            stopped: Arc::new(AtomicBool::new(true)),
            last_frame: None,
            stats: SchedulerStats::default(),
        }
    }

    /// Scheduler for a session configuration.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.fixed_step(), config.max_frame())
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        if self.stopped.load(Ordering::Acquire) {
            SchedulerState::Stopped
        } else {
            SchedulerState::Running
        }
    }

    /// Starts (or restarts) the scheduler with an empty accumulator.
    pub fn start(&mut self) {
        self.accumulator = Duration::ZERO;
        self.last_frame = None;
        self.stopped.store(false, Ordering::Release);
    }

    /// Stops the scheduler. Idempotent.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// Handle that can stop this scheduler from elsewhere.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.stopped))
    }

    /// Length of one step.
    #[inline]
    #[must_use]
    pub const fn fixed_step(&self) -> Duration {
        self.fixed_step
    }

    /// Time carried over to the next frame.
    #[inline]
    #[must_use]
    pub const fn accumulator(&self) -> Duration {
        self.accumulator
    }

    /// Lifetime counters.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Handles a frame signal at wall-clock time `now`.
    ///
    /// The first frame after `start` only records the time.
    pub fn frame(
        &mut self,
        now: Instant,
        update: impl FnMut(f32) -> CoreResult<()>,
        render: impl FnMut(f32) -> CoreResult<()>,
    ) -> FrameReport {
        let elapsed = self.elapsed_until(now);
        self.advance(elapsed, update, render)
    }

    /// Like [`FixedStepScheduler::frame`], driving a [`StepHandler`].
    pub fn frame_with(&mut self, now: Instant, handler: &mut impl StepHandler) -> FrameReport {
        let elapsed = self.elapsed_until(now);
        self.advance_with(elapsed, handler)
    }

    fn elapsed_until(&mut self, now: Instant) -> Duration {
        let elapsed = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_frame = Some(now);
        elapsed
    }

    /// Advances by an explicit elapsed time.
    pub fn advance(
        &mut self,
        elapsed: Duration,
        update: impl FnMut(f32) -> CoreResult<()>,
        render: impl FnMut(f32) -> CoreResult<()>,
    ) -> FrameReport {
        self.advance_with(elapsed, &mut Callbacks { update, render })
    }

    /// Advances by an explicit elapsed time, driving a [`StepHandler`].
    pub fn advance_with(
        &mut self,
        elapsed: Duration,
        handler: &mut impl StepHandler,
    ) -> FrameReport {
        let mut report = FrameReport::default();
        if self.state() == SchedulerState::Stopped {
            return report;
        }
        self.stats.frames += 1;

        if elapsed > self.max_frame {
            warn!(
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                max_ms = self.max_frame.as_secs_f64() * 1000.0,
                "frame clamped"
            );
            report.clamped = true;
            self.stats.clamped_frames += 1;
        }
        self.accumulator += elapsed.min(self.max_frame);

        let dt = self.fixed_step.as_secs_f32();
        while self.accumulator >= self.fixed_step {
            if self.state() == SchedulerState::Stopped {
                return report;
            }
            self.accumulator -= self.fixed_step;
            report.steps += 1;
            self.stats.ticks += 1;

            if let Err(err) = handler.update(dt) {
                warn!(tick = self.stats.ticks, "update failed: {err}");
                report.update_errors += 1;
                self.stats.update_errors += 1;
            }
        }
        if self.state() == SchedulerState::Stopped {
            return report;
        }

        #[allow(clippy::cast_possible_truncation)]
        {
            report.interpolation =
                (self.accumulator.as_secs_f64() / self.fixed_step.as_secs_f64()) as f32;
        }
        report.rendered = true;
        if let Err(err) = handler.render(report.interpolation) {
            warn!("render failed: {err}");
            report.render_errors += 1;
            self.stats.render_errors += 1;
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn scheduler_50hz() -> FixedStepScheduler {
        let mut s = FixedStepScheduler::new(Duration::from_millis(20), Duration::from_millis(250));
        s.start();
        s
    }

    #[test]
    fn test_starts_stopped() {
        let mut s = FixedStepScheduler::new(Duration::from_millis(20), Duration::from_millis(250));
        assert_eq!(s.state(), SchedulerState::Stopped);

        let mut calls = 0;
        let report = s.advance(
            Duration::from_secs(1),
            |_| {
                calls += 1;
                Ok(())
            },
            |_| Ok(()),
        );
        assert_eq!(report.steps, 0);
        assert!(!report.rendered);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_steps_and_interpolation() {
        let mut s = scheduler_50hz();
        let mut alpha = -1.0;
        let report = s.advance(Duration::from_millis(50), |_| Ok(()), |a| {
            alpha = a;
            Ok(())
        });
        assert_eq!(report.steps, 2);
        assert!((alpha - 0.5).abs() < 1e-6);
        assert_eq!(s.accumulator(), Duration::from_millis(10));
    }

    #[test]
    fn test_chunking_does_not_change_step_count() {
        let mut a = scheduler_50hz();
        let mut b = scheduler_50hz();

        let mut steps_a = 0;
        a.advance(
            Duration::from_millis(200),
            |_| {
                steps_a += 1;
                Ok(())
            },
            |_| Ok(()),
        );

        let mut steps_b = 0;
        for ms in [3, 17, 1, 40, 39, 100] {
            b.advance(
                Duration::from_millis(ms),
                |_| {
                    steps_b += 1;
                    Ok(())
                },
                |_| Ok(()),
            );
        }

        assert_eq!(steps_a, 10);
        assert_eq!(steps_a, steps_b);
        assert_eq!(a.accumulator(), b.accumulator());
    }

    #[test]
    fn test_frame_clamp() {
        let mut s = scheduler_50hz();
        let report = s.advance(Duration::from_secs(10), |_| Ok(()), |_| Ok(()));
        assert!(report.clamped);
        // 250 ms / 20 ms
        assert_eq!(report.steps, 12);
        assert_eq!(s.stats().clamped_frames, 1);
    }

    #[test]
    fn test_callback_errors_are_isolated() {
        let mut s = scheduler_50hz();
        let mut n = 0;
        let report = s.advance(
            Duration::from_millis(100),
            |_| {
                n += 1;
                if n % 2 == 0 {
                    Err(CoreError::system("test", "even step"))
                } else {
                    Ok(())
                }
            },
            |_| Err(CoreError::system("render", "no surface")),
        );
        assert_eq!(report.steps, 5);
        assert_eq!(report.update_errors, 2);
        assert_eq!(report.render_errors, 1);
        assert!(report.rendered);
    }

    #[test]
    fn test_stop_from_inside_update_halts_frame() {
        let mut s = scheduler_50hz();
        let handle = s.stop_handle();
        let mut steps = 0;
        let mut rendered = false;
        let report = s.advance(
            Duration::from_millis(200),
            |_| {
                steps += 1;
                if steps == 3 {
                    handle.stop();
                    handle.stop();
                }
                Ok(())
            },
            |_| {
                rendered = true;
                Ok(())
            },
        );
        assert_eq!(report.steps, 3);
        assert!(!rendered);
        assert_eq!(s.state(), SchedulerState::Stopped);

        s.stop();
        assert_eq!(s.state(), SchedulerState::Stopped);
    }

    #[test]
    fn test_frame_uses_wall_clock() {
        let mut s = scheduler_50hz();
        let t0 = Instant::now();
        let mut steps = 0;

        let first = s.frame(
            t0,
            |_| {
                steps += 1;
                Ok(())
            },
            |_| Ok(()),
        );
        assert_eq!(first.steps, 0);

        let second = s.frame(
            t0 + Duration::from_millis(45),
            |_| {
                steps += 1;
                Ok(())
            },
            |_| Ok(()),
        );
        assert_eq!(second.steps, 2);
        assert_eq!(steps, 2);
    }
}
