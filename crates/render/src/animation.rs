use crate::error::RenderError;
use crate::renderer::Renderer;
use crate::viewport::ViewportManager;
use globe_scene::{GroupHandle, Scene};
use std::cell::Cell;
use std::f64::consts::TAU;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source for the animation.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Token for one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Host-side frame callbacks, one at a time.
pub trait FrameScheduler {
    /// Ask for one more frame callback.
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraw a request that has not fired yet.
    fn cancel_frame(&mut self, request: FrameRequest);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Stopped,
}

/// What a frame callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Rendered,
    /// The surface failed transiently; the next frame is still scheduled.
    Recovered,
    /// Nothing to draw, or the driver is not running.
    Skipped,
    /// A fatal render error stopped the loop.
    Failed,
}

/// Rotation of the globe group after `elapsed` at `speed` rad/s, in `[0, 2π)`.
pub fn rotation_at(speed: f32, elapsed: Duration) -> f32 {
    (f64::from(speed) * elapsed.as_secs_f64()).rem_euclid(TAU) as f32
}

/// Per-frame loop: rotate the globe group, render, request the next frame.
#[derive(Debug)]
pub struct AnimationDriver {
    speed: f32,
    state: DriverState,
    started_at: Duration,
    pending: Option<FrameRequest>,
    frames_rendered: u64,
}

impl AnimationDriver {
    /// `speed` is in radians per second.
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            state: DriverState::Idle,
            started_at: Duration::ZERO,
            pending: None,
            frames_rendered: 0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Begin animating. Only an idle driver starts.
    pub fn start<C, F>(&mut self, clock: &C, scheduler: &mut F)
    where
        C: Clock + ?Sized,
        F: FrameScheduler + ?Sized,
    {
        if self.state != DriverState::Idle {
            return;
        }
        self.state = DriverState::Running;
        self.started_at = clock.now();
        self.pending = Some(scheduler.request_frame());
        tracing::info!("animation started at {} rad/s", self.speed);
    }

    /// Handle one frame callback.
    pub fn on_frame<C, F, S>(
        &mut self,
        clock: &C,
        scheduler: &mut F,
        scene: &mut Scene,
        group: GroupHandle,
        viewport: &mut ViewportManager<S>,
    ) -> Result<TickOutcome, RenderError>
    where
        C: Clock + ?Sized,
        F: FrameScheduler + ?Sized,
        S: Renderer,
    {
        if self.state != DriverState::Running || self.pending.take().is_none() {
            return Ok(TickOutcome::Skipped);
        }

        let elapsed = clock.now().saturating_sub(self.started_at);
        scene.set_group_rotation(group, rotation_at(self.speed, elapsed));

        let outcome = match viewport.render(scene) {
            Ok(()) => {
                self.frames_rendered += 1;
                TickOutcome::Rendered
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!("frame skipped: {e}");
                TickOutcome::Recovered
            }
            Err(e) => {
                self.state = DriverState::Stopped;
                return Err(e);
            }
        };

        self.pending = Some(scheduler.request_frame());
        Ok(outcome)
    }

    /// Stop animating and cancel the pending frame, if any.
    pub fn stop<F: FrameScheduler + ?Sized>(&mut self, scheduler: &mut F) {
        if let Some(request) = self.pending.take() {
            scheduler.cancel_frame(request);
        }
        if self.state == DriverState::Running {
            tracing::info!("animation stopped after {} frames", self.frames_rendered);
        }
        self.state = DriverState::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DebugTextRenderer;
    use globe_common::{CameraConfig, SurfaceSize, ViewportSize};
    use globe_scene::{Node, RotatingGroup};

    #[derive(Default)]
    struct Scheduler {
        next: u64,
        requested: Vec<FrameRequest>,
        cancelled: Vec<FrameRequest>,
    }

    impl FrameScheduler for Scheduler {
        fn request_frame(&mut self) -> FrameRequest {
            self.next += 1;
            let request = FrameRequest(self.next);
            self.requested.push(request);
            request
        }

        fn cancel_frame(&mut self, request: FrameRequest) {
            self.cancelled.push(request);
        }
    }

    fn fixture() -> (Scene, GroupHandle, ViewportManager<DebugTextRenderer>) {
        let mut scene = Scene::new();
        let id = scene.add(Node::Group(RotatingGroup::new()));
        let group = scene.group_handle(id).unwrap();
        let size = ViewportSize::new(800, 600);
        let viewport = ViewportManager::new(
            &CameraConfig::default(),
            size,
            1.0,
            DebugTextRenderer::new(SurfaceSize::new(800, 600)),
        );
        (scene, group, viewport)
    }

    #[test]
    fn rotation_is_speed_times_elapsed() {
        assert!((rotation_at(0.15, Duration::from_secs(10)) - 1.5).abs() < 1e-6);
        assert_eq!(rotation_at(0.15, Duration::ZERO), 0.0);
    }

    #[test]
    fn rotation_wraps_to_full_turn() {
        let full_turn = Duration::from_secs_f64(TAU / 0.15);
        let angle = rotation_at(0.15, full_turn + Duration::from_secs(10));
        assert!((angle - 1.5).abs() < 1e-4);
        let long = rotation_at(0.15, Duration::from_secs(1_000_000));
        assert!((0.0..std::f32::consts::TAU).contains(&long));
    }

    #[test]
    fn driver_rotates_group_from_start_time() {
        let clock = ManualClock::new();
        clock.set(Duration::from_secs(3));
        let mut scheduler = Scheduler::default();
        let (mut scene, group, mut viewport) = fixture();

        let mut driver = AnimationDriver::new(0.15);
        driver.start(&clock, &mut scheduler);
        assert_eq!(driver.state(), DriverState::Running);
        assert_eq!(scheduler.requested.len(), 1);

        clock.advance(Duration::from_secs(10));
        let outcome = driver
            .on_frame(&clock, &mut scheduler, &mut scene, group, &mut viewport)
            .unwrap();

        assert_eq!(outcome, TickOutcome::Rendered);
        let angle = scene.group(group).unwrap().rotation_y();
        assert!((angle - 1.5).abs() < 1e-6);
        assert_eq!(viewport.surface().frames(), 1);
        assert_eq!(scheduler.requested.len(), 2);
    }

    #[test]
    fn idle_driver_skips_frames() {
        let clock = ManualClock::new();
        let mut scheduler = Scheduler::default();
        let (mut scene, group, mut viewport) = fixture();
        let mut driver = AnimationDriver::new(0.15);

        let outcome = driver
            .on_frame(&clock, &mut scheduler, &mut scene, group, &mut viewport)
            .unwrap();
        assert_eq!(outcome, TickOutcome::Skipped);
        assert_eq!(viewport.surface().frames(), 0);
    }

    #[test]
    fn stop_cancels_pending_frame() {
        let clock = ManualClock::new();
        let mut scheduler = Scheduler::default();
        let (mut scene, group, mut viewport) = fixture();

        let mut driver = AnimationDriver::new(0.15);
        driver.start(&clock, &mut scheduler);
        driver.stop(&mut scheduler);
        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(scheduler.cancelled, vec![FrameRequest(1)]);

        for _ in 0..5 {
            clock.advance(Duration::from_millis(16));
            let outcome = driver
                .on_frame(&clock, &mut scheduler, &mut scene, group, &mut viewport)
                .unwrap();
            assert_eq!(outcome, TickOutcome::Skipped);
        }
        assert_eq!(viewport.surface().frames(), 0);

        driver.start(&clock, &mut scheduler);
        assert_eq!(driver.state(), DriverState::Stopped);
    }
}
