//! Mount lifecycle of the render host against a scripted environment.

use globe_assets::{
    AssetError, TextureImage, TextureLoad, TextureLoadSender, TextureLoader, TextureRequest,
    TextureSlot,
};
use globe_common::{GlobeConfig, SurfaceSize, ViewportSize};
use globe_render::{
    DriverState, FrameRequest, FrameScheduler, HostEnvironment, HostError, HostPhase,
    ManualClock, PerspectiveCamera, RenderError, RenderHost, Renderer, TickOutcome,
};
use globe_scene::{NodeKind, Scene};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct Draws {
    count: u64,
    fail_next: Option<RenderError>,
}

/// Surface that only counts draws.
struct CountingSurface {
    size: SurfaceSize,
    draws: Rc<RefCell<Draws>>,
}

impl Renderer for CountingSurface {
    fn set_size(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn render(&mut self, _scene: &Scene, _camera: &PerspectiveCamera) -> Result<(), RenderError> {
        let mut draws = self.draws.borrow_mut();
        if let Some(err) = draws.fail_next.take() {
            return Err(err);
        }
        draws.count += 1;
        Ok(())
    }
}

struct FakeEnv {
    size: ViewportSize,
    dpr: f64,
    draws: Rc<RefCell<Draws>>,
    fail_attach: bool,
    attached: u32,
    detached: u32,
    subscribed: bool,
    indicator_visible: bool,
    errors: Vec<String>,
    next_frame: u64,
    pending: Vec<FrameRequest>,
    cancelled: Vec<FrameRequest>,
}

impl FakeEnv {
    fn new() -> Self {
        Self {
            size: ViewportSize::new(800, 600),
            dpr: 1.0,
            draws: Rc::default(),
            fail_attach: false,
            attached: 0,
            detached: 0,
            subscribed: false,
            indicator_visible: true,
            errors: Vec::new(),
            next_frame: 0,
            pending: Vec::new(),
            cancelled: Vec::new(),
        }
    }

    fn draws(&self) -> u64 {
        self.draws.borrow().count
    }
}

impl FrameScheduler for FakeEnv {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_frame += 1;
        let request = FrameRequest(self.next_frame);
        self.pending.push(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.pending.retain(|r| *r != request);
        self.cancelled.push(request);
    }
}

impl HostEnvironment for FakeEnv {
    type Surface = CountingSurface;

    fn viewport_size(&self) -> ViewportSize {
        self.size
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.dpr
    }

    fn attach_surface(&mut self, size: SurfaceSize) -> Result<CountingSurface, RenderError> {
        if self.fail_attach {
            return Err(RenderError::SurfaceCreation("no adapter".into()));
        }
        self.attached += 1;
        Ok(CountingSurface {
            size,
            draws: Rc::clone(&self.draws),
        })
    }

    fn detach_surface(&mut self, _surface: CountingSurface) {
        self.detached += 1;
    }

    fn subscribe_resize(&mut self) {
        self.subscribed = true;
    }

    fn unsubscribe_resize(&mut self) {
        self.subscribed = false;
    }

    fn hide_loading_indicator(&mut self) {
        self.indicator_visible = false;
    }

    fn report_error(&mut self, error: &HostError) {
        self.errors.push(error.to_string());
    }
}

/// Loader whose results the test delivers by hand.
#[derive(Clone, Default)]
struct ScriptedLoader {
    senders: Rc<RefCell<Vec<TextureLoadSender>>>,
}

impl ScriptedLoader {
    fn sender(&self) -> TextureLoadSender {
        self.senders.borrow().last().cloned().expect("load started")
    }

    fn loads_started(&self) -> usize {
        self.senders.borrow().len()
    }
}

impl TextureLoader for ScriptedLoader {
    fn load(&mut self, _request: TextureRequest) -> TextureLoad {
        let (sender, load) = TextureLoad::channel(None);
        self.senders.borrow_mut().push(sender);
        load
    }
}

fn texture(label: &str) -> Arc<TextureImage> {
    Arc::new(TextureImage::from_rgba8(label, 2, 2, vec![200; 16]).unwrap())
}

fn small_config() -> GlobeConfig {
    let mut config = GlobeConfig::default();
    config.stars.pairs = 50;
    config
}

struct Harness {
    host: RenderHost<FakeEnv, ScriptedLoader, ManualClock>,
    loader: ScriptedLoader,
    clock: ManualClock,
}

impl Harness {
    fn new(env: FakeEnv) -> Self {
        let loader = ScriptedLoader::default();
        let clock = ManualClock::new();
        let host = RenderHost::with_clock(env, loader.clone(), small_config(), clock.clone());
        Self {
            host,
            loader,
            clock,
        }
    }

    fn mounted() -> Self {
        let mut harness = Self::new(FakeEnv::new());
        harness.host.mount().unwrap();
        harness
    }

    fn resolve(&mut self) {
        let sender = self.loader.sender();
        sender.resolve(TextureSlot::Day, texture("day"));
        sender.resolve(TextureSlot::Night, texture("night"));
        self.host.poll_assets();
    }

    fn frames(&mut self, n: usize) -> Vec<TickOutcome> {
        (0..n)
            .map(|_| {
                self.clock.advance(Duration::from_millis(16));
                self.host.on_frame()
            })
            .collect()
    }
}

#[test]
fn scene_is_empty_until_both_textures_resolve() {
    let mut h = Harness::mounted();
    assert_eq!(h.host.phase(), HostPhase::Loading);
    assert!(h.host.scene().is_none());

    let sender = h.loader.sender();
    sender.resolve(TextureSlot::Day, texture("day"));
    assert_eq!(h.host.poll_assets(), HostPhase::Loading);
    assert!(h.host.scene().is_none());
    assert_eq!(h.frames(3), vec![TickOutcome::Skipped; 3]);
    assert_eq!(h.host.environment().draws(), 0);

    sender.resolve(TextureSlot::Night, texture("night"));
    assert_eq!(h.host.poll_assets(), HostPhase::Running);
    let scene = h.host.scene().unwrap();
    assert_eq!(scene.count(NodeKind::Globe), 1);
    assert_eq!(scene.count(NodeKind::Atmosphere), 1);
    assert_eq!(scene.count(NodeKind::Stars), 1);
}

#[test]
fn loading_indicator_hides_only_after_resolve() {
    let mut h = Harness::mounted();
    assert!(h.host.environment().indicator_visible);
    h.host.poll_assets();
    assert!(h.host.environment().indicator_visible);

    h.resolve();
    assert!(!h.host.environment().indicator_visible);
    assert_eq!(h.host.driver_state(), DriverState::Running);
}

#[test]
fn frames_rotate_and_draw_once_running() {
    let mut h = Harness::mounted();
    h.resolve();

    h.clock.set(Duration::from_secs(10));
    assert_eq!(h.host.on_frame(), TickOutcome::Rendered);
    let angle = h.host.group_rotation().unwrap();
    assert!((angle - 1.5).abs() < 1e-5);

    h.frames(4);
    assert_eq!(h.host.environment().draws(), 5);
    assert_eq!(h.host.environment().next_frame, 6);
}

#[test]
fn unmount_stops_all_drawing() {
    let mut h = Harness::mounted();
    h.resolve();
    h.frames(3);
    assert_eq!(h.host.environment().draws(), 3);

    h.host.unmount().unwrap();
    assert_eq!(h.host.phase(), HostPhase::TornDown);
    assert_eq!(h.host.driver_state(), DriverState::Stopped);

    assert_eq!(h.frames(10), vec![TickOutcome::Skipped; 10]);
    let env = h.host.environment();
    assert_eq!(env.draws(), 3);
    assert_eq!(env.detached, 1);
    assert!(!env.subscribed);
    assert_eq!(env.cancelled, vec![FrameRequest(4)]);
}

#[test]
fn unmount_while_loading_discards_textures() {
    let mut h = Harness::mounted();
    h.host.unmount().unwrap();

    let sender = h.loader.sender();
    assert!(!sender.resolve(TextureSlot::Day, texture("day")));
    assert_eq!(h.host.poll_assets(), HostPhase::TornDown);
    assert!(h.host.scene().is_none());
    assert_eq!(h.host.environment().detached, 1);
}

#[test]
fn resize_before_mount_is_ignored() {
    let mut h = Harness::new(FakeEnv::new());
    h.host.environment_mut().size = ViewportSize::new(1920, 1080);
    h.host.on_resize();
    assert!(h.host.viewport().is_none());

    h.host.mount().unwrap();
    let viewport = h.host.viewport().unwrap();
    assert_eq!(viewport.size(), ViewportSize::new(1920, 1080));
}

#[test]
fn resize_applies_capped_pixel_ratio() {
    let mut env = FakeEnv::new();
    env.dpr = 3.0;
    let mut h = Harness::new(env);
    h.host.mount().unwrap();
    h.resolve();

    h.host.environment_mut().size = ViewportSize::new(1920, 1080);
    h.host.on_resize();

    let viewport = h.host.viewport().unwrap();
    assert_eq!(viewport.camera().aspect(), 1920.0 / 1080.0);
    assert_eq!(viewport.surface().size, SurfaceSize::new(3840, 2160));
}

#[test]
fn load_failure_keeps_indicator_and_can_retry() {
    let mut h = Harness::mounted();
    let sender = h.loader.sender();
    sender.fail(TextureSlot::Night, AssetError::Timeout(Duration::from_secs(1)));

    assert_eq!(h.host.poll_assets(), HostPhase::LoadFailed);
    assert!(h.host.environment().indicator_visible);
    assert_eq!(h.host.environment().errors.len(), 1);
    assert!(h.host.scene().is_none());

    assert!(h.host.retry_textures());
    assert_eq!(h.loader.loads_started(), 2);
    assert_eq!(h.host.phase(), HostPhase::Loading);
    h.resolve();
    assert_eq!(h.host.phase(), HostPhase::Running);
    assert!(!h.host.environment().indicator_visible);
}

#[test]
fn retry_is_refused_unless_failed() {
    let mut h = Harness::mounted();
    assert!(!h.host.retry_textures());
    h.resolve();
    assert!(!h.host.retry_textures());
    assert_eq!(h.loader.loads_started(), 1);
}

#[test]
fn second_mount_is_rejected() {
    let mut h = Harness::mounted();
    assert!(matches!(h.host.mount(), Err(HostError::AlreadyMounted)));
    assert_eq!(h.host.environment().attached, 1);
}

#[test]
fn remount_through_new_host() {
    let mut h = Harness::mounted();
    h.resolve();
    h.host.unmount().unwrap();
    assert!(matches!(h.host.unmount(), Err(HostError::NotMounted)));

    let env = h.host.into_environment();
    let mut h = Harness::new(env);
    h.host.mount().unwrap();
    assert_eq!(h.host.environment().attached, 2);
    assert!(h.host.environment().subscribed);
}

#[test]
fn surface_failure_fails_mount() {
    let mut env = FakeEnv::new();
    env.fail_attach = true;
    let mut h = Harness::new(env);

    let err = h.host.mount().unwrap_err();
    assert!(matches!(err, HostError::Surface(RenderError::SurfaceCreation(_))));
    assert_eq!(h.host.phase(), HostPhase::TornDown);
    assert_eq!(h.host.environment().errors.len(), 1);
    assert_eq!(h.loader.loads_started(), 0);
}

#[test]
fn recoverable_render_error_keeps_running() {
    let mut h = Harness::mounted();
    h.resolve();
    h.host.environment().draws.borrow_mut().fail_next = Some(RenderError::SurfaceLost);

    assert_eq!(
        h.frames(2),
        vec![TickOutcome::Recovered, TickOutcome::Rendered]
    );
    assert_eq!(h.host.driver_state(), DriverState::Running);
    assert!(h.host.environment().errors.is_empty());
}

#[test]
fn fatal_render_error_stops_driver() {
    let mut h = Harness::mounted();
    h.resolve();
    h.host.environment().draws.borrow_mut().fail_next = Some(RenderError::OutOfMemory);

    assert_eq!(h.host.on_frame(), TickOutcome::Failed);
    assert_eq!(h.host.driver_state(), DriverState::Stopped);
    assert_eq!(h.host.environment().errors.len(), 1);
    assert_eq!(h.frames(3), vec![TickOutcome::Skipped; 3]);
    assert_eq!(h.host.environment().draws(), 0);
}
