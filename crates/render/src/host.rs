use crate::animation::{AnimationDriver, Clock, DriverState, FrameScheduler, SystemClock, TickOutcome};
use crate::error::{HostError, RenderError};
use crate::renderer::Renderer;
use crate::viewport::ViewportManager;
use globe_assets::{LoadStatus, TextureLoad, TextureLoader, TextureRequest};
use globe_common::{GlobeConfig, SurfaceSize, ViewportSize};
use globe_scene::{BuiltScene, Scene, SceneBuilder};
use std::mem;

/// Everything the render host needs from the window it lives in.
pub trait HostEnvironment: FrameScheduler {
    type Surface: Renderer;

    /// Current logical window size.
    fn viewport_size(&self) -> ViewportSize;

    /// Raw device pixel ratio; the host applies the cap.
    fn device_pixel_ratio(&self) -> f64;

    /// Create the one drawing surface, sized in physical pixels.
    fn attach_surface(&mut self, size: SurfaceSize) -> Result<Self::Surface, RenderError>;

    /// Take back the surface on unmount.
    fn detach_surface(&mut self, surface: Self::Surface);

    /// Start delivering resize notifications to [`RenderHost::on_resize`].
    fn subscribe_resize(&mut self) {}

    fn unsubscribe_resize(&mut self) {}

    fn hide_loading_indicator(&mut self);

    fn report_error(&mut self, error: &HostError);
}

/// Coarse lifecycle position of a [`RenderHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPhase {
    Unmounted,
    /// Surface attached, textures in flight.
    Loading,
    /// Texture loading failed; see [`RenderHost::retry_textures`].
    LoadFailed,
    Running,
    TornDown,
}

enum Phase<S> {
    Unmounted,
    Loading {
        viewport: ViewportManager<S>,
        load: TextureLoad,
    },
    LoadFailed {
        viewport: ViewportManager<S>,
    },
    Running {
        viewport: ViewportManager<S>,
        built: BuiltScene,
    },
    TornDown,
}

impl<S> Phase<S> {
    fn kind(&self) -> HostPhase {
        match self {
            Phase::Unmounted => HostPhase::Unmounted,
            Phase::Loading { .. } => HostPhase::Loading,
            Phase::LoadFailed { .. } => HostPhase::LoadFailed,
            Phase::Running { .. } => HostPhase::Running,
            Phase::TornDown => HostPhase::TornDown,
        }
    }

    fn into_viewport(self) -> Option<ViewportManager<S>> {
        match self {
            Phase::Loading { viewport, .. }
            | Phase::LoadFailed { viewport }
            | Phase::Running { viewport, .. } => Some(viewport),
            Phase::Unmounted | Phase::TornDown => None,
        }
    }
}

/// Mounts the globe into a [`HostEnvironment`] and runs it until unmount.
///
/// A host mounts at most once. To remount, build a new host around the
/// environment returned by [`into_environment`](Self::into_environment).
pub struct RenderHost<E: HostEnvironment, L, C = SystemClock> {
    env: E,
    loader: L,
    clock: C,
    config: GlobeConfig,
    builder: SceneBuilder,
    driver: AnimationDriver,
    phase: Phase<E::Surface>,
}

impl<E: HostEnvironment, L: TextureLoader> RenderHost<E, L, SystemClock> {
    pub fn new(env: E, loader: L, config: GlobeConfig) -> Self {
        Self::with_clock(env, loader, config, SystemClock::new())
    }
}

impl<E: HostEnvironment, L: TextureLoader, C: Clock> RenderHost<E, L, C> {
    pub fn with_clock(env: E, loader: L, config: GlobeConfig, clock: C) -> Self {
        Self {
            env,
            loader,
            clock,
            builder: SceneBuilder::from_config(&config),
            driver: AnimationDriver::new(config.globe.rotation_speed),
            config,
            phase: Phase::Unmounted,
        }
    }

    /// Attach the surface, subscribe to resize and start loading textures.
    pub fn mount(&mut self) -> Result<(), HostError> {
        if !matches!(self.phase, Phase::Unmounted) {
            return Err(HostError::AlreadyMounted);
        }

        let size = self.env.viewport_size();
        let dpr = self.env.device_pixel_ratio();
        let surface_size = ViewportManager::<E::Surface>::surface_size_for(size, dpr);
        let surface = match self.env.attach_surface(surface_size) {
            Ok(surface) => surface,
            Err(e) => {
                let err = HostError::Surface(e);
                tracing::error!("{err}");
                self.env.report_error(&err);
                self.phase = Phase::TornDown;
                return Err(err);
            }
        };

        let viewport = ViewportManager::new(&self.config.camera, size, dpr, surface);
        self.env.subscribe_resize();
        let load = self.start_load();
        self.phase = Phase::Loading { viewport, load };
        tracing::info!(
            "mounted at {}x{} (surface {}x{})",
            size.width,
            size.height,
            surface_size.width,
            surface_size.height
        );
        Ok(())
    }

    /// Check on the texture load; builds the scene and starts animating once
    /// both maps are in.
    pub fn poll_assets(&mut self) -> HostPhase {
        let status = match &mut self.phase {
            Phase::Loading { load, .. } => load.poll(),
            other => return other.kind(),
        };
        let result = match status {
            LoadStatus::Pending => return HostPhase::Loading,
            LoadStatus::Ready(textures) => self.builder.build(textures).map_err(HostError::from),
            LoadStatus::Failed(e) => Err(HostError::from(e)),
        };
        let Some(viewport) = mem::replace(&mut self.phase, Phase::TornDown).into_viewport() else {
            return self.phase.kind();
        };

        match result {
            Ok(built) => {
                self.phase = Phase::Running { viewport, built };
                self.env.hide_loading_indicator();
                self.driver.start(&self.clock, &mut self.env);
                tracing::info!("textures ready, globe running");
            }
            Err(err) => {
                tracing::warn!("{err}");
                self.env.report_error(&err);
                self.phase = Phase::LoadFailed { viewport };
            }
        }
        self.phase.kind()
    }

    /// Start a fresh texture load after a failure. Returns `false` in any
    /// other phase.
    pub fn retry_textures(&mut self) -> bool {
        if !matches!(self.phase, Phase::LoadFailed { .. }) {
            return false;
        }
        let load = self.start_load();
        if let Some(viewport) = mem::replace(&mut self.phase, Phase::TornDown).into_viewport() {
            self.phase = Phase::Loading { viewport, load };
        }
        tracing::info!("retrying texture load");
        true
    }

    /// Handle a frame callback from the environment.
    pub fn on_frame(&mut self) -> TickOutcome {
        let Phase::Running { viewport, built } = &mut self.phase else {
            return TickOutcome::Skipped;
        };
        match self.driver.on_frame(
            &self.clock,
            &mut self.env,
            &mut built.scene,
            built.group,
            viewport,
        ) {
            Ok(outcome) => outcome,
            Err(e) => {
                let err = HostError::Render(e);
                tracing::error!("{err}");
                self.env.report_error(&err);
                TickOutcome::Failed
            }
        }
    }

    /// Re-read the window size from the environment and apply it.
    pub fn on_resize(&mut self) {
        let size = self.env.viewport_size();
        match self.viewport_mut() {
            Some(viewport) => viewport.resize(size),
            None => tracing::debug!(
                "resize to {}x{} ignored: viewport not ready",
                size.width,
                size.height
            ),
        }
    }

    /// Re-read the device pixel ratio from the environment and apply it.
    pub fn on_device_pixel_ratio(&mut self) {
        let dpr = self.env.device_pixel_ratio();
        if let Some(viewport) = self.viewport_mut() {
            viewport.set_device_pixel_ratio(dpr);
        }
    }

    /// Stop animating, unsubscribe and hand the surface back.
    pub fn unmount(&mut self) -> Result<(), HostError> {
        if matches!(self.phase, Phase::Unmounted | Phase::TornDown) {
            return Err(HostError::NotMounted);
        }
        self.driver.stop(&mut self.env);
        self.env.unsubscribe_resize();
        if let Some(viewport) = mem::replace(&mut self.phase, Phase::TornDown).into_viewport() {
            self.env.detach_surface(viewport.into_surface());
        }
        tracing::info!("unmounted");
        Ok(())
    }

    pub fn phase(&self) -> HostPhase {
        self.phase.kind()
    }

    /// The scene, once textures have resolved.
    pub fn scene(&self) -> Option<&Scene> {
        match &self.phase {
            Phase::Running { built, .. } => Some(&built.scene),
            _ => None,
        }
    }

    pub fn group_rotation(&self) -> Option<f32> {
        match &self.phase {
            Phase::Running { built, .. } => {
                built.scene.group(built.group).map(|g| g.rotation_y())
            }
            _ => None,
        }
    }

    pub fn viewport(&self) -> Option<&ViewportManager<E::Surface>> {
        match &self.phase {
            Phase::Loading { viewport, .. }
            | Phase::LoadFailed { viewport }
            | Phase::Running { viewport, .. } => Some(viewport),
            Phase::Unmounted | Phase::TornDown => None,
        }
    }

    pub fn driver_state(&self) -> DriverState {
        self.driver.state()
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn into_environment(self) -> E {
        self.env
    }

    fn viewport_mut(&mut self) -> Option<&mut ViewportManager<E::Surface>> {
        match &mut self.phase {
            Phase::Loading { viewport, .. }
            | Phase::LoadFailed { viewport }
            | Phase::Running { viewport, .. } => Some(viewport),
            Phase::Unmounted | Phase::TornDown => None,
        }
    }

    fn start_load(&mut self) -> TextureLoad {
        self.loader
            .load(TextureRequest::from_config(&self.config.assets))
    }
}
