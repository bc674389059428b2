mod headless;

use anyhow::Result;
use clap::Parser;
use globe_assets::ThreadedTextureLoader;
use globe_common::{GlobeConfig, SurfaceSize, ViewportSize};
use globe_render::{
    FrameRequest, FrameScheduler, HostEnvironment, HostError, HostPhase, RenderError, RenderHost,
};
use globe_render_wgpu::{SurfaceOptions, WgpuSurface};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// How often texture loading is polled while the globe is not yet running.
const ASSET_POLL_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Parser)]
#[command(name = "globe-desktop", about = "Animated day/night globe")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Full tracing filter directive (overrides --verbose)
    #[arg(long)]
    log_filter: Option<String>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Day texture path
    #[arg(long)]
    day_map: Option<PathBuf>,

    /// Night texture path
    #[arg(long)]
    night_map: Option<PathBuf>,

    /// Window width in logical pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in logical pixels
    #[arg(long)]
    height: Option<u32>,

    /// Present without waiting for vertical sync
    #[arg(long)]
    no_vsync: bool,

    /// Run without a window and print the last frame as text
    #[arg(long)]
    headless: bool,

    /// Frames to render in headless mode
    #[arg(long, default_value_t = 60)]
    frames: u32,
}

impl Cli {
    fn load_config(&self) -> Result<GlobeConfig> {
        let mut config = match &self.config {
            Some(path) => GlobeConfig::load(path)?,
            None => GlobeConfig::default(),
        };
        if let Some(day) = &self.day_map {
            config.assets.day_map = day.clone();
        }
        if let Some(night) = &self.night_map {
            config.assets.night_map = night.clone();
        }
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        if self.no_vsync {
            config.render.vsync = false;
        }
        config.validate()?;
        Ok(config)
    }
}

/// The winit window as seen by the render host.
///
/// Frame requests become redraw requests; the loading indicator is the
/// window title.
struct DesktopEnvironment {
    window: Arc<Window>,
    title: String,
    options: SurfaceOptions,
    next_frame: u64,
    pending_frame: Option<FrameRequest>,
    resize_subscribed: bool,
}

impl DesktopEnvironment {
    fn new(window: Arc<Window>, config: &GlobeConfig) -> Self {
        window.set_title(&format!("{} (loading...)", config.window.title));
        Self {
            window,
            title: config.window.title.clone(),
            options: SurfaceOptions {
                vsync: config.render.vsync,
                clear_color: config.render.clear_color,
            },
            next_frame: 0,
            pending_frame: None,
            resize_subscribed: false,
        }
    }

    /// Consume the outstanding frame request, if this redraw answers one.
    fn take_frame(&mut self) -> Option<FrameRequest> {
        self.pending_frame.take()
    }
}

impl FrameScheduler for DesktopEnvironment {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_frame += 1;
        let request = FrameRequest(self.next_frame);
        self.pending_frame = Some(request);
        self.window.request_redraw();
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending_frame == Some(request) {
            self.pending_frame = None;
        }
    }
}

impl HostEnvironment for DesktopEnvironment {
    type Surface = WgpuSurface;

    fn viewport_size(&self) -> ViewportSize {
        let logical: LogicalSize<f64> = self
            .window
            .inner_size()
            .to_logical(self.window.scale_factor());
        ViewportSize::new(
            logical.width.round() as u32,
            logical.height.round() as u32,
        )
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.scale_factor()
    }

    fn attach_surface(&mut self, size: SurfaceSize) -> Result<WgpuSurface, RenderError> {
        WgpuSurface::new(self.window.clone(), size, self.options)
    }

    fn detach_surface(&mut self, surface: WgpuSurface) {
        tracing::debug!("releasing {} surface", surface.backend().to_str());
    }

    fn subscribe_resize(&mut self) {
        self.resize_subscribed = true;
    }

    fn unsubscribe_resize(&mut self) {
        self.resize_subscribed = false;
    }

    fn hide_loading_indicator(&mut self) {
        self.window.set_title(&self.title);
    }

    fn report_error(&mut self, error: &HostError) {
        tracing::error!("{error}");
        let hint = match error {
            HostError::Asset(_) => " (press R to retry)",
            _ => "",
        };
        self.window
            .set_title(&format!("{} (error: {error}){hint}", self.title));
    }
}

type DesktopHost = RenderHost<DesktopEnvironment, ThreadedTextureLoader>;

struct GlobeApp {
    config: GlobeConfig,
    host: Option<DesktopHost>,
}

impl GlobeApp {
    fn new(config: GlobeConfig) -> Self {
        Self { config, host: None }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut host) = self.host.take() {
            if let Err(e) = host.unmount() {
                tracing::debug!("shutdown: {e}");
            }
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for GlobeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.host.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let env = DesktopEnvironment::new(window, &self.config);
        let loader = ThreadedTextureLoader::new(self.config.assets.max_texture_dimension);
        let mut host = RenderHost::new(env, loader, self.config.clone());
        if let Err(e) = host.mount() {
            tracing::error!("mount failed: {e}");
            event_loop.exit();
            return;
        }
        self.host = Some(host);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(host) = self.host.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(_) => {
                if host.environment().resize_subscribed {
                    host.on_resize();
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                host.on_device_pixel_ratio();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match key {
                KeyCode::KeyR => {
                    if host.retry_textures() {
                        let title = format!("{} (loading...)", self.config.window.title);
                        host.environment().window.set_title(&title);
                    }
                }
                KeyCode::Escape => self.shutdown(event_loop),
                _ => {}
            },
            WindowEvent::RedrawRequested => {
                if host.environment_mut().take_frame().is_some() {
                    host.on_frame();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(host) = self.host.as_mut() else {
            return;
        };
        match host.poll_assets() {
            HostPhase::Loading => event_loop.set_control_flow(ControlFlow::WaitUntil(
                Instant::now() + ASSET_POLL_INTERVAL,
            )),
            _ => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match &cli.log_filter {
        Some(directive) => EnvFilter::try_new(directive)?,
        None => EnvFilter::new(if cli.verbose { "debug" } else { "info" }),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = cli.load_config()?;
    tracing::info!(
        "globe-desktop starting (day={}, night={})",
        config.assets.day_map.display(),
        config.assets.night_map.display()
    );

    if cli.headless {
        let report = headless::run(config, cli.frames)?;
        tracing::info!("rendered {} frames", report.frames_drawn);
        println!("{}", report.last_frame);
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = GlobeApp::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
