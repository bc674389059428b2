use crate::gpu::GlobeRenderer;
use globe_common::SurfaceSize;
use globe_render::{PerspectiveCamera, RenderError, Renderer};
use globe_scene::Scene;

/// Presentation settings for a [`WgpuSurface`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceOptions {
    pub vsync: bool,
    pub clear_color: [f64; 4],
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            vsync: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Pick the surface format and the format frames are rendered in.
///
/// Shader output reaches the display unconverted, so frames use the non-sRGB
/// variant. A surface offering only sRGB formats is viewed through that variant.
fn choose_formats(
    formats: &[wgpu::TextureFormat],
) -> Option<(wgpu::TextureFormat, wgpu::TextureFormat)> {
    let surface = formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first())
        .copied()?;
    Some((surface, surface.remove_srgb_suffix()))
}

/// A window surface plus the device that draws into it.
pub struct WgpuSurface {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    render_format: wgpu::TextureFormat,
    renderer: GlobeRenderer,
    backend: wgpu::Backend,
}

impl WgpuSurface {
    /// Create a surface for `target` (typically an `Arc<winit::window::Window>`)
    /// and bring up an adapter and device for it.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        size: SurfaceSize,
        options: SurfaceOptions,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(target)
            .map_err(|e| RenderError::SurfaceCreation(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| RenderError::SurfaceCreation("no compatible GPU adapter".into()))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("globe_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| RenderError::SurfaceCreation(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let (surface_format, render_format) = choose_formats(&surface_caps.formats)
            .ok_or_else(|| RenderError::SurfaceCreation("surface reports no formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if options.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: if render_format == surface_format {
                vec![]
            } else {
                vec![render_format]
            },
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = GlobeRenderer::new(
            &device,
            render_format,
            config.width,
            config.height,
            options.clear_color,
        );

        let backend = adapter.get_info().backend;
        tracing::info!(
            "GPU initialized with {} backend ({:?}, {}x{})",
            backend.to_str(),
            render_format,
            config.width,
            config.height
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_format,
            renderer,
            backend,
        })
    }

    pub fn backend(&self) -> wgpu::Backend {
        self.backend
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }
}

impl Renderer for WgpuSurface {
    fn set_size(&mut self, size: SurfaceSize) {
        let (width, height) = (size.width.max(1), size.height.max(1));
        if width == self.config.width && height == self.config.height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
        self.renderer.resize(&self.device, width, height);
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.reconfigure();
                return Err(RenderError::SurfaceLost);
            }
            Err(wgpu::SurfaceError::Timeout) => return Err(RenderError::Timeout),
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => return Err(RenderError::Backend(e.to_string())),
        };

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.render_format),
            ..Default::default()
        });
        self.renderer
            .render(&self.device, &self.queue, &view, scene, camera)?;
        output.present();
        Ok(())
    }
}
