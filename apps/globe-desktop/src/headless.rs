//! Windowless run: drives the globe with a manual clock and a text renderer.

use anyhow::{Result, bail};
use globe_assets::ThreadedTextureLoader;
use globe_common::{GlobeConfig, SurfaceSize, ViewportSize};
use globe_render::{
    DebugTextRenderer, FrameRequest, FrameScheduler, HostEnvironment, HostError, HostPhase,
    ManualClock, RenderError, RenderHost,
};
use std::time::Duration;

const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Host environment with no window. Frames fire when the caller steps them.
pub struct HeadlessEnvironment {
    size: ViewportSize,
    next_frame: u64,
    pending: Option<FrameRequest>,
    errors: Vec<String>,
    frames_drawn: u64,
    last_frame: String,
}

impl HeadlessEnvironment {
    pub fn new(size: ViewportSize) -> Self {
        Self {
            size,
            next_frame: 0,
            pending: None,
            errors: Vec::new(),
            frames_drawn: 0,
            last_frame: String::new(),
        }
    }

    fn take_pending(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }
}

impl FrameScheduler for HeadlessEnvironment {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_frame += 1;
        let request = FrameRequest(self.next_frame);
        self.pending = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

impl HostEnvironment for HeadlessEnvironment {
    type Surface = DebugTextRenderer;

    fn viewport_size(&self) -> ViewportSize {
        self.size
    }

    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }

    fn attach_surface(&mut self, size: SurfaceSize) -> Result<DebugTextRenderer, RenderError> {
        Ok(DebugTextRenderer::new(size))
    }

    fn detach_surface(&mut self, surface: DebugTextRenderer) {
        self.frames_drawn = surface.frames();
        self.last_frame = surface.last_frame().to_owned();
    }

    fn hide_loading_indicator(&mut self) {
        tracing::info!("textures loaded");
    }

    fn report_error(&mut self, error: &HostError) {
        self.errors.push(error.to_string());
    }
}

/// Summary of a headless run.
#[derive(Debug, Clone)]
pub struct HeadlessReport {
    pub frames_drawn: u64,
    /// Text rendering of the final frame.
    pub last_frame: String,
}

/// Load the textures, render `frames` frames at 60 Hz simulated time, unmount.
pub fn run(config: GlobeConfig, frames: u32) -> Result<HeadlessReport> {
    let size = ViewportSize::new(config.window.width, config.window.height);
    let loader = ThreadedTextureLoader::new(config.assets.max_texture_dimension);
    let clock = ManualClock::new();
    let mut host = RenderHost::with_clock(
        HeadlessEnvironment::new(size),
        loader,
        config,
        clock.clone(),
    );
    host.mount()?;

    loop {
        match host.poll_assets() {
            HostPhase::Loading => std::thread::sleep(POLL_INTERVAL),
            HostPhase::Running => break,
            phase => {
                let reason = host
                    .environment()
                    .errors
                    .last()
                    .cloned()
                    .unwrap_or_else(|| format!("host stopped in phase {phase:?}"));
                host.unmount()?;
                bail!(reason);
            }
        }
    }

    for _ in 0..frames {
        if host.environment_mut().take_pending().is_none() {
            break;
        }
        clock.advance(FRAME_INTERVAL);
        host.on_frame();
    }

    host.unmount()?;
    let env = host.into_environment();
    if let Some(error) = env.errors.last() {
        bail!(error.clone());
    }
    Ok(HeadlessReport {
        frames_drawn: env.frames_drawn,
        last_frame: env.last_frame,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write_png(path: &Path, width: u32, height: u32) {
        image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]))
            .save(path)
            .unwrap();
    }

    fn config(dir: &Path) -> GlobeConfig {
        let mut config = GlobeConfig::default();
        config.assets.day_map = dir.join("day.png");
        config.assets.night_map = dir.join("night.png");
        config.stars.pairs = 10;
        config
    }

    #[test]
    fn renders_requested_frames() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("day.png"), 8, 4);
        write_png(&dir.path().join("night.png"), 8, 4);

        let report = run(config(dir.path()), 5).unwrap();

        assert_eq!(report.frames_drawn, 5);
        assert!(report.last_frame.contains("Frame 5 (1280x720)"));
        assert!(report.last_frame.contains("globe radius=5.0 segments=50x50"));
        assert!(report.last_frame.contains("atmosphere scale=1.10"));
        assert!(report.last_frame.contains("stars points=20"));
    }

    #[test]
    fn missing_texture_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("day.png"), 8, 4);

        let err = run(config(dir.path()), 5).unwrap_err();
        assert!(err.to_string().contains("night.png"));
    }
}
