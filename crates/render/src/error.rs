use globe_assets::AssetError;
use globe_scene::SceneError;

/// Errors raised by a drawing surface.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create drawing surface: {0}")]
    SurfaceCreation(String),
    #[error("drawing surface was lost or outdated and has been reconfigured")]
    SurfaceLost,
    #[error("timed out acquiring the next surface frame")]
    Timeout,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("texture {label} is {width}x{height}, device limit is {max}")]
    TextureTooLarge {
        label: String,
        width: u32,
        height: u32,
        max: u32,
    },
    #[error("render backend error: {0}")]
    Backend(String),
}

impl RenderError {
    /// Whether the animation loop may continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RenderError::SurfaceLost | RenderError::Timeout)
    }
}

/// Errors surfaced by the render host to its environment.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("render host is already mounted")]
    AlreadyMounted,
    #[error("render host is not mounted")]
    NotMounted,
    #[error("texture loading failed: {0}")]
    Asset(#[from] AssetError),
    #[error("scene construction failed: {0}")]
    Scene(#[from] SceneError),
    #[error("drawing surface unavailable: {0}")]
    Surface(#[source] RenderError),
    #[error("rendering stopped: {0}")]
    Render(#[source] RenderError),
}
