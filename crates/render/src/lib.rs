//! Rendering core: renderer-agnostic interface and the globe's runtime lifecycle.
//!
//! A [`RenderHost`] is mounted into a [`HostEnvironment`], which supplies the
//! drawing surface, window metrics, frame scheduling and the loading indicator.
//! The host owns a [`ViewportManager`] from mount, builds the scene once the
//! textures resolve, and then drives it with an [`AnimationDriver`].
//!
//! # Invariants
//! - Nothing is rendered before both textures have resolved.
//! - After unmount no further frame renders; the pending frame is cancelled.
//! - Resize notifications before the viewport exists are ignored.
//! - Everything here runs on one thread; only texture decoding is off-thread.

mod animation;
mod camera;
mod error;
mod host;
mod renderer;
pub mod shading;
mod viewport;

pub use animation::{
    AnimationDriver, Clock, DriverState, FrameRequest, FrameScheduler, ManualClock, SystemClock,
    TickOutcome, rotation_at,
};
pub use camera::PerspectiveCamera;
pub use error::{HostError, RenderError};
pub use host::{HostEnvironment, HostPhase, RenderHost};
pub use renderer::{DebugTextRenderer, Renderer};
pub use viewport::ViewportManager;
