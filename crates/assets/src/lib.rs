//! Texture assets for the globe: sources, decoding, and the day/night load handle.
//!
//! Textures are decoded off the calling thread. The caller observes completion
//! by polling a [`TextureLoad`] from its own (main) thread; nothing here blocks.
//!
//! # Invariants
//! - A load resolves only once both the day and night maps are decoded.
//! - Decoded textures are shared by [`TextureHandle`], never copied.

mod loader;
mod texture;

pub use loader::{
    LoadStatus, TextureLoad, TextureLoadSender, TextureLoader, TexturePair, TextureRequest,
    ThreadedTextureLoader,
};
pub use texture::{TextureHandle, TextureImage, TextureSlot, TextureSource};

use std::path::PathBuf;
use std::time::Duration;

/// Errors from texture loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {label}: {source}")]
    Decode {
        label: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to start texture worker: {0}")]
    Worker(#[source] std::io::Error),
    #[error("{0} texture worker exited without a result")]
    Disconnected(TextureSlot),
    #[error("texture loading timed out after {0:?}")]
    Timeout(Duration),
}
