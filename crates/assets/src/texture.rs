use crate::AssetError;
use image::imageops::FilterType;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared, immutable reference to a decoded texture.
pub type TextureHandle = Arc<TextureImage>;

/// Which of the two globe maps a texture belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Day,
    Night,
}

impl fmt::Display for TextureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureSlot::Day => f.write_str("day"),
            TextureSlot::Night => f.write_str("night"),
        }
    }
}

/// Where the encoded image bytes come from.
#[derive(Debug, Clone)]
pub enum TextureSource {
    Path(PathBuf),
    /// Already-loaded encoded bytes (embedded assets, tests).
    Bytes { label: String, bytes: Arc<[u8]> },
}

impl TextureSource {
    pub fn label(&self) -> String {
        match self {
            TextureSource::Path(path) => path.display().to_string(),
            TextureSource::Bytes { label, .. } => label.clone(),
        }
    }

    /// Read the encoded bytes. Blocks on file IO; call from a worker thread.
    pub fn read(&self) -> Result<Arc<[u8]>, AssetError> {
        match self {
            TextureSource::Path(path) => std::fs::read(path)
                .map(Arc::from)
                .map_err(|source| AssetError::Io {
                    path: path.clone(),
                    source,
                }),
            TextureSource::Bytes { bytes, .. } => Ok(bytes.clone()),
        }
    }
}

impl From<PathBuf> for TextureSource {
    fn from(path: PathBuf) -> Self {
        TextureSource::Path(path)
    }
}

/// A decoded RGBA8 image, row-major with the first row at the top.
#[derive(Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl fmt::Debug for TextureImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureImage")
            .field("label", &self.label)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

impl TextureImage {
    /// Build a texture from raw RGBA8 pixels. Returns `None` if the length
    /// does not match the dimensions.
    pub fn from_rgba8(
        label: impl Into<String>,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Option<Self> {
        if pixels.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self {
            label: label.into(),
            width,
            height,
            pixels,
        })
    }

    /// Decode an encoded image (PNG or JPEG). Images larger than
    /// `max_dimension` on either axis are downscaled, keeping aspect ratio.
    pub fn decode(
        label: impl Into<String>,
        bytes: &[u8],
        max_dimension: u32,
    ) -> Result<Self, AssetError> {
        let label = label.into();
        let mut img = image::load_from_memory(bytes).map_err(|source| AssetError::Decode {
            label: label.clone(),
            source,
        })?;
        if img.width() > max_dimension || img.height() > max_dimension {
            tracing::debug!(
                "downscaling {label} from {}x{} to fit {max_dimension}",
                img.width(),
                img.height()
            );
            img = img.resize(max_dimension, max_dimension, FilterType::Triangle);
        }
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            label,
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Bytes per row of the RGBA8 pixel data.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}
