use crate::texture::{TextureHandle, TextureImage, TextureSlot, TextureSource};
use crate::AssetError;
use globe_common::AssetConfig;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

/// The two decoded globe maps.
#[derive(Debug, Clone)]
pub struct TexturePair {
    pub day: TextureHandle,
    pub night: TextureHandle,
}

/// What to load and how long to wait for it.
#[derive(Debug, Clone)]
pub struct TextureRequest {
    pub day: TextureSource,
    pub night: TextureSource,
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl TextureRequest {
    pub fn from_config(config: &AssetConfig) -> Self {
        Self {
            day: TextureSource::Path(config.day_map.clone()),
            night: TextureSource::Path(config.night_map.clone()),
            timeout: (config.load_timeout_secs > 0)
                .then(|| Duration::from_secs(config.load_timeout_secs)),
        }
    }
}

/// Result of polling a [`TextureLoad`].
#[derive(Debug)]
pub enum LoadStatus {
    Pending,
    Ready(TexturePair),
    Failed(AssetError),
}

type SlotResult = (TextureSlot, Result<TextureHandle, AssetError>);

/// Producer side of a [`TextureLoad`]. Workers (or tests) deliver one result per slot.
#[derive(Debug, Clone)]
pub struct TextureLoadSender {
    sender: Sender<SlotResult>,
}

impl TextureLoadSender {
    /// Deliver a result. Returns `false` if the load handle was dropped.
    pub fn send(&self, slot: TextureSlot, result: Result<TextureHandle, AssetError>) -> bool {
        self.sender.send((slot, result)).is_ok()
    }

    pub fn resolve(&self, slot: TextureSlot, texture: TextureHandle) -> bool {
        self.send(slot, Ok(texture))
    }

    pub fn fail(&self, slot: TextureSlot, error: AssetError) -> bool {
        self.send(slot, Err(error))
    }
}

/// Pending day/night texture load, polled from the thread that owns the scene.
///
/// Resolves to [`LoadStatus::Ready`] once both slots have arrived, and reports
/// [`LoadStatus::Failed`] on the first error, when every producer has gone
/// away with a slot still missing, or when the timeout elapses.
#[derive(Debug)]
pub struct TextureLoad {
    receiver: Receiver<SlotResult>,
    day: Option<TextureHandle>,
    night: Option<TextureHandle>,
    deadline: Option<(Instant, Duration)>,
}

impl TextureLoad {
    /// Create a load handle and its producer side.
    pub fn channel(timeout: Option<Duration>) -> (TextureLoadSender, TextureLoad) {
        let (sender, receiver) = mpsc::channel();
        let load = TextureLoad {
            receiver,
            day: None,
            night: None,
            deadline: timeout.map(|t| (Instant::now() + t, t)),
        };
        (TextureLoadSender { sender }, load)
    }

    /// Drain delivered results without blocking.
    pub fn poll(&mut self) -> LoadStatus {
        loop {
            match self.receiver.try_recv() {
                Ok((slot, Ok(texture))) => {
                    tracing::debug!(
                        "{slot} texture ready ({}x{})",
                        texture.width,
                        texture.height
                    );
                    match slot {
                        TextureSlot::Day => self.day = Some(texture),
                        TextureSlot::Night => self.night = Some(texture),
                    }
                }
                Ok((_, Err(e))) => return LoadStatus::Failed(e),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if let Some(missing) = self.missing_slot() {
                        return LoadStatus::Failed(AssetError::Disconnected(missing));
                    }
                    break;
                }
            }
        }

        match (self.day.take(), self.night.take()) {
            (Some(day), Some(night)) => return LoadStatus::Ready(TexturePair { day, night }),
            (day, night) => {
                self.day = day;
                self.night = night;
            }
        }

        match self.deadline {
            Some((deadline, timeout)) if Instant::now() >= deadline => {
                LoadStatus::Failed(AssetError::Timeout(timeout))
            }
            _ => LoadStatus::Pending,
        }
    }

    fn missing_slot(&self) -> Option<TextureSlot> {
        if self.day.is_none() {
            Some(TextureSlot::Day)
        } else if self.night.is_none() {
            Some(TextureSlot::Night)
        } else {
            None
        }
    }
}

/// Starts texture loads. Implementations must not block the caller.
pub trait TextureLoader {
    fn load(&mut self, request: TextureRequest) -> TextureLoad;
}

/// Reads and decodes each map on its own worker thread.
#[derive(Debug, Clone)]
pub struct ThreadedTextureLoader {
    max_dimension: u32,
}

impl ThreadedTextureLoader {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }
}

impl Default for ThreadedTextureLoader {
    fn default() -> Self {
        Self::new(AssetConfig::default().max_texture_dimension)
    }
}

impl TextureLoader for ThreadedTextureLoader {
    fn load(&mut self, request: TextureRequest) -> TextureLoad {
        let (sender, load) = TextureLoad::channel(request.timeout);
        tracing::info!(
            "loading textures: day={} night={}",
            request.day.label(),
            request.night.label()
        );

        for (slot, source) in [
            (TextureSlot::Day, request.day),
            (TextureSlot::Night, request.night),
        ] {
            let worker_sender = sender.clone();
            let max_dimension = self.max_dimension;
            let spawned = std::thread::Builder::new()
                .name(format!("texture-{slot}"))
                .spawn(move || {
                    let result = source.read().and_then(|bytes| {
                        TextureImage::decode(source.label(), &bytes, max_dimension)
                    });
                    worker_sender.send(slot, result.map(Arc::new));
                });
            if let Err(e) = spawned {
                tracing::error!("failed to spawn {slot} texture worker: {e}");
                sender.fail(slot, AssetError::Worker(e));
            }
        }

        load
    }
}
