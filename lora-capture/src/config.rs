use crate::pose_grid::PoseGridParams;
use constants::capture::{DEFAULT_JPEG_QUALITY, DEFAULT_SETTLE_DELAY_MS, MIN_SETTLE_DELAY_MS};
use constants::pose_grid::DEFAULT_TRIGGER_TOKEN;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How frames are encoded when read back from the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ImageEncoding {
    Png,
    Jpeg { quality: u8 },
}

impl Default for ImageEncoding {
    fn default() -> Self {
        Self::Png
    }
}

impl ImageEncoding {
    pub fn jpeg() -> Self {
        Self::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// Everything a capture sweep needs besides the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub grid: PoseGridParams,
    pub trigger_token: String,
    pub settle_delay_ms: u64,
    pub encoding: ImageEncoding,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            grid: PoseGridParams::default(),
            trigger_token: DEFAULT_TRIGGER_TOKEN.to_string(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            encoding: ImageEncoding::default(),
        }
    }
}

impl CaptureConfig {
    /// Settle wait after placing the camera, never shorter than the floor.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms.max(MIN_SETTLE_DELAY_MS))
    }
}
