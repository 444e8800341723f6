use crate::config::CaptureConfig;
use crate::pose_grid::Pose;
use constants::capture::{CAPTURE_ID_COUNTER_WIDTH, CAPTURE_ID_SUFFIX_LEN};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `NNNN-xxxxxx`: zero-padded running counter plus a random base-36 suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptureId(String);

impl CaptureId {
    /// Builds an id for the `counter`-th capture (1-based) with a fresh random suffix.
    pub fn generate(counter: usize) -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..CAPTURE_ID_SUFFIX_LEN)
            .map(|_| BASE36_ALPHABET[rng.gen_range(0..BASE36_ALPHABET.len())] as char)
            .collect();
        Self::with_suffix(counter, &suffix)
    }

    pub fn with_suffix(counter: usize, suffix: &str) -> Self {
        Self(format!(
            "{:0width$}-{}",
            counter,
            suffix,
            width = CAPTURE_ID_COUNTER_WIDTH
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn start_image_name(&self, extension: &str) -> String {
        format!("{}_start.{}", self.0, extension)
    }

    pub fn end_image_name(&self, extension: &str) -> String {
        format!("{}_end.{}", self.0, extension)
    }

    pub fn caption_file_name(&self) -> String {
        format!("{}.txt", self.0)
    }
}

impl fmt::Display for CaptureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A start/end image pair with its caption.
///
/// Every capture of a session shares the same reference start frame.
#[derive(Debug, Clone)]
pub struct Capture {
    pub id: CaptureId,
    pub start_image: Arc<[u8]>,
    pub end_image: Arc<[u8]>,
    pub caption: String,
    pub pose: Pose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSummary {
    pub completed: usize,
    pub total: usize,
    pub cancelled: bool,
}

/// Observable state of the current (or last) capture sweep.
#[derive(Debug, Clone, Default)]
pub struct CaptureSession {
    is_active: bool,
    captures: Vec<Capture>,
    index: HashMap<CaptureId, usize>,
    total_poses: usize,
    completed_count: usize,
    status: String,
    reference_image: Option<Arc<[u8]>>,
    config: Option<CaptureConfig>,
}

impl CaptureSession {
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Captures in insertion order.
    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    pub fn get(&self, id: &CaptureId) -> Option<&Capture> {
        self.index.get(id).map(|&i| &self.captures[i])
    }

    pub fn len(&self) -> usize {
        self.captures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    pub fn total_poses(&self) -> usize {
        self.total_poses
    }

    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn reference_image(&self) -> Option<&Arc<[u8]>> {
        self.reference_image.as_ref()
    }

    /// Configuration of the sweep that produced the captures.
    pub fn config(&self) -> Option<&CaptureConfig> {
        self.config.as_ref()
    }

    /// Drops all captures. Ignored while a sweep is running.
    pub fn reset(&mut self) {
        if self.is_active {
            return;
        }
        *self = Self::default();
    }

    pub(crate) fn begin(&mut self, config: CaptureConfig, total_poses: usize) {
        *self = Self {
            is_active: true,
            total_poses,
            config: Some(config),
            ..Self::default()
        };
    }

    pub(crate) fn set_reference(&mut self, image: Arc<[u8]>) {
        self.reference_image = Some(image);
    }

    pub(crate) fn record(&mut self, capture: Capture) {
        self.index.insert(capture.id.clone(), self.captures.len());
        self.captures.push(capture);
        self.completed_count = self.captures.len();
    }

    pub(crate) fn finish(&mut self) {
        self.is_active = false;
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}
