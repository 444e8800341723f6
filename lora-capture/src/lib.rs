//! Renderer-independent core of the LoRA capture workflow.
//!
//! Expands pose grid parameters into an ordered camera sweep, drives any
//! renderer that implements [`CaptureDriver`] through that sweep, and packages
//! the resulting start/end image pairs with captions and a manifest.
//!
//! ## Data Flow
//!
//! ```text
//! PoseGridParams
//!   └─> generate_poses()            ordered Vec<Pose> (distance > elevation > azimuth)
//!       └─> CaptureScheduler        reference frame + one Capture per pose
//!           └─> CaptureSession      insertion-ordered captures, progress counters
//!               └─> DatasetPackager archive (zip) or per-file fallback + manifest
//! ```
//!
//! The scheduler never touches a renderer directly. Camera placement, frame
//! submission, display-refresh waits, timers and framebuffer readback all go
//! through the [`CaptureDriver`] trait, so the whole pipeline runs against a
//! scripted driver in tests.

/// Capture records, ids and the capture session.
pub mod capture;

/// Capture configuration and image encoding.
pub mod config;

/// Caption clauses derived from a pose.
pub mod descriptor;

/// Error taxonomy shared by the scheduler and packager.
pub mod error;

/// Dataset manifest written next to the image pairs.
pub mod manifest;

/// Archive and per-file dataset export.
pub mod packager;

/// Pose grid expansion and camera placement maths.
pub mod pose_grid;

/// Asynchronous capture sweep over a [`CaptureDriver`].
pub mod scheduler;

pub use capture::{Capture, CaptureId, CaptureSession, CaptureSummary};
pub use config::{CaptureConfig, ImageEncoding};
pub use error::DatasetError;
pub use manifest::{DatasetManifest, ManifestCapture};
pub use packager::{
    ArchiveBuilder, ArchiveFactory, DatasetPackager, DeliverySink, DirectorySink, ExportOptions,
    ExportPath, ExportReport, MemorySink, ZipArchiveFactory,
};
pub use pose_grid::{DistanceClass, Pose, PoseGridParams};
pub use scheduler::{
    CameraPose, CancelFlag, CaptureDriver, CaptureProgress, CaptureScheduler, FrameRetryPolicy,
};
