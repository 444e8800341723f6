use crate::capture::{Capture, CaptureId, CaptureSession, CaptureSummary};
use crate::config::{CaptureConfig, ImageEncoding};
use crate::error::DatasetError;
use crate::pose_grid::{Pose, generate_poses};
use bevy::math::Vec3;
use constants::capture::{
    EMPTY_FRAME_RETRY_DELAY_MS, FORCED_RENDER_COUNT, MAX_EMPTY_FRAME_RETRIES,
    MIN_PLAUSIBLE_IMAGE_BYTES,
};
use parking_lot::{Mutex, MutexGuard};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Camera eye position and orbit target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub fn looking_at_origin(position: Vec3) -> Self {
        Self {
            position,
            target: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureProgress {
    pub completed: usize,
    pub total: usize,
    pub status: String,
}

/// Renderer seam of the capture sweep.
///
/// Every operation is asynchronous so a driver can forward it to a render
/// loop on another thread and resume once the frame has been produced.
pub trait CaptureDriver {
    fn camera_pose(&mut self) -> impl Future<Output = Result<CameraPose, DatasetError>> + Send;

    /// Moves the camera, forces the orbit target and updates the controls.
    fn place_camera(
        &mut self,
        pose: CameraPose,
    ) -> impl Future<Output = Result<(), DatasetError>> + Send;

    /// Submits one frame.
    fn render(&mut self) -> impl Future<Output = Result<(), DatasetError>> + Send;

    /// Resolves at the next display refresh.
    fn next_frame(&mut self) -> impl Future<Output = Result<(), DatasetError>> + Send;

    fn sleep(&mut self, duration: Duration) -> impl Future<Output = ()> + Send;

    /// Reads the current framebuffer back as an encoded image.
    fn read_framebuffer(
        &mut self,
        encoding: ImageEncoding,
    ) -> impl Future<Output = Result<Vec<u8>, DatasetError>> + Send;

    fn report_progress(&mut self, _progress: &CaptureProgress) {}
}

/// Handling of readbacks that come back implausibly small, usually because
/// the frame was read before the renderer produced any content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRetryPolicy {
    pub min_plausible_bytes: usize,
    pub retry_delay: Duration,
    pub max_retries: usize,
}

impl Default for FrameRetryPolicy {
    fn default() -> Self {
        Self {
            min_plausible_bytes: MIN_PLAUSIBLE_IMAGE_BYTES,
            retry_delay: Duration::from_millis(EMPTY_FRAME_RETRY_DELAY_MS),
            max_retries: MAX_EMPTY_FRAME_RETRIES,
        }
    }
}

impl FrameRetryPolicy {
    pub fn is_plausible(&self, image: &[u8]) -> bool {
        image.len() >= self.min_plausible_bytes
    }
}

#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives a [`CaptureDriver`] through the pose grid and records the captures.
///
/// Clones share the same session and cancel flag, so one clone can run the
/// sweep on a task while another observes progress or cancels it.
#[derive(Debug, Clone, Default)]
pub struct CaptureScheduler {
    session: Arc<Mutex<CaptureSession>>,
    cancel: CancelFlag,
    retry: FrameRetryPolicy,
}

impl CaptureScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry_policy(mut self, retry: FrameRetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn session(&self) -> MutexGuard<'_, CaptureSession> {
        self.session.lock()
    }

    pub fn is_capturing(&self) -> bool {
        self.session.lock().is_active()
    }

    /// Requests cancellation. The sweep stops before its next pose.
    pub fn cancel(&self) {
        if self.is_capturing() {
            info!("Capture cancellation requested");
        }
        self.cancel.cancel();
    }

    /// Clears the recorded captures, unless a sweep is running.
    pub fn reset(&self) {
        self.session.lock().reset();
    }

    /// Runs a full capture sweep.
    ///
    /// Captures a shared reference frame first, then one end frame per pose
    /// of the grid. The camera is restored to where it was before the sweep,
    /// whether the sweep finished, was cancelled, or lost its renderer.
    pub async fn start_capture<D: CaptureDriver + Send>(
        &self,
        config: &CaptureConfig,
        driver: &mut D,
    ) -> Result<CaptureSummary, DatasetError> {
        if self.is_capturing() {
            warn!("Capture already in progress, ignoring start request");
            return Err(DatasetError::AlreadyCapturing);
        }

        let poses = generate_poses(&config.grid)?;
        let total = poses.len();

        {
            let mut session = self.session.lock();
            if session.is_active() {
                return Err(DatasetError::AlreadyCapturing);
            }
            session.begin(config.clone(), total);
            session.set_status("Testing render...");
        }
        self.cancel.reset();

        info!(
            "Starting capture: {} poses ({} elevations x {} azimuths x {} distances)",
            total,
            config.grid.parsed_elevations().len(),
            config.grid.parsed_azimuths().len(),
            config.grid.distance_classes().len()
        );

        let original = match self.probe(config, driver).await {
            Ok(original) => original,
            Err(e) => {
                self.conclude(&Err(e.to_string()));
                return Err(e);
            }
        };

        let outcome = self.sweep(config, &poses, driver).await;
        let restored = driver.place_camera(original).await;

        let completed = self.conclude(&outcome.as_ref().map(|c| *c).map_err(|e| e.to_string()));
        let cancelled = outcome?;
        restored?;

        info!("Capture complete: {} of {} poses", completed, total);

        Ok(CaptureSummary {
            completed,
            total,
            cancelled,
        })
    }

    /// Test render before the sweep. Returns the camera pose to restore afterwards.
    async fn probe<D: CaptureDriver + Send>(
        &self,
        config: &CaptureConfig,
        driver: &mut D,
    ) -> Result<CameraPose, DatasetError> {
        driver.render().await?;
        let probe = driver.read_framebuffer(config.encoding).await?;
        if !self.retry.is_plausible(&probe) {
            warn!(
                "Test render produced a very small image ({} bytes). Make sure the scene has content",
                probe.len()
            );
        }

        driver.camera_pose().await
    }

    /// Returns whether the sweep was cancelled.
    async fn sweep<D: CaptureDriver + Send>(
        &self,
        config: &CaptureConfig,
        poses: &[Pose],
        driver: &mut D,
    ) -> Result<bool, DatasetError> {
        self.set_status("Capturing reference image...");

        let reference_pose = Pose::reference(config.grid.camera_radius);
        driver
            .place_camera(CameraPose::looking_at_origin(reference_pose.position()))
            .await?;
        let reference: Arc<[u8]> = Arc::from(self.capture_frame(config, driver).await?);
        self.session.lock().set_reference(reference.clone());
        info!("Reference image captured ({} bytes)", reference.len());

        let total = poses.len();
        for (i, pose) in poses.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Ok(true);
            }

            let counter = i + 1;
            let status = format!("Capturing {}/{}... ({})", counter, total, pose.distance);
            self.set_status(status.clone());

            driver
                .place_camera(CameraPose::looking_at_origin(pose.position()))
                .await?;
            let end_image = self.capture_frame(config, driver).await?;

            let capture = Capture {
                id: CaptureId::generate(counter),
                start_image: reference.clone(),
                end_image: Arc::from(end_image),
                caption: pose.caption(&config.trigger_token),
                pose: *pose,
            };

            if pose.elevation_deg < 0.0 {
                debug!(
                    "Captured pair {} ({}) [adjusted: {:.1}°]",
                    capture.id, capture.caption, pose.adjusted_elevation_deg
                );
            } else {
                debug!("Captured pair {} ({})", capture.id, capture.caption);
            }

            let progress = {
                let mut session = self.session.lock();
                session.record(capture);
                CaptureProgress {
                    completed: session.completed_count(),
                    total,
                    status,
                }
            };
            driver.report_progress(&progress);
        }

        Ok(false)
    }

    /// Settle, force renders separated by display refreshes, then read back,
    /// retrying implausibly small frames per the retry policy.
    async fn capture_frame<D: CaptureDriver + Send>(
        &self,
        config: &CaptureConfig,
        driver: &mut D,
    ) -> Result<Vec<u8>, DatasetError> {
        driver.sleep(config.settle_delay()).await;

        for render in 0..FORCED_RENDER_COUNT {
            if render > 0 {
                driver.next_frame().await?;
            }
            driver.render().await?;
        }

        let mut image = driver.read_framebuffer(config.encoding).await?;
        let mut retries = 0;
        while !self.retry.is_plausible(&image) && retries < self.retry.max_retries {
            warn!("Frame seems too small ({} bytes), retrying", image.len());
            driver.sleep(self.retry.retry_delay).await;
            driver.render().await?;
            image = driver.read_framebuffer(config.encoding).await?;
            retries += 1;
        }

        Ok(image)
    }

    /// Marks the session inactive and writes the final status. Returns the completed count.
    fn conclude(&self, outcome: &Result<bool, String>) -> usize {
        let mut session = self.session.lock();
        session.finish();
        let completed = session.completed_count();

        let status = match outcome {
            Ok(false) => format!("Done! {} captures", completed),
            Ok(true) => format!("Cancelled after {} captures", completed),
            Err(reason) => {
                warn!("Capture aborted after {} captures: {}", completed, reason);
                format!("Capture failed after {} captures", completed)
            }
        };
        session.set_status(status);
        completed
    }

    /// Overwrites the session status line, e.g. with export progress.
    pub fn set_status(&self, status: impl Into<String>) {
        self.session.lock().set_status(status);
    }
}
