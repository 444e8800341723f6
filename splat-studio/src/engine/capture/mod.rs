//! LoRA dataset capture inside the studio.
//!
//! The capture sweep runs as a task on the async compute pool and drives the
//! camera through [`StudioCaptureDriver`]. The main world answers its
//! requests once per frame, so the sweep advances at the display rate.
//!
//! ```text
//! StartCaptureRequest ─► CaptureTask (CaptureScheduler::start_capture)
//!                              │ DriverRequest
//!                              ▼
//!                  service_driver_requests (Update) ─► camera, screenshot
//!
//! ExportDatasetRequest ─► ExportTask (DatasetPackager::export) ─► sink
//! ```

/// Export destinations for native and web builds.
pub mod delivery;

/// Driver bridge between the capture task and the main world.
pub mod driver;

/// PNG and JPEG encoding of framebuffer readbacks.
pub mod encoding;

use crate::engine::camera::OrbitCamera;
use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, IoTaskPool, Task, block_on, futures_lite::future};
use constants::capture::DEFAULT_EXPORT_DIR;
use constants::pose_grid::DEFAULT_EXPORT_CAPTIONS;
use lora_capture::{
    CaptureConfig, CaptureScheduler, CaptureSummary, DatasetError, DatasetPackager, ExportOptions,
    ExportPath, ExportReport, ZipArchiveFactory,
};
use std::sync::Arc;
use tokio::sync::mpsc;

pub use driver::{
    CaptureProgressView, DriverMailbox, DriverRequest, PendingDriverReplies, StudioCaptureDriver,
    service_driver_requests,
};

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct StartCaptureRequest;

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct CancelCaptureRequest;

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ExportDatasetRequest;

/// Operator-facing capture and export parameters.
#[derive(Resource, Debug, Clone)]
pub struct CaptureSettings {
    pub capture: CaptureConfig,
    pub export_captions: bool,
    pub export_dir: String,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            export_captions: DEFAULT_EXPORT_CAPTIONS,
            export_dir: DEFAULT_EXPORT_DIR.to_string(),
        }
    }
}

/// The scheduler owning the session, plus the sending end of the driver channel.
#[derive(Resource, Clone)]
pub struct StudioCapture {
    pub scheduler: CaptureScheduler,
    requests: mpsc::UnboundedSender<DriverRequest>,
}

impl StudioCapture {
    pub fn driver(&self) -> StudioCaptureDriver {
        StudioCaptureDriver::new(self.requests.clone())
    }
}

#[derive(Resource, Default)]
pub struct CaptureTask(Option<Task<Result<CaptureSummary, DatasetError>>>);

impl CaptureTask {
    pub fn is_running(&self) -> bool {
        self.0.is_some()
    }
}

#[derive(Resource, Default)]
pub struct ExportTask(Option<Task<Result<ExportReport, DatasetError>>>);

impl ExportTask {
    pub fn is_running(&self) -> bool {
        self.0.is_some()
    }
}

pub struct CapturePlugin;

impl Plugin for CapturePlugin {
    fn build(&self, app: &mut App) {
        let (sender, receiver) = mpsc::unbounded_channel();

        app.insert_resource(StudioCapture {
            scheduler: CaptureScheduler::new(),
            requests: sender,
        })
        .insert_resource(DriverMailbox::new(receiver))
        .init_resource::<CaptureSettings>()
        .init_resource::<PendingDriverReplies>()
        .init_resource::<CaptureProgressView>()
        .init_resource::<CaptureTask>()
        .init_resource::<ExportTask>()
        .add_event::<StartCaptureRequest>()
        .add_event::<CancelCaptureRequest>()
        .add_event::<ExportDatasetRequest>()
        .add_systems(
            Update,
            (
                start_capture_requests,
                cancel_capture_requests,
                service_driver_requests,
                poll_capture_task,
                export_dataset_requests,
                poll_export_task,
            )
                .chain(),
        );
    }
}

pub fn start_capture_requests(
    mut requests: EventReader<StartCaptureRequest>,
    capture: Res<StudioCapture>,
    settings: Res<CaptureSettings>,
    mut task: ResMut<CaptureTask>,
    mut orbit: ResMut<OrbitCamera>,
) {
    if requests.read().count() == 0 {
        return;
    }

    if task.is_running() || capture.scheduler.is_capturing() {
        warn!("Capture already in progress");
        return;
    }

    let scheduler = capture.scheduler.clone();
    let config = settings.capture.clone();
    let mut driver = capture.driver();

    task.0 = Some(
        AsyncComputeTaskPool::get()
            .spawn(async move { scheduler.start_capture(&config, &mut driver).await }),
    );
    orbit.capture_lock = true;
    info!("Capture started (trigger '{}')", settings.capture.trigger_token);
}

pub fn cancel_capture_requests(
    mut requests: EventReader<CancelCaptureRequest>,
    capture: Res<StudioCapture>,
) {
    if requests.read().count() == 0 {
        return;
    }

    if capture.scheduler.is_capturing() {
        capture.scheduler.cancel();
        info!("Cancelling capture after the current pose");
    }
}

pub fn poll_capture_task(
    capture: Res<StudioCapture>,
    mut task: ResMut<CaptureTask>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let Some(running) = task.0.as_mut() else {
        return;
    };
    let Some(result) = block_on(future::poll_once(running)) else {
        return;
    };

    task.0 = None;
    orbit.capture_lock = false;

    match result {
        Ok(summary) if summary.cancelled => {
            info!(
                "Capture cancelled: {}/{} poses captured",
                summary.completed, summary.total
            );
        }
        Ok(summary) => info!("✓ Capture complete: {} captures", summary.completed),
        Err(DatasetError::InvalidParameters(reason)) => {
            warn!("Capture rejected: {}", reason);
            capture
                .scheduler
                .set_status(format!("Invalid capture grid: {}", reason));
        }
        // Renderer failures already left "Capture failed after N captures".
        Err(e) => error!("Capture failed: {}", e),
    }
}

pub fn export_dataset_requests(
    mut requests: EventReader<ExportDatasetRequest>,
    capture: Res<StudioCapture>,
    settings: Res<CaptureSettings>,
    capture_task: Res<CaptureTask>,
    mut export_task: ResMut<ExportTask>,
) {
    if requests.read().count() == 0 {
        return;
    }

    if capture_task.is_running() || export_task.is_running() {
        warn!("Export ignored while a capture or export is running");
        return;
    }

    // Export from a snapshot so the session lock is free for status updates.
    let session = capture.scheduler.session().clone();
    if session.is_empty() {
        warn!("{}", DatasetError::EmptyDataset);
        capture.scheduler.set_status("No captures to export");
        return;
    }

    let status = capture.scheduler.clone();
    let packager = DatasetPackager::new(ExportOptions {
        export_captions: settings.export_captions,
        ..default()
    })
    .with_archive(Arc::new(ZipArchiveFactory))
    .on_status(move |line| status.set_status(line));
    let mut sink = delivery::export_sink(&settings.export_dir);
    let count = session.len();

    export_task.0 = Some(
        IoTaskPool::get().spawn(async move { packager.export(&session, sink.as_mut()) }),
    );
    info!("Exporting {} captures", count);
}

pub fn poll_export_task(mut task: ResMut<ExportTask>) {
    let Some(running) = task.0.as_mut() else {
        return;
    };
    let Some(result) = block_on(future::poll_once(running)) else {
        return;
    };
    task.0 = None;

    match result {
        Ok(report) => match report.path {
            ExportPath::Archive { file_name } => {
                info!("✓ Exported {} captures to {}", report.captures, file_name)
            }
            ExportPath::Individual { files } => info!(
                "✓ Exported {} captures as {} individual files",
                report.captures,
                files.len()
            ),
        },
        Err(e) => error!("Export failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::camera::StudioCamera;
    use bevy::tasks::TaskPool;

    fn app() -> App {
        AsyncComputeTaskPool::get_or_init(TaskPool::new);
        IoTaskPool::get_or_init(TaskPool::new);

        let mut app = App::new();
        app.init_resource::<Time>()
            .init_resource::<OrbitCamera>()
            .add_plugins(CapturePlugin);
        let transform = app.world().resource::<OrbitCamera>().transform();
        app.world_mut().spawn((StudioCamera, transform));
        app
    }

    fn run_until_idle(app: &mut App) {
        for _ in 0..2000 {
            app.update();
            if !app.world().resource::<CaptureTask>().is_running() {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        panic!("capture task never finished");
    }

    #[test]
    fn capture_without_window_fails_and_releases_camera() {
        let mut app = app();
        app.world_mut().send_event(StartCaptureRequest);
        app.update();
        assert!(app.world().resource::<OrbitCamera>().capture_lock);

        run_until_idle(&mut app);

        let capture = app.world().resource::<StudioCapture>();
        assert!(!capture.scheduler.is_capturing());
        assert_eq!(
            capture.scheduler.session().status(),
            "Capture failed after 0 captures"
        );
        assert!(!app.world().resource::<OrbitCamera>().capture_lock);
    }

    #[test]
    fn invalid_grid_never_locks_the_camera_for_long() {
        let mut app = app();
        app.world_mut()
            .resource_mut::<CaptureSettings>()
            .capture
            .grid
            .elevations = "up, down".to_string();
        app.world_mut().send_event(StartCaptureRequest);

        run_until_idle(&mut app);

        let capture = app.world().resource::<StudioCapture>();
        assert!(capture.scheduler.session().is_empty());
        assert!(!app.world().resource::<OrbitCamera>().capture_lock);
    }

    #[test]
    fn empty_azimuth_list_is_reported_in_the_status() {
        let mut app = app();
        app.world_mut()
            .resource_mut::<CaptureSettings>()
            .capture
            .grid
            .azimuths = String::new();
        app.world_mut().send_event(StartCaptureRequest);

        run_until_idle(&mut app);

        let capture = app.world().resource::<StudioCapture>();
        let status = capture.scheduler.session().status().to_string();
        assert!(status.starts_with("Invalid capture grid: "), "{}", status);
        assert!(!capture.scheduler.is_capturing());
    }

    #[test]
    fn empty_export_spawns_nothing() {
        let mut app = app();
        app.world_mut().send_event(ExportDatasetRequest);
        app.update();

        assert!(!app.world().resource::<ExportTask>().is_running());
        let capture = app.world().resource::<StudioCapture>();
        assert_eq!(capture.scheduler.session().status(), "No captures to export");
    }
}
