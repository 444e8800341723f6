use super::encoding::encode_capture;
use crate::engine::camera::{OrbitCamera, StudioCamera};
use bevy::prelude::*;
use bevy::render::view::screenshot::{Screenshot, ScreenshotCaptured};
use bevy::window::PrimaryWindow;
use lora_capture::{CameraPose, CaptureDriver, CaptureProgress, DatasetError, ImageEncoding};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Work the capture task asks the main world to do. Every request carries
/// the sender its reply goes back on.
#[derive(Debug)]
pub enum DriverRequest {
    CameraPose(oneshot::Sender<CameraPose>),
    PlaceCamera(CameraPose, oneshot::Sender<()>),
    Render(oneshot::Sender<()>),
    NextFrame(oneshot::Sender<()>),
    Sleep(Duration, oneshot::Sender<()>),
    ReadFramebuffer(ImageEncoding, oneshot::Sender<Result<Vec<u8>, String>>),
    Progress(CaptureProgress),
}

/// Capture driver that forwards every operation to the Bevy main world.
///
/// ```text
/// capture task                          main world (Update)
/// ─────────────                         ───────────────────
/// place_camera ──DriverRequest──────►   service_driver_requests
///      ▲                                   │ camera / orbit / screenshot
///      └──────────oneshot reply─────────   ┘
/// ```
///
/// Requests are sent when an operation is called, so the order the main
/// world sees is the order the scheduler issued them.
#[derive(Clone)]
pub struct StudioCaptureDriver {
    requests: mpsc::UnboundedSender<DriverRequest>,
}

fn renderer_closed() -> DatasetError {
    DatasetError::Renderer("render loop stopped answering".to_string())
}

impl StudioCaptureDriver {
    pub fn new(requests: mpsc::UnboundedSender<DriverRequest>) -> Self {
        Self { requests }
    }

    fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> DriverRequest,
    ) -> Result<oneshot::Receiver<T>, DatasetError> {
        let (reply, receiver) = oneshot::channel();
        self.requests
            .send(make(reply))
            .map_err(|_| renderer_closed())?;
        Ok(receiver)
    }
}

async fn await_reply<T>(
    receiver: Result<oneshot::Receiver<T>, DatasetError>,
) -> Result<T, DatasetError> {
    receiver?.await.map_err(|_| renderer_closed())
}

impl CaptureDriver for StudioCaptureDriver {
    fn camera_pose(&mut self) -> impl Future<Output = Result<CameraPose, DatasetError>> + Send {
        await_reply(self.request(DriverRequest::CameraPose))
    }

    fn place_camera(
        &mut self,
        pose: CameraPose,
    ) -> impl Future<Output = Result<(), DatasetError>> + Send {
        await_reply(self.request(|reply| DriverRequest::PlaceCamera(pose, reply)))
    }

    fn render(&mut self) -> impl Future<Output = Result<(), DatasetError>> + Send {
        await_reply(self.request(DriverRequest::Render))
    }

    fn next_frame(&mut self) -> impl Future<Output = Result<(), DatasetError>> + Send {
        await_reply(self.request(DriverRequest::NextFrame))
    }

    fn sleep(&mut self, duration: Duration) -> impl Future<Output = ()> + Send {
        let receiver = self.request(|reply| DriverRequest::Sleep(duration, reply));
        async move {
            let _ = await_reply(receiver).await;
        }
    }

    fn read_framebuffer(
        &mut self,
        encoding: ImageEncoding,
    ) -> impl Future<Output = Result<Vec<u8>, DatasetError>> + Send {
        let receiver = self.request(|reply| DriverRequest::ReadFramebuffer(encoding, reply));
        async move { await_reply(receiver).await?.map_err(DatasetError::Renderer) }
    }

    fn report_progress(&mut self, progress: &CaptureProgress) {
        let _ = self.requests.send(DriverRequest::Progress(progress.clone()));
    }
}

/// Main-world end of the driver channel.
#[derive(Resource)]
pub struct DriverMailbox {
    receiver: mpsc::UnboundedReceiver<DriverRequest>,
}

impl DriverMailbox {
    pub fn new(receiver: mpsc::UnboundedReceiver<DriverRequest>) -> Self {
        Self { receiver }
    }
}

/// Replies that wait on frames or time.
#[derive(Resource, Default)]
pub struct PendingDriverReplies {
    next_frame: Vec<oneshot::Sender<()>>,
    timers: Vec<(Duration, oneshot::Sender<()>)>,
}

/// Latest progress reported by the running capture.
#[derive(Resource, Default, Debug, Clone)]
pub struct CaptureProgressView {
    pub progress: Option<CaptureProgress>,
}

/// Answers the capture task's requests.
///
/// Frame waits queued during one update are released at the start of the
/// next, after the frame in between has been rendered. Screenshots resolve
/// through an observer once the GPU readback lands.
pub fn service_driver_requests(
    mut commands: Commands,
    mut mailbox: ResMut<DriverMailbox>,
    mut pending: ResMut<PendingDriverReplies>,
    mut progress_view: ResMut<CaptureProgressView>,
    mut orbit: ResMut<OrbitCamera>,
    mut camera_query: Query<&mut Transform, With<StudioCamera>>,
    primary_window: Query<(), With<PrimaryWindow>>,
    time: Res<Time>,
) {
    for reply in pending.next_frame.drain(..) {
        let _ = reply.send(());
    }

    let now = time.elapsed();
    let (due, waiting): (Vec<_>, Vec<_>) = pending
        .timers
        .drain(..)
        .partition(|(deadline, _)| *deadline <= now);
    pending.timers = waiting;
    for (_, reply) in due {
        let _ = reply.send(());
    }

    while let Ok(request) = mailbox.receiver.try_recv() {
        match request {
            DriverRequest::CameraPose(reply) => {
                let position = camera_query
                    .single()
                    .map(|transform| transform.translation)
                    .unwrap_or_else(|_| orbit.eye());
                let _ = reply.send(CameraPose {
                    position,
                    target: orbit.target,
                });
            }
            DriverRequest::PlaceCamera(pose, reply) => {
                orbit.set_from_pose(pose.position, pose.target);
                if let Ok(mut transform) = camera_query.single_mut() {
                    *transform =
                        Transform::from_translation(pose.position).looking_at(pose.target, Vec3::Y);
                }
                let _ = reply.send(());
            }
            DriverRequest::Render(reply) | DriverRequest::NextFrame(reply) => {
                pending.next_frame.push(reply);
            }
            DriverRequest::Sleep(duration, reply) => {
                pending.timers.push((now + duration, reply));
            }
            DriverRequest::ReadFramebuffer(encoding, reply) => {
                if primary_window.is_empty() {
                    let _ = reply.send(Err("no window to read back".to_string()));
                    continue;
                }
                request_screenshot(&mut commands, encoding, reply);
            }
            DriverRequest::Progress(progress) => {
                progress_view.progress = Some(progress);
            }
        }
    }
}

fn request_screenshot(
    commands: &mut Commands,
    encoding: ImageEncoding,
    reply: oneshot::Sender<Result<Vec<u8>, String>>,
) {
    // The observer is an Fn, so the one-shot sender is taken out of a slot.
    let slot = Arc::new(Mutex::new(Some(reply)));

    commands.spawn(Screenshot::primary_window()).observe(
        move |trigger: Trigger<ScreenshotCaptured>| {
            let Some(reply) = slot.lock().take() else {
                return;
            };

            let encoded = trigger
                .event()
                .0
                .clone()
                .try_into_dynamic()
                .map_err(|e| e.to_string())
                .and_then(|image| encode_capture(&image, encoding).map_err(|e| e.to_string()));

            let _ = reply.send(encoded);
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::tasks::block_on;
    use constants::scene::CAMERA_START_POSITION;

    fn app() -> (App, StudioCaptureDriver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut app = App::new();
        app.insert_resource(DriverMailbox::new(receiver))
            .init_resource::<PendingDriverReplies>()
            .init_resource::<CaptureProgressView>()
            .init_resource::<OrbitCamera>()
            .init_resource::<Time>()
            .add_systems(Update, service_driver_requests);

        let transform = app.world().resource::<OrbitCamera>().transform();
        app.world_mut().spawn((StudioCamera, transform));
        (app, StudioCaptureDriver::new(sender))
    }

    fn camera_translation(app: &mut App) -> Vec3 {
        let world = app.world_mut();
        let mut query = world.query_filtered::<&Transform, With<StudioCamera>>();
        query.single(world).unwrap().translation
    }

    #[test]
    fn camera_pose_reports_live_camera() {
        let (mut app, mut driver) = app();
        let pose = driver.camera_pose();
        app.update();

        let pose = block_on(pose).unwrap();
        assert!(pose.position.abs_diff_eq(Vec3::from_array(CAMERA_START_POSITION), 1e-4));
        assert_eq!(pose.target, Vec3::ZERO);
    }

    #[test]
    fn place_camera_moves_camera_and_orbit_target() {
        let (mut app, mut driver) = app();
        let pose = CameraPose {
            position: Vec3::new(0.0, 1.0, 4.0),
            target: Vec3::new(0.0, 1.0, 0.0),
        };
        let placed = driver.place_camera(pose);
        app.update();

        block_on(placed).unwrap();
        assert!(camera_translation(&mut app).abs_diff_eq(pose.position, 1e-5));
        let orbit = app.world().resource::<OrbitCamera>();
        assert_eq!(orbit.target, pose.target);
        assert!(orbit.eye().abs_diff_eq(pose.position, 1e-4));
    }

    #[test]
    fn frame_waits_release_on_the_following_update() {
        let (mut app, mut driver) = app();
        let mut frame = Box::pin(driver.next_frame());
        app.update();
        assert!(block_on(bevy::tasks::futures_lite::future::poll_once(&mut frame)).is_none());

        app.update();
        assert!(block_on(frame).is_ok());
    }

    #[test]
    fn progress_is_mirrored() {
        let (mut app, mut driver) = app();
        driver.report_progress(&CaptureProgress {
            completed: 2,
            total: 18,
            status: "Capturing 3/18... (close)".to_string(),
        });
        app.update();

        let view = app.world().resource::<CaptureProgressView>();
        assert_eq!(view.progress.as_ref().map(|p| p.completed), Some(2));
    }

    #[test]
    fn readback_without_window_fails() {
        let (mut app, mut driver) = app();
        let read = driver.read_framebuffer(ImageEncoding::Png);
        app.update();

        assert!(matches!(block_on(read), Err(DatasetError::Renderer(_))));
    }

    #[test]
    fn dropped_render_loop_surfaces_renderer_error() {
        let (app, mut driver) = app();
        drop(app);
        assert!(matches!(
            block_on(driver.render()),
            Err(DatasetError::Renderer(_))
        ));
    }
}
