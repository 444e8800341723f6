mod common;

use bevy::math::Vec3;
use common::{Call, FULL_FRAME_BYTES, ScriptedDriver, config};
use lora_capture::{CameraPose, CaptureScheduler, DatasetError, DistanceClass};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn sweep_captures_every_pose_in_grid_order() {
    let scheduler = CaptureScheduler::new();
    let mut driver = ScriptedDriver::new();

    let summary = scheduler
        .start_capture(&config("-30,0,30", "0,90", true), &mut driver)
        .await
        .unwrap();

    assert_eq!(summary.completed, 18);
    assert_eq!(summary.total, 18);
    assert!(!summary.cancelled);

    let session = scheduler.session();
    assert!(!session.is_active());
    assert_eq!(session.status(), "Done! 18 captures");

    let first = &session.captures()[0];
    assert_eq!(first.pose.distance, DistanceClass::Close);
    assert!((first.pose.radius - 2.4).abs() < 1e-5);
    assert_eq!(first.caption, "<sks> front view low-angle shot close-up");
    assert!(first.id.as_str().starts_with("0001-"));

    let last = &session.captures()[17];
    assert_eq!(last.pose.distance, DistanceClass::Wide);
    assert_eq!(last.caption, "<sks> right side view elevated shot wide shot");
    assert!(last.id.as_str().starts_with("0018-"));

    let reference = session.reference_image().unwrap();
    assert!(
        session
            .captures()
            .iter()
            .all(|capture| Arc::ptr_eq(&capture.start_image, reference))
    );
}

#[tokio::test]
async fn each_frame_settles_then_renders_three_times() {
    let scheduler = CaptureScheduler::new();
    let mut driver = ScriptedDriver::new();

    scheduler
        .start_capture(&config("0", "0", false), &mut driver)
        .await
        .unwrap();

    let front = CameraPose::looking_at_origin(Vec3::new(0.0, 0.0, 4.0));
    let settle = Call::Sleep(Duration::from_millis(300));
    let frame = [
        settle,
        Call::Render,
        Call::NextFrame,
        Call::Render,
        Call::NextFrame,
        Call::Render,
        Call::Read,
    ];

    let mut expected = vec![Call::Render, Call::Read, Call::CameraPose, Call::Place(front)];
    expected.extend(frame.iter().cloned());
    expected.push(Call::Place(front));
    expected.extend(frame.iter().cloned());
    expected.push(Call::Place(ScriptedDriver::original_camera()));

    assert_eq!(driver.calls, expected);
}

#[tokio::test]
async fn camera_is_restored_after_the_sweep() {
    let scheduler = CaptureScheduler::new();
    let mut driver = ScriptedDriver::new();

    scheduler
        .start_capture(&config("-30, 60", "0, 180", true), &mut driver)
        .await
        .unwrap();

    assert_eq!(driver.camera, ScriptedDriver::original_camera());

    // Every sweep placement looks at the origin from its orbit radius.
    let placements = driver.placements();
    for pose in &placements[..placements.len() - 1] {
        assert_eq!(pose.target, Vec3::ZERO);
    }
    let radii: Vec<f32> = placements[1..placements.len() - 1]
        .iter()
        .map(|pose| pose.position.length())
        .collect();
    assert!(radii[..4].iter().all(|r| (r - 2.4).abs() < 1e-4));
    assert!(radii[4..8].iter().all(|r| (r - 4.0).abs() < 1e-4));
    assert!(radii[8..].iter().all(|r| (r - 7.2).abs() < 1e-4));
}

#[tokio::test]
async fn cancellation_stops_before_next_pose() {
    let scheduler = CaptureScheduler::new();
    let mut driver = ScriptedDriver::new();
    driver.cancel_after = Some((2, scheduler.clone()));

    let summary = scheduler
        .start_capture(&config("-30,0,30", "0,90", true), &mut driver)
        .await
        .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.total, 18);
    assert_eq!(driver.camera, ScriptedDriver::original_camera());

    let session = scheduler.session();
    assert_eq!(session.len(), 2);
    assert_eq!(session.completed_count(), 2);
    assert!(!session.is_active());
    assert_eq!(session.status(), "Cancelled after 2 captures");
}

#[tokio::test]
async fn stale_cancel_does_not_stop_a_new_sweep() {
    let scheduler = CaptureScheduler::new();
    scheduler.cancel();

    let mut driver = ScriptedDriver::new();
    let summary = scheduler
        .start_capture(&config("0", "0, 90", false), &mut driver)
        .await
        .unwrap();

    assert!(!summary.cancelled);
    assert_eq!(summary.completed, 2);
}

#[tokio::test]
async fn small_frame_is_retried_exactly_once() {
    let scheduler = CaptureScheduler::new();
    let mut driver = ScriptedDriver::new();
    // probe, reference, end frame, retry
    driver.frame_sizes = [FULL_FRAME_BYTES, FULL_FRAME_BYTES, 10, 12].into();

    scheduler
        .start_capture(&config("0", "0", false), &mut driver)
        .await
        .unwrap();

    assert_eq!(driver.reads, 4);
    assert_eq!(driver.count(&Call::Sleep(Duration::from_millis(500))), 1);

    let session = scheduler.session();
    assert_eq!(session.len(), 1);
    assert_eq!(session.captures()[0].end_image.len(), 12);
}

#[tokio::test]
async fn small_test_render_only_warns() {
    let scheduler = CaptureScheduler::new();
    let mut driver = ScriptedDriver::new();
    driver.frame_sizes = [4].into();

    let summary = scheduler
        .start_capture(&config("0", "0", false), &mut driver)
        .await
        .unwrap();

    assert_eq!(summary.completed, 1);
    assert_eq!(driver.count(&Call::Sleep(Duration::from_millis(500))), 0);
}

#[tokio::test]
async fn invalid_grid_leaves_session_idle() {
    let scheduler = CaptureScheduler::new();
    let mut driver = ScriptedDriver::new();

    let result = scheduler
        .start_capture(&config("0, 30", " , ", true), &mut driver)
        .await;

    assert!(matches!(result, Err(DatasetError::InvalidParameters(_))));
    assert!(!scheduler.is_capturing());
    assert!(driver.calls.is_empty());
}

#[tokio::test]
async fn second_start_is_rejected_while_capturing() {
    let scheduler = CaptureScheduler::new();
    let observer = scheduler.clone();
    let mut first = ScriptedDriver::new();
    let mut second = ScriptedDriver::new();
    let grid = config("0", "0, 90", false);

    let (running, rejected) = tokio::join!(
        scheduler.start_capture(&grid, &mut first),
        observer.start_capture(&grid, &mut second)
    );

    assert_eq!(running.unwrap().completed, 2);
    assert!(matches!(rejected, Err(DatasetError::AlreadyCapturing)));
    assert!(second.calls.is_empty());
    assert_eq!(scheduler.session().len(), 2);
}

#[tokio::test]
async fn lost_renderer_aborts_and_restores_camera() {
    let scheduler = CaptureScheduler::new();
    let mut driver = ScriptedDriver::new();
    // probe, reference, pose 1, pose 2 fails
    driver.fail_read_at = Some(4);

    let result = scheduler
        .start_capture(&config("0", "0, 90, 180", false), &mut driver)
        .await;

    assert!(matches!(result, Err(DatasetError::Renderer(_))));
    assert_eq!(driver.camera, ScriptedDriver::original_camera());

    let session = scheduler.session();
    assert!(!session.is_active());
    assert_eq!(session.len(), 1);
    assert_eq!(session.status(), "Capture failed after 1 captures");
}

#[tokio::test]
async fn progress_is_reported_per_capture() {
    let scheduler = CaptureScheduler::new();
    let mut driver = ScriptedDriver::new();

    scheduler
        .start_capture(&config("0", "0, 90, 180", true), &mut driver)
        .await
        .unwrap();

    assert_eq!(driver.progress.len(), 9);
    assert_eq!(driver.progress[0].status, "Capturing 1/9... (close)");
    assert_eq!(driver.progress[4].status, "Capturing 5/9... (medium)");
    assert_eq!(driver.progress[8].completed, 9);
}
