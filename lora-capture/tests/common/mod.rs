#![allow(dead_code)]

use bevy::math::Vec3;
use lora_capture::{
    CameraPose, CaptureConfig, CaptureDriver, CaptureProgress, CaptureScheduler, DatasetError,
    ImageEncoding, PoseGridParams,
};
use std::collections::VecDeque;
use std::future::{Future, ready};
use std::time::Duration;

pub const FULL_FRAME_BYTES: usize = 2048;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CameraPose,
    Place(CameraPose),
    Render,
    NextFrame,
    Sleep(Duration),
    Read,
}

/// In-memory renderer: records every call and answers reads with
/// `FULL_FRAME_BYTES` sized frames unless a size is queued.
pub struct ScriptedDriver {
    pub camera: CameraPose,
    pub calls: Vec<Call>,
    pub frame_sizes: VecDeque<usize>,
    pub reads: usize,
    pub fail_read_at: Option<usize>,
    pub cancel_after: Option<(usize, CaptureScheduler)>,
    pub progress: Vec<CaptureProgress>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self {
            camera: CameraPose {
                position: Vec3::new(20.0, 20.0, 20.0),
                target: Vec3::new(1.0, 0.5, -2.0),
            },
            calls: Vec::new(),
            frame_sizes: VecDeque::new(),
            reads: 0,
            fail_read_at: None,
            cancel_after: None,
            progress: Vec::new(),
        }
    }

    pub fn original_camera() -> CameraPose {
        Self::new().camera
    }

    pub fn placements(&self) -> Vec<CameraPose> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Place(pose) => Some(*pose),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls.iter().filter(|call| *call == wanted).count()
    }
}

impl CaptureDriver for ScriptedDriver {
    fn camera_pose(&mut self) -> impl Future<Output = Result<CameraPose, DatasetError>> + Send {
        self.calls.push(Call::CameraPose);
        ready(Ok(self.camera))
    }

    fn place_camera(
        &mut self,
        pose: CameraPose,
    ) -> impl Future<Output = Result<(), DatasetError>> + Send {
        self.calls.push(Call::Place(pose));
        self.camera = pose;
        ready(Ok(()))
    }

    fn render(&mut self) -> impl Future<Output = Result<(), DatasetError>> + Send {
        self.calls.push(Call::Render);
        ready(Ok(()))
    }

    fn next_frame(&mut self) -> impl Future<Output = Result<(), DatasetError>> + Send {
        self.calls.push(Call::NextFrame);
        ready(Ok(()))
    }

    fn sleep(&mut self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.calls.push(Call::Sleep(duration));
        tokio::task::yield_now()
    }

    fn read_framebuffer(
        &mut self,
        _encoding: ImageEncoding,
    ) -> impl Future<Output = Result<Vec<u8>, DatasetError>> + Send {
        self.calls.push(Call::Read);
        self.reads += 1;

        let result = if self.fail_read_at == Some(self.reads) {
            Err(DatasetError::Renderer("surface lost".to_string()))
        } else {
            let size = self.frame_sizes.pop_front().unwrap_or(FULL_FRAME_BYTES);
            Ok(vec![(self.reads % 251) as u8; size])
        };
        ready(result)
    }

    fn report_progress(&mut self, progress: &CaptureProgress) {
        self.progress.push(progress.clone());
        if let Some((after, scheduler)) = &self.cancel_after {
            if progress.completed == *after {
                scheduler.cancel();
            }
        }
    }
}

pub fn config(elevations: &str, azimuths: &str, distance_variations: bool) -> CaptureConfig {
    CaptureConfig {
        grid: PoseGridParams {
            elevations: elevations.to_string(),
            azimuths: azimuths.to_string(),
            distance_variations,
            ..PoseGridParams::default()
        },
        ..CaptureConfig::default()
    }
}
