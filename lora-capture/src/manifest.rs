use crate::capture::CaptureSession;
use crate::error::DatasetError;
use crate::pose_grid::DistanceClass;
use chrono::{DateTime, Utc};
use constants::pose_grid::{DATASET_FILE_FORMAT, REFERENCE_IMAGE_DESCRIPTION};
use serde::{Deserialize, Serialize};

/// `dataset_config.json`: grid parameters plus an index of every capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub trigger_word: String,
    pub camera_radius: f32,
    pub distance_variations: bool,
    pub closeup_factor: f32,
    pub wide_factor: f32,
    /// Raw comma-separated list as typed by the operator.
    pub elevations: String,
    pub azimuths: String,
    pub total_captures: usize,
    pub created_at: DateTime<Utc>,
    pub reference_image: String,
    pub file_format: String,
    pub txt_captions_included: bool,
    pub captures: Vec<ManifestCapture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestCapture {
    pub id: String,
    pub start_image: String,
    pub end_image: String,
    pub prompt_file: Option<String>,
    pub azimuth: f32,
    pub elevation: f32,
    pub adjusted_elevation: f32,
    pub distance: DistanceClass,
    pub prompt: String,
}

impl DatasetManifest {
    pub fn from_session(
        session: &CaptureSession,
        export_captions: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        let config = session.config().cloned().unwrap_or_default();
        let extension = config.encoding.extension();

        let captures = session
            .captures()
            .iter()
            .map(|capture| ManifestCapture {
                id: capture.id.to_string(),
                start_image: capture.id.start_image_name(extension),
                end_image: capture.id.end_image_name(extension),
                prompt_file: export_captions.then(|| capture.id.caption_file_name()),
                azimuth: capture.pose.azimuth_deg,
                elevation: capture.pose.elevation_deg,
                adjusted_elevation: capture.pose.adjusted_elevation_deg,
                distance: capture.pose.distance,
                prompt: capture.caption.clone(),
            })
            .collect::<Vec<_>>();

        Self {
            trigger_word: config.trigger_token,
            camera_radius: config.grid.camera_radius,
            distance_variations: config.grid.distance_variations,
            closeup_factor: config.grid.closeup_factor,
            wide_factor: config.grid.wide_factor,
            elevations: config.grid.elevations,
            azimuths: config.grid.azimuths,
            total_captures: captures.len(),
            created_at,
            reference_image: REFERENCE_IMAGE_DESCRIPTION.to_string(),
            file_format: DATASET_FILE_FORMAT.to_string(),
            txt_captions_included: export_captions,
            captures,
        }
    }

    pub fn to_json(&self) -> Result<String, DatasetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Capture, CaptureId};
    use crate::config::{CaptureConfig, ImageEncoding};
    use crate::pose_grid::Pose;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn session_with(encoding: ImageEncoding) -> CaptureSession {
        let mut config = CaptureConfig::default();
        config.trigger_token = "mychar".to_string();
        config.encoding = encoding;

        let start: Arc<[u8]> = Arc::from(vec![1u8; 8]);
        let mut session = CaptureSession::default();
        session.begin(config, 2);
        for (counter, elevation) in [(1, -30.0), (2, 30.0)] {
            let pose = Pose::new(elevation, 90.0, DistanceClass::Wide, 7.2);
            session.record(Capture {
                id: CaptureId::with_suffix(counter, "abc123"),
                start_image: start.clone(),
                end_image: Arc::from(vec![2u8; 8]),
                caption: pose.caption("mychar"),
                pose,
            });
        }
        session.finish();
        session
    }

    #[test]
    fn manifest_indexes_captures_in_order() {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let manifest =
            DatasetManifest::from_session(&session_with(ImageEncoding::Png), true, created_at);

        assert_eq!(manifest.trigger_word, "mychar");
        assert_eq!(manifest.total_captures, 2);
        assert_eq!(manifest.elevations, "-30, 0, 30, 60");
        assert_eq!(manifest.captures[0].id, "0001-abc123");
        assert_eq!(manifest.captures[0].start_image, "0001-abc123_start.png");
        assert_eq!(manifest.captures[0].prompt_file.as_deref(), Some("0001-abc123.txt"));
        assert_eq!(manifest.captures[0].elevation, -30.0);
        assert!((manifest.captures[0].adjusted_elevation + 10.0).abs() < 1e-5);
        assert_eq!(manifest.captures[1].id, "0002-abc123");
    }

    #[test]
    fn prompt_file_is_null_without_captions() {
        let manifest = DatasetManifest::from_session(
            &session_with(ImageEncoding::jpeg()),
            false,
            Utc::now(),
        );
        let json: serde_json::Value = serde_json::from_str(&manifest.to_json().unwrap()).unwrap();

        assert_eq!(json["txt_captions_included"], false);
        assert!(json["captures"][0]["prompt_file"].is_null());
        assert_eq!(json["captures"][0]["end_image"], "0001-abc123_end.jpg");
        assert_eq!(json["captures"][0]["distance"], "wide");
        assert_eq!(json["reference_image"], "front view eye-level medium shot");
        assert_eq!(json["file_format"], "START/END pairs with shared prompt");
    }
}
