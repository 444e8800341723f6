use crate::descriptor::caption_for;
use crate::error::DatasetError;
use bevy::math::Vec3;
use constants::pose_grid::{
    DEFAULT_AZIMUTHS, DEFAULT_CAMERA_RADIUS, DEFAULT_CLOSEUP_FACTOR, DEFAULT_DISTANCE_VARIATIONS,
    DEFAULT_ELEVATIONS, DEFAULT_WIDE_FACTOR,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Framing class of a pose. Each class maps to a radius derived from the base radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceClass {
    Close,
    Medium,
    Wide,
}

impl DistanceClass {
    /// Sweep order when distance variation is enabled.
    pub const VARIED: [DistanceClass; 3] = [Self::Close, Self::Medium, Self::Wide];

    /// Sweep order when distance variation is disabled.
    pub const MEDIUM_ONLY: [DistanceClass; 1] = [Self::Medium];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Medium => "medium",
            Self::Wide => "wide",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "close" => Some(Self::Close),
            "medium" => Some(Self::Medium),
            "wide" => Some(Self::Wide),
            _ => None,
        }
    }

    /// Camera distance from the origin for this class.
    pub fn radius(&self, params: &PoseGridParams) -> f32 {
        match self {
            Self::Close => params.camera_radius * params.closeup_factor,
            Self::Medium => params.camera_radius,
            Self::Wide => params.camera_radius * params.wide_factor,
        }
    }
}

impl fmt::Display for DistanceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator-facing pose grid parameters.
///
/// Elevation and azimuth lists are kept as the raw comma-separated strings the
/// operator typed; they are recorded verbatim in the dataset manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseGridParams {
    pub elevations: String,
    pub azimuths: String,
    pub distance_variations: bool,
    pub camera_radius: f32,
    pub closeup_factor: f32,
    pub wide_factor: f32,
}

impl Default for PoseGridParams {
    fn default() -> Self {
        Self {
            elevations: DEFAULT_ELEVATIONS.to_string(),
            azimuths: DEFAULT_AZIMUTHS.to_string(),
            distance_variations: DEFAULT_DISTANCE_VARIATIONS,
            camera_radius: DEFAULT_CAMERA_RADIUS,
            closeup_factor: DEFAULT_CLOSEUP_FACTOR,
            wide_factor: DEFAULT_WIDE_FACTOR,
        }
    }
}

impl PoseGridParams {
    pub fn distance_classes(&self) -> &'static [DistanceClass] {
        if self.distance_variations {
            &DistanceClass::VARIED
        } else {
            &DistanceClass::MEDIUM_ONLY
        }
    }

    pub fn parsed_elevations(&self) -> Vec<f32> {
        parse_angle_list(&self.elevations)
    }

    pub fn parsed_azimuths(&self) -> Vec<f32> {
        parse_angle_list(&self.azimuths)
    }

    /// Number of poses the grid expands to, or `InvalidParameters` for an empty grid.
    pub fn total_poses(&self) -> Result<usize, DatasetError> {
        let (elevations, azimuths) = self.validated_lists()?;
        Ok(elevations.len() * azimuths.len() * self.distance_classes().len())
    }

    fn validated_lists(&self) -> Result<(Vec<f32>, Vec<f32>), DatasetError> {
        let elevations = self.parsed_elevations();
        let azimuths = self.parsed_azimuths();

        if elevations.is_empty() || azimuths.is_empty() {
            return Err(DatasetError::InvalidParameters(format!(
                "elevations '{}' and azimuths '{}' must each contain at least one number",
                self.elevations, self.azimuths
            )));
        }

        Ok((elevations, azimuths))
    }
}

/// Parses a comma-separated list of angles. Each entry contributes its
/// leading number ("30deg" reads as 30); entries without one are skipped.
pub fn parse_angle_list(list: &str) -> Vec<f32> {
    list.split(',')
        .filter_map(|entry| leading_number(entry.trim()))
        .filter(|value| value.is_finite())
        .collect()
}

fn leading_number(entry: &str) -> Option<f32> {
    let bytes = entry.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits_from(end + 1 + sign);
        if exp_end > end + 1 + sign {
            end = exp_end;
        }
    }

    entry[..end].parse().ok()
}

/// One camera placement of the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Elevation as configured. Drives the caption.
    pub elevation_deg: f32,
    pub azimuth_deg: f32,
    pub distance: DistanceClass,
    pub radius: f32,
    /// Elevation actually used for placement.
    pub adjusted_elevation_deg: f32,
}

impl Pose {
    pub fn new(elevation_deg: f32, azimuth_deg: f32, distance: DistanceClass, radius: f32) -> Self {
        Self {
            elevation_deg,
            azimuth_deg,
            distance,
            radius,
            adjusted_elevation_deg: adjust_elevation(elevation_deg, distance),
        }
    }

    /// Front view, eye level, medium radius. Shared start frame of every pair.
    pub fn reference(camera_radius: f32) -> Self {
        Self::new(0.0, 0.0, DistanceClass::Medium, camera_radius)
    }

    /// Camera position on the orbit sphere around the origin.
    pub fn position(&self) -> Vec3 {
        orbit_position(self.radius, self.adjusted_elevation_deg, self.azimuth_deg)
    }

    pub fn caption(&self, trigger_token: &str) -> String {
        caption_for(
            trigger_token,
            self.azimuth_deg,
            self.elevation_deg,
            self.distance,
        )
    }
}

/// Attenuates negative elevations for wider framings so the camera stays above
/// the subject's ground plane. Close-ups keep the full angle, medium shots two
/// thirds and wide shots one third. Non-negative elevations are never changed.
pub fn adjust_elevation(elevation_deg: f32, distance: DistanceClass) -> f32 {
    if elevation_deg >= 0.0 {
        return elevation_deg;
    }

    match distance {
        DistanceClass::Close => elevation_deg,
        DistanceClass::Medium => elevation_deg * 2.0 / 3.0,
        DistanceClass::Wide => elevation_deg / 3.0,
    }
}

/// Spherical placement looking at the origin.
pub fn orbit_position(radius: f32, elevation_deg: f32, azimuth_deg: f32) -> Vec3 {
    let elevation = elevation_deg.to_radians();
    let azimuth = azimuth_deg.to_radians();

    Vec3::new(
        radius * elevation.cos() * azimuth.sin(),
        radius * elevation.sin(),
        radius * elevation.cos() * azimuth.cos(),
    )
}

/// Expands the grid into poses: distance class outermost, then elevation, then azimuth.
pub fn generate_poses(params: &PoseGridParams) -> Result<Vec<Pose>, DatasetError> {
    let (elevations, azimuths) = params.validated_lists()?;
    let distances = params.distance_classes();

    let mut poses = Vec::with_capacity(elevations.len() * azimuths.len() * distances.len());
    for distance in distances {
        let radius = distance.radius(params);
        for &elevation in &elevations {
            for &azimuth in &azimuths {
                poses.push(Pose::new(elevation, azimuth, *distance, radius));
            }
        }
    }

    Ok(poses)
}
