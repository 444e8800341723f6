use crate::pose_grid::DistanceClass;
use constants::pose_grid::{
    AZIMUTH_DESCRIPTORS, CLOSE_DISTANCE_CLAUSE, ELEVATION_BANDS, LOW_ANGLE_CLAUSE,
    MEDIUM_DISTANCE_CLAUSE, WIDE_DISTANCE_CLAUSE,
};

/// Clause of the compass point closest to `azimuth_deg`.
///
/// Distances are plain absolute differences with no wraparound, so 350 maps
/// to the 315 entry rather than 0. Ties resolve to the earlier table entry.
pub fn azimuth_clause(azimuth_deg: f32) -> &'static str {
    let mut closest = &AZIMUTH_DESCRIPTORS[0];
    for descriptor in AZIMUTH_DESCRIPTORS {
        if (descriptor.degrees - azimuth_deg).abs() < (closest.degrees - azimuth_deg).abs() {
            closest = descriptor;
        }
    }
    closest.clause
}

pub fn elevation_clause(elevation_deg: f32) -> &'static str {
    ELEVATION_BANDS
        .iter()
        .find(|band| elevation_deg >= band.min_degrees)
        .map(|band| band.clause)
        .unwrap_or(LOW_ANGLE_CLAUSE)
}

pub fn distance_clause(distance: DistanceClass) -> &'static str {
    match distance {
        DistanceClass::Close => CLOSE_DISTANCE_CLAUSE,
        DistanceClass::Medium => MEDIUM_DISTANCE_CLAUSE,
        DistanceClass::Wide => WIDE_DISTANCE_CLAUSE,
    }
}

/// Full caption: `<trigger> {azimuth} {elevation} {distance}`.
///
/// The trigger token is wrapped in literal angle brackets. Elevation uses the
/// configured angle, not the attenuated placement angle.
pub fn caption_for(
    trigger_token: &str,
    azimuth_deg: f32,
    elevation_deg: f32,
    distance: DistanceClass,
) -> String {
    format!(
        "<{}> {} {} {}",
        trigger_token,
        azimuth_clause(azimuth_deg),
        elevation_clause(elevation_deg),
        distance_clause(distance)
    )
}
