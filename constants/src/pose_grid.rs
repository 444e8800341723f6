/// Token prepended to every caption to mark the training subject.
pub const DEFAULT_TRIGGER_TOKEN: &str = "sks";

pub const DEFAULT_CAMERA_RADIUS: f32 = 4.0;
pub const DEFAULT_CLOSEUP_FACTOR: f32 = 0.6;
pub const DEFAULT_WIDE_FACTOR: f32 = 1.8;
pub const DEFAULT_DISTANCE_VARIATIONS: bool = true;
pub const DEFAULT_ELEVATIONS: &str = "-30, 0, 30, 60";
pub const DEFAULT_AZIMUTHS: &str = "0, 45, 90, 135, 180, 225, 270, 315";
pub const DEFAULT_EXPORT_CAPTIONS: bool = true;

/// Operator-facing ranges for the capture parameters.
pub const CAMERA_RADIUS_RANGE: (f32, f32) = (1.0, 20.0);
pub const CLOSEUP_FACTOR_RANGE: (f32, f32) = (0.3, 0.9);
pub const WIDE_FACTOR_RANGE: (f32, f32) = (1.2, 3.0);
pub const SETTLE_DELAY_RANGE_MS: (u64, u64) = (100, 1000);

pub struct AzimuthDescriptor {
    pub degrees: f32,
    pub clause: &'static str,
}

/// Compass points used for azimuth captions, in tie-break order.
pub const AZIMUTH_DESCRIPTORS: &[AzimuthDescriptor] = &[
    AzimuthDescriptor {
        degrees: 0.0,
        clause: "front view",
    },
    AzimuthDescriptor {
        degrees: 45.0,
        clause: "front-right quarter view",
    },
    AzimuthDescriptor {
        degrees: 90.0,
        clause: "right side view",
    },
    AzimuthDescriptor {
        degrees: 135.0,
        clause: "back-right quarter view",
    },
    AzimuthDescriptor {
        degrees: 180.0,
        clause: "back view",
    },
    AzimuthDescriptor {
        degrees: 225.0,
        clause: "back-left quarter view",
    },
    AzimuthDescriptor {
        degrees: 270.0,
        clause: "left side view",
    },
    AzimuthDescriptor {
        degrees: 315.0,
        clause: "front-left quarter view",
    },
];

pub struct ElevationBand {
    /// Inclusive lower bound in degrees.
    pub min_degrees: f32,
    pub clause: &'static str,
}

/// Elevation bands checked top-down; anything below the last band is a low-angle shot.
pub const ELEVATION_BANDS: &[ElevationBand] = &[
    ElevationBand {
        min_degrees: 75.0,
        clause: "bird's-eye view",
    },
    ElevationBand {
        min_degrees: 45.0,
        clause: "high-angle shot",
    },
    ElevationBand {
        min_degrees: 15.0,
        clause: "elevated shot",
    },
    ElevationBand {
        min_degrees: -15.0,
        clause: "eye-level shot",
    },
];

pub const LOW_ANGLE_CLAUSE: &str = "low-angle shot";

pub const CLOSE_DISTANCE_CLAUSE: &str = "close-up";
pub const MEDIUM_DISTANCE_CLAUSE: &str = "medium shot";
pub const WIDE_DISTANCE_CLAUSE: &str = "wide shot";

/// Description of the shared reference frame recorded in the manifest.
pub const REFERENCE_IMAGE_DESCRIPTION: &str = "front view eye-level medium shot";
pub const DATASET_FILE_FORMAT: &str = "START/END pairs with shared prompt";
