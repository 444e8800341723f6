//! Shared constants for the studio application and the capture core.

/// Capture timing, readback plausibility and packaging constants.
pub mod capture;

/// Default pose grid parameters and caption descriptor tables.
pub mod pose_grid;

/// Manipulator, light helper and picking visuals.
pub mod render_settings;

/// Default placement of lights, splat volumes and the viewport camera.
pub mod scene;
