//! Orbit camera for inspecting the composited scene.
//!
//! The orbit state is a resource rather than a component so the capture
//! driver can take over the camera for a sweep and hand it back afterwards.

/// Orbit camera resource, camera spawn and controller system.
pub mod orbit_camera;

pub use orbit_camera::{OrbitCamera, StudioCamera, orbit_camera_controller, spawn_studio_camera};
