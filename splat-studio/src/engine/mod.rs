/// Orbit camera and its input controller.
pub mod camera;

/// Capture sweep bridge, dataset export and image encoding.
///
/// Runs the renderer-independent capture scheduler against the live viewport.
pub mod capture;

/// Immediate-mode overlays: light helpers, selection outline, manipulator handles.
pub mod gizmos;

/// Load, replace and delete splat volumes, neural fields and mesh imports.
pub mod loading;

/// Entity kinds, transform adapters and studio lighting.
pub mod scene;

/// Bottom-left status text.
pub mod status_overlay;
