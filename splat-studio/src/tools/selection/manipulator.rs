use crate::engine::camera::{OrbitCamera, StudioCamera};
use crate::engine::scene::{EntityKind, Selectable, adapter_for};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use constants::render_settings::{
    AXIS_X_COLOUR, AXIS_Y_COLOUR, AXIS_Z_COLOUR, MANIPULATOR_MIN_SCALE,
    MANIPULATOR_PICK_TOLERANCE, MANIPULATOR_ROTATE_SPEED, MANIPULATOR_SCREEN_FRACTION,
};

/// Attached to the one selected entity.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Manipulator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManipulatorMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn direction(&self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    pub fn colour(&self) -> Color {
        match self {
            Axis::X => AXIS_X_COLOUR,
            Axis::Y => AXIS_Y_COLOUR,
            Axis::Z => AXIS_Z_COLOUR,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ActiveDrag {
    pub kind: EntityKind,
    pub axis: Axis,
    pub mode: ManipulatorMode,
    pub start_cursor: Vec2,
    pub start_param: f32,
    pub start_transform: Transform,
}

/// Manipulator mode (kept across selections) and the drag in progress.
#[derive(Resource, Debug, Default)]
pub struct ManipulatorState {
    pub mode: ManipulatorMode,
    pub drag: Option<ActiveDrag>,
}

impl ManipulatorState {
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }
}

/// Lights only expose a position.
pub fn effective_mode(mode: ManipulatorMode, kind: EntityKind) -> ManipulatorMode {
    match kind {
        EntityKind::Light(_) => ManipulatorMode::Translate,
        _ => mode,
    }
}

pub fn handle_length(camera_position: Vec3, origin: Vec3) -> f32 {
    camera_position.distance(origin) * MANIPULATOR_SCREEN_FRACTION
}

/// Parameter along `axis` (from `line_origin`) of the point closest to the ray.
/// None when the ray runs parallel to the axis.
pub fn closest_axis_parameter(
    ray_origin: Vec3,
    ray_dir: Vec3,
    line_origin: Vec3,
    axis: Vec3,
) -> Option<f32> {
    let w = line_origin - ray_origin;
    let a = axis.dot(axis);
    let b = axis.dot(ray_dir);
    let c = ray_dir.dot(ray_dir);
    let d = axis.dot(w);
    let e = ray_dir.dot(w);

    let denom = a * c - b * b;
    if denom.abs() < 1e-6 {
        return None;
    }
    Some((b * e - c * d) / denom)
}

fn ray_point_distance(ray_origin: Vec3, ray_dir: Vec3, point: Vec3) -> f32 {
    let t = (point - ray_origin).dot(ray_dir).max(0.0);
    point.distance(ray_origin + ray_dir * t)
}

fn ray_segment_distance(ray_origin: Vec3, ray_dir: Vec3, start: Vec3, axis: Vec3, len: f32) -> f32 {
    let s = closest_axis_parameter(ray_origin, ray_dir, start, axis)
        .unwrap_or(0.0)
        .clamp(0.0, len);
    ray_point_distance(ray_origin, ray_dir, start + axis * s)
}

fn ray_ring_distance(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, normal: Vec3, radius: f32) -> Option<f32> {
    let denom = normal.dot(ray_dir);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (center - ray_origin).dot(normal) / denom;
    if t < 0.0 {
        return None;
    }
    let hit = ray_origin + ray_dir * t;
    Some((hit.distance(center) - radius).abs())
}

/// Handle under the ray, if any. Translate and scale handles are axis
/// segments; rotate handles are rings around each axis.
pub fn pick_handle(
    mode: ManipulatorMode,
    ray_origin: Vec3,
    ray_dir: Vec3,
    origin: Vec3,
    len: f32,
) -> Option<Axis> {
    let tolerance = len * MANIPULATOR_PICK_TOLERANCE;

    Axis::ALL
        .iter()
        .filter_map(|axis| {
            let distance = match mode {
                ManipulatorMode::Translate | ManipulatorMode::Scale => Some(ray_segment_distance(
                    ray_origin,
                    ray_dir,
                    origin,
                    axis.direction(),
                    len,
                )),
                ManipulatorMode::Rotate => {
                    ray_ring_distance(ray_origin, ray_dir, origin, axis.direction(), len)
                }
            }?;
            (distance <= tolerance).then_some((*axis, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(axis, _)| axis)
}

pub fn translated(start: &Transform, axis: Axis, start_param: f32, param: f32) -> Transform {
    let mut transform = *start;
    transform.translation = start.translation + axis.direction() * (param - start_param);
    transform
}

/// Position-only kinds go back through their adapter, so a dragged light
/// keeps aiming at the origin.
pub fn conformed(kind: EntityKind, next: Transform) -> Transform {
    let adapter = adapter_for(kind);
    if !adapter.position_only() {
        return next;
    }
    let mut transform = next;
    adapter.write(&adapter.read(&next), &mut transform);
    transform
}

pub fn rotated(start: &Transform, axis: Axis, cursor_delta: Vec2) -> Transform {
    let angle = cursor_delta.x * MANIPULATOR_ROTATE_SPEED;
    let mut transform = *start;
    transform.rotation = Quat::from_axis_angle(axis.direction(), angle) * start.rotation;
    transform
}

/// Uniform scale by the ratio of the grab distances along the handle. Axis
/// signs of the starting scale are preserved.
pub fn scaled(start: &Transform, start_param: f32, param: f32) -> Transform {
    let factor = if start_param.abs() < 1e-6 {
        1.0
    } else {
        (param / start_param).max(0.0)
    };

    let mut transform = *start;
    transform.scale = Vec3::new(
        scale_component(start.scale.x, factor),
        scale_component(start.scale.y, factor),
        scale_component(start.scale.z, factor),
    );
    transform
}

fn scale_component(start: f32, factor: f32) -> f32 {
    let sign = if start < 0.0 { -1.0 } else { 1.0 };
    sign * (start.abs() * factor).max(MANIPULATOR_MIN_SCALE)
}

pub fn switch_manipulator_mode(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<ManipulatorState>,
) {
    let mode = if keyboard.just_pressed(KeyCode::KeyW) {
        ManipulatorMode::Translate
    } else if keyboard.just_pressed(KeyCode::KeyE) {
        ManipulatorMode::Rotate
    } else if keyboard.just_pressed(KeyCode::KeyR) {
        ManipulatorMode::Scale
    } else {
        return;
    };

    if state.mode != mode && !state.is_dragging() {
        state.mode = mode;
        info!("Manipulator mode: {:?}", mode);
    }
}

/// Starts a drag when the press lands on a handle; orbiting is locked until release.
pub fn begin_manipulator_drag(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<StudioCamera>>,
    selected: Query<(&Transform, &GlobalTransform, &Selectable), With<Manipulator>>,
    mut state: ResMut<ManipulatorState>,
    mut orbit: ResMut<OrbitCamera>,
) {
    if !buttons.just_pressed(MouseButton::Left) || orbit.capture_lock {
        return;
    }

    let Ok((transform, global, selectable)) = selected.single() else {
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, cam_xf)) = cameras.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(cam_xf, cursor) else {
        return;
    };

    let origin = global.translation();
    let dir = ray.direction.as_vec3();
    let mode = effective_mode(state.mode, selectable.kind);
    let len = handle_length(cam_xf.translation(), origin);

    let Some(axis) = pick_handle(mode, ray.origin, dir, origin, len) else {
        return;
    };
    let start_param =
        closest_axis_parameter(ray.origin, dir, origin, axis.direction()).unwrap_or(0.0);

    state.drag = Some(ActiveDrag {
        kind: selectable.kind,
        axis,
        mode,
        start_cursor: cursor,
        start_param,
        start_transform: *transform,
    });
    orbit.drag_lock = true;
}

pub fn update_manipulator_drag(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<StudioCamera>>,
    mut selected: Query<&mut Transform, With<Manipulator>>,
    mut state: ResMut<ManipulatorState>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let Some(drag) = state.drag else {
        return;
    };

    if !buttons.pressed(MouseButton::Left) || selected.is_empty() {
        state.drag = None;
        orbit.drag_lock = false;
        return;
    }

    let Ok(mut transform) = selected.single_mut() else {
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, cam_xf)) = cameras.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(cam_xf, cursor) else {
        return;
    };

    let dir = ray.direction.as_vec3();
    let axis_param = || {
        closest_axis_parameter(
            ray.origin,
            dir,
            drag.start_transform.translation,
            drag.axis.direction(),
        )
    };

    let next = match drag.mode {
        ManipulatorMode::Translate => {
            let Some(param) = axis_param() else {
                return;
            };
            translated(&drag.start_transform, drag.axis, drag.start_param, param)
        }
        ManipulatorMode::Rotate => {
            rotated(&drag.start_transform, drag.axis, cursor - drag.start_cursor)
        }
        ManipulatorMode::Scale => {
            let Some(param) = axis_param() else {
                return;
            };
            scaled(&drag.start_transform, drag.start_param, param)
        }
    };
    let next = conformed(drag.kind, next);

    if *transform != next {
        *transform = next;
    }
}
