use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use constants::scene::{
    CAMERA_START_POSITION, ORBIT_MAX_RADIUS, ORBIT_MIN_RADIUS, ORBIT_PAN_SPEED, ORBIT_PITCH_LIMIT,
    ORBIT_ROTATE_SPEED, ORBIT_ZOOM_SPEED,
};
use lora_capture::pose_grid::orbit_position;

/// The viewport camera entity.
#[derive(Component)]
pub struct StudioCamera;

/// Orbit state around a target point. Yaw and pitch follow the capture pose
/// convention: yaw 0 looks from +Z, positive pitch is above the target.
#[derive(Resource, Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub radius: f32,
    /// Set while the manipulator is dragged.
    pub drag_lock: bool,
    /// Set while a capture sweep owns the camera.
    pub capture_lock: bool,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_pose(Vec3::from_array(CAMERA_START_POSITION), Vec3::ZERO)
    }
}

impl OrbitCamera {
    pub fn from_pose(position: Vec3, target: Vec3) -> Self {
        let mut orbit = Self {
            target,
            yaw: 0.0,
            pitch: 0.0,
            radius: ORBIT_MIN_RADIUS,
            drag_lock: false,
            capture_lock: false,
        };
        orbit.set_from_pose(position, target);
        orbit
    }

    /// Re-derives yaw, pitch and radius so that `eye()` returns `position`.
    pub fn set_from_pose(&mut self, position: Vec3, target: Vec3) {
        let offset = position - target;
        let radius = offset.length();

        self.target = target;
        if radius < f32::EPSILON {
            return;
        }
        self.radius = radius;
        self.pitch = (offset.y / radius).clamp(-1.0, 1.0).asin();
        self.yaw = offset.x.atan2(offset.z);
    }

    pub fn eye(&self) -> Vec3 {
        self.target
            + orbit_position(
                self.radius,
                self.pitch.to_degrees(),
                self.yaw.to_degrees(),
            )
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.target, Vec3::Y)
    }

    pub fn accepts_input(&self) -> bool {
        !self.drag_lock && !self.capture_lock
    }

    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw -= delta.x * ORBIT_ROTATE_SPEED;
        self.pitch = (self.pitch + delta.y * ORBIT_ROTATE_SPEED)
            .clamp(-ORBIT_PITCH_LIMIT, ORBIT_PITCH_LIMIT);
    }

    pub fn zoom(&mut self, scroll: f32) {
        self.radius = (self.radius * (1.0 - scroll * ORBIT_ZOOM_SPEED))
            .clamp(ORBIT_MIN_RADIUS, ORBIT_MAX_RADIUS);
    }

    pub fn pan(&mut self, delta: Vec2, right: Vec3, up: Vec3) {
        let scale = ORBIT_PAN_SPEED * self.radius;
        self.target += (-right * delta.x + up * delta.y) * scale;
    }
}

pub fn spawn_studio_camera(mut commands: Commands, orbit: Res<OrbitCamera>) {
    commands.spawn((
        Name::new("studio_camera"),
        Camera3d::default(),
        orbit.transform(),
        StudioCamera,
    ));
}

/// Left drag orbits, right drag pans, wheel zooms. Input is drained but
/// ignored while the manipulator is dragged or a capture owns the camera.
pub fn orbit_camera_controller(
    mut orbit: ResMut<OrbitCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    mut camera_query: Query<&mut Transform, With<StudioCamera>>,
) {
    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();

    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }

    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    if orbit.capture_lock {
        return;
    }

    if orbit.accepts_input() {
        if mouse_button.pressed(MouseButton::Left) && mouse_delta != Vec2::ZERO {
            orbit.rotate(mouse_delta);
        }

        if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
            let right = camera_transform.right().as_vec3();
            let up = camera_transform.up().as_vec3();
            orbit.pan(mouse_delta, right, up);
        }

        if scroll_accum.abs() > f32::EPSILON {
            orbit.zoom(scroll_accum);
        }
    }

    if orbit.is_changed() {
        *camera_transform = orbit.transform();
    }
}
