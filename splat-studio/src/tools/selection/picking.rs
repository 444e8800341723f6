use super::coordinator::{DeselectEntity, SelectEntity};
use super::manipulator::ManipulatorState;
use super::ray::ray_hits_obb;
use crate::engine::camera::{OrbitCamera, StudioCamera};
use crate::engine::scene::{LightHelper, LightHelperSettings, PickBounds};
use bevy::prelude::*;
use bevy::render::primitives::Aabb;
use bevy::window::PrimaryWindow;
use constants::render_settings::CLICK_DRAG_THRESHOLD_PX;

/// Where the current left press started, if it can still become a click.
#[derive(Resource, Default, Debug)]
pub struct PointerState {
    press: Option<Vec2>,
}

/// A press and release within the drag threshold counts as a click.
pub fn is_click(press: Vec2, release: Vec2) -> bool {
    press.distance(release) <= CLICK_DRAG_THRESHOLD_PX
}

/// Left click picks against pick bounds (volumes, light helpers) and mesh
/// bounds. A hit is sent for selection, empty space deselects. Presses that
/// start a manipulator drag or happen during capture are ignored.
pub fn pick_on_click(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<StudioCamera>>,
    pick_bounds: Query<(Entity, &GlobalTransform, &PickBounds, Option<&LightHelper>)>,
    mesh_bounds: Query<(Entity, &GlobalTransform, &Aabb), With<Mesh3d>>,
    helper_settings: Res<LightHelperSettings>,
    manipulator: Res<ManipulatorState>,
    orbit: Res<OrbitCamera>,
    mut pointer: ResMut<PointerState>,
    mut selects: EventWriter<SelectEntity>,
    mut deselects: EventWriter<DeselectEntity>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let cursor = window.cursor_position();

    if buttons.just_pressed(MouseButton::Left) {
        pointer.press = if manipulator.is_dragging() || orbit.capture_lock {
            None
        } else {
            cursor
        };
    }

    if !buttons.just_released(MouseButton::Left) {
        return;
    }
    let (Some(press), Some(release)) = (pointer.press.take(), cursor) else {
        return;
    };
    if !is_click(press, release) {
        return;
    }

    let Ok((camera, cam_xf)) = cameras.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(cam_xf, release) else {
        return;
    };
    let origin = ray.origin;
    let dir = ray.direction.as_vec3();

    let bounds_hits = pick_bounds
        .iter()
        .filter(|(_, _, _, helper)| helper.is_none() || helper_settings.visible)
        .filter_map(|(entity, xf, bounds, _)| {
            ray_hits_obb(origin, dir, xf, bounds.center, bounds.half_extents).map(|t| (entity, t))
        });

    let mesh_hits = mesh_bounds.iter().filter_map(|(entity, xf, aabb)| {
        ray_hits_obb(
            origin,
            dir,
            xf,
            Vec3::from(aabb.center),
            Vec3::from(aabb.half_extents),
        )
        .map(|t| (entity, t))
    });

    let nearest = bounds_hits
        .chain(mesh_hits)
        .filter(|(_, t)| *t > 0.0)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    match nearest {
        Some((entity, _)) => {
            selects.write(SelectEntity { entity });
        }
        None => {
            deselects.write(DeselectEntity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_threshold() {
        assert!(is_click(Vec2::new(100.0, 100.0), Vec2::new(103.0, 102.0)));
        assert!(!is_click(Vec2::new(100.0, 100.0), Vec2::new(110.0, 100.0)));
    }
}
