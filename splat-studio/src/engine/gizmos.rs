use crate::engine::camera::StudioCamera;
use crate::engine::scene::{LightHelper, LightHelperSettings, PickBounds, Selectable, StudioLight};
use crate::tools::selection::manipulator::{
    Axis, ManipulatorMode, ManipulatorState, effective_mode, handle_length,
};
use crate::tools::selection::Manipulator;
use bevy::prelude::*;
use bevy::render::primitives::Aabb;
use constants::render_settings::{
    AXIS_ACTIVE_COLOUR, LIGHT_HELPER_HALF_SIZE, SELECTION_OUTLINE_COLOUR,
};

/// Box gizmo for a local-space box under `xf`.
fn box_transform(xf: &GlobalTransform, center: Vec3, half_extents: Vec3) -> Transform {
    let local = Mat4::from_scale_rotation_translation(half_extents * 2.0, Quat::IDENTITY, center);
    Transform::from_matrix(xf.compute_matrix() * local)
}

pub fn draw_light_helpers(
    mut gizmos: Gizmos,
    settings: Res<LightHelperSettings>,
    helpers: Query<(&GlobalTransform, &LightHelper)>,
    lights: Query<&StudioLight>,
) {
    if !settings.visible {
        return;
    }

    for (xf, helper) in &helpers {
        let Ok(light) = lights.get(helper.light) else {
            continue;
        };
        let colour = light.role.helper_colour();
        let position = xf.translation();

        gizmos.cuboid(
            Transform::from_translation(position)
                .with_scale(Vec3::splat(LIGHT_HELPER_HALF_SIZE * 2.0)),
            colour,
        );
        gizmos.line(position, Vec3::ZERO, colour.with_alpha(0.4));
    }
}

/// Outline around the selected entity: its pick box, or the bounds of every
/// mesh beneath it.
pub fn draw_selection_outline(
    mut gizmos: Gizmos,
    selected: Query<(Entity, &GlobalTransform, Option<&PickBounds>), With<Manipulator>>,
    children: Query<&Children>,
    mesh_bounds: Query<(&GlobalTransform, &Aabb)>,
) {
    for (entity, xf, bounds) in &selected {
        if let Some(bounds) = bounds {
            gizmos.cuboid(
                box_transform(xf, bounds.center, bounds.half_extents),
                SELECTION_OUTLINE_COLOUR,
            );
            continue;
        }

        for descendant in children.iter_descendants(entity) {
            if let Ok((mesh_xf, aabb)) = mesh_bounds.get(descendant) {
                gizmos.cuboid(
                    box_transform(mesh_xf, aabb.center.into(), aabb.half_extents.into()),
                    SELECTION_OUTLINE_COLOUR,
                );
            }
        }
    }
}

pub fn draw_manipulator(
    mut gizmos: Gizmos,
    state: Res<ManipulatorState>,
    selected: Query<(&GlobalTransform, &Selectable), With<Manipulator>>,
    cameras: Query<&GlobalTransform, With<StudioCamera>>,
) {
    let Ok((xf, selectable)) = selected.single() else {
        return;
    };
    let Ok(cam_xf) = cameras.single() else {
        return;
    };

    let origin = xf.translation();
    let len = handle_length(cam_xf.translation(), origin);
    let mode = effective_mode(state.mode, selectable.kind);
    let active = state.drag.map(|drag| drag.axis);

    for axis in Axis::ALL {
        let colour = if active == Some(axis) {
            AXIS_ACTIVE_COLOUR
        } else {
            axis.colour()
        };
        let end = origin + axis.direction() * len;

        match mode {
            ManipulatorMode::Translate => {
                gizmos.arrow(origin, end, colour);
            }
            ManipulatorMode::Rotate => {
                let facing = Quat::from_rotation_arc(Vec3::Z, axis.direction());
                gizmos.circle(Isometry3d::new(origin, facing), len, colour);
            }
            ManipulatorMode::Scale => {
                gizmos.line(origin, end, colour);
                gizmos.cuboid(
                    Transform::from_translation(end).with_scale(Vec3::splat(len * 0.1)),
                    colour,
                );
            }
        }
    }
}
