use super::adapters::{EntityAdapter, LightAdapter, TransformFields};
use super::entities::{EntityKind, LightHelper, LightRole, PickBounds, Selectable, StudioLight};
use bevy::prelude::*;
use constants::render_settings::{
    BACK_LIGHT_HELPER_COLOUR, FILL_LIGHT_HELPER_COLOUR, KEY_LIGHT_HELPER_COLOUR,
    LIGHT_HELPER_HALF_SIZE,
};
use constants::scene::{
    BACK_LIGHT_ILLUMINANCE, BACK_LIGHT_POSITION, FILL_LIGHT_ILLUMINANCE, FILL_LIGHT_POSITION,
    KEY_LIGHT_ILLUMINANCE, KEY_LIGHT_POSITION,
};

/// Whether light helpers are drawn. Hidden helpers cannot be picked.
#[derive(Resource, Debug, Clone, Copy)]
pub struct LightHelperSettings {
    pub visible: bool,
}

impl Default for LightHelperSettings {
    fn default() -> Self {
        Self { visible: true }
    }
}

impl LightRole {
    pub fn default_position(&self) -> Vec3 {
        match self {
            Self::Key => Vec3::from_array(KEY_LIGHT_POSITION),
            Self::Fill => Vec3::from_array(FILL_LIGHT_POSITION),
            Self::Back => Vec3::from_array(BACK_LIGHT_POSITION),
        }
    }

    pub fn illuminance(&self) -> f32 {
        match self {
            Self::Key => KEY_LIGHT_ILLUMINANCE,
            Self::Fill => FILL_LIGHT_ILLUMINANCE,
            Self::Back => BACK_LIGHT_ILLUMINANCE,
        }
    }

    pub fn helper_colour(&self) -> Color {
        match self {
            Self::Key => KEY_LIGHT_HELPER_COLOUR,
            Self::Fill => FILL_LIGHT_HELPER_COLOUR,
            Self::Back => BACK_LIGHT_HELPER_COLOUR,
        }
    }
}

/// Spawns the key, fill and back lights, each with a pickable helper child.
pub fn spawn_studio_lights(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        brightness: 200.0,
        ..default()
    });

    for role in LightRole::ALL {
        let mut transform = Transform::default();
        LightAdapter.write(&TransformFields::at(role.default_position()), &mut transform);

        let light = commands
            .spawn((
                Name::new(format!("{}_light", role)),
                DirectionalLight {
                    illuminance: role.illuminance(),
                    shadows_enabled: role == LightRole::Key,
                    ..default()
                },
                transform,
                StudioLight { role },
                Selectable {
                    kind: EntityKind::Light(role),
                },
            ))
            .id();

        commands.spawn((
            Name::new(format!("{}_light_helper", role)),
            LightHelper { light },
            PickBounds::cube(LIGHT_HELPER_HALF_SIZE),
            Transform::default(),
            Visibility::default(),
            ChildOf(light),
        ));
    }

    info!("Studio lights ready (key, fill, back)");
}
