use super::requests::{
    DeleteEntity, LoadNeuralField, LoadSplatVolume, validate_neural_source, validate_splat_source,
};
use crate::engine::scene::{
    EntityAdapter, EntityKind, NeuralSplatField, PickBounds, Selectable, SplatVolume,
    TransformFields, adapter_for,
};
use bevy::prelude::*;
use constants::scene::{SPLAT_DEFAULT_POSITION, VOLUME_PICK_HALF_EXTENTS};

fn volume_bounds() -> PickBounds {
    PickBounds {
        center: Vec3::ZERO,
        half_extents: Vec3::from_array(VOLUME_PICK_HALF_EXTENTS),
    }
}

fn placed(kind: EntityKind, fields: &TransformFields) -> Transform {
    let mut transform = Transform::default();
    adapter_for(kind).write(fields, &mut transform);
    transform
}

/// Spawns the splat volume proxy. Any existing volume is despawned first.
pub fn load_splat_volumes(
    mut commands: Commands,
    mut requests: EventReader<LoadSplatVolume>,
    existing: Query<Entity, With<SplatVolume>>,
) {
    // Only the last request in a frame survives the replacement rule.
    let Some(request) = requests.read().last() else {
        return;
    };

    let format = match validate_splat_source(&request.source) {
        Ok(format) => format,
        Err(e) => {
            error!("Splat volume not loaded: {}", e);
            return;
        }
    };

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let fields = request
        .fields
        .unwrap_or_else(|| TransformFields::at(Vec3::from_array(SPLAT_DEFAULT_POSITION)));

    commands.spawn((
        Name::new("splat_volume"),
        SplatVolume {
            source: request.source.clone(),
            format,
            fade_in: request.fade_in,
        },
        Selectable {
            kind: EntityKind::SplatVolume,
        },
        volume_bounds(),
        placed(EntityKind::SplatVolume, &fields),
        Visibility::default(),
    ));

    info!("Loading {} splat volume from {}", format.name(), request.source);
}

pub fn load_neural_fields(
    mut commands: Commands,
    mut requests: EventReader<LoadNeuralField>,
    existing: Query<Entity, With<NeuralSplatField>>,
) {
    let Some(request) = requests.read().last() else {
        return;
    };

    if let Err(e) = validate_neural_source(&request.source) {
        error!("Neural field not loaded: {}", e);
        return;
    }

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let fields = request.fields.unwrap_or_default();

    commands.spawn((
        Name::new("neural_splat_field"),
        NeuralSplatField {
            source: request.source.clone(),
            particle_reveal: request.particle_reveal,
        },
        Selectable {
            kind: EntityKind::NeuralSplatField,
        },
        volume_bounds(),
        placed(EntityKind::NeuralSplatField, &fields),
        Visibility::default(),
    ));

    info!("Streaming neural splat field from {}", request.source);
}

/// Despawns deleted entities with their children. Selection notices through
/// the removed `Selectable`.
pub fn delete_entities(
    mut commands: Commands,
    mut requests: EventReader<DeleteEntity>,
    names: Query<&Name>,
) {
    for request in requests.read() {
        let Ok(mut entity) = commands.get_entity(request.entity) else {
            warn!("Delete requested for missing entity {:?}", request.entity);
            continue;
        };

        if let Ok(name) = names.get(request.entity) {
            info!("Deleting {}", name);
        }
        entity.despawn();
    }
}
