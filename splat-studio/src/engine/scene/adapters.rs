use super::entities::EntityKind;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Transform as the control panel shows it: per-axis XYZ Euler degrees and
/// a single uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformFields {
    pub position: Vec3,
    pub rotation_deg: Vec3,
    pub scale: f32,
}

impl Default for TransformFields {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_deg: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl TransformFields {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..default()
        }
    }
}

pub fn rotation_from_degrees(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        degrees.x.to_radians(),
        degrees.y.to_radians(),
        degrees.z.to_radians(),
    )
}

pub fn degrees_from_rotation(rotation: Quat) -> Vec3 {
    let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
    Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

/// Per-kind conversion between an entity's transform and its panel fields.
pub trait EntityAdapter: Sync {
    fn read(&self, transform: &Transform) -> TransformFields;

    fn write(&self, fields: &TransformFields, transform: &mut Transform);

    /// Kinds that only expose a position ignore rotation and scale edits.
    fn position_only(&self) -> bool {
        false
    }
}

/// Splat volumes are authored in a Y-down, X-mirrored frame, so the X and Y
/// scale axes are stored negated. Nothing outside this adapter sees the sign.
pub struct SplatVolumeAdapter;

impl EntityAdapter for SplatVolumeAdapter {
    fn read(&self, transform: &Transform) -> TransformFields {
        TransformFields {
            position: transform.translation,
            rotation_deg: degrees_from_rotation(transform.rotation),
            scale: transform.scale.z.abs(),
        }
    }

    fn write(&self, fields: &TransformFields, transform: &mut Transform) {
        let s = fields.scale;
        transform.translation = fields.position;
        transform.rotation = rotation_from_degrees(fields.rotation_deg);
        transform.scale = Vec3::new(-s, -s, s);
    }
}

/// Neural fields and mesh imports: plain uniform scale.
pub struct UniformScaleAdapter;

impl EntityAdapter for UniformScaleAdapter {
    fn read(&self, transform: &Transform) -> TransformFields {
        TransformFields {
            position: transform.translation,
            rotation_deg: degrees_from_rotation(transform.rotation),
            scale: transform.scale.x,
        }
    }

    fn write(&self, fields: &TransformFields, transform: &mut Transform) {
        transform.translation = fields.position;
        transform.rotation = rotation_from_degrees(fields.rotation_deg);
        transform.scale = Vec3::splat(fields.scale);
    }
}

/// Directional lights: the position sets where the light shines from, and
/// the light always aims at the origin.
pub struct LightAdapter;

impl EntityAdapter for LightAdapter {
    fn read(&self, transform: &Transform) -> TransformFields {
        TransformFields::at(transform.translation)
    }

    fn write(&self, fields: &TransformFields, transform: &mut Transform) {
        *transform = Transform::from_translation(fields.position).looking_at(Vec3::ZERO, Vec3::Y);
    }

    fn position_only(&self) -> bool {
        true
    }
}

pub fn adapter_for(kind: EntityKind) -> &'static dyn EntityAdapter {
    match kind {
        EntityKind::SplatVolume => &SplatVolumeAdapter,
        EntityKind::NeuralSplatField | EntityKind::MeshImport(_) => &UniformScaleAdapter,
        EntityKind::Light(_) => &LightAdapter,
    }
}
