use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of entity kinds that take part in selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    SplatVolume,
    NeuralSplatField,
    MeshImport(u32),
    Light(LightRole),
}

impl EntityKind {
    pub fn label(&self) -> String {
        match self {
            Self::SplatVolume => "splat volume".to_string(),
            Self::NeuralSplatField => "neural splat field".to_string(),
            Self::MeshImport(id) => format!("mesh import glb-{}", id),
            Self::Light(role) => format!("{} light", role),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightRole {
    Key,
    Fill,
    Back,
}

impl LightRole {
    pub const ALL: [LightRole; 3] = [Self::Key, Self::Fill, Self::Back];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Fill => "fill",
            Self::Back => "back",
        }
    }
}

impl fmt::Display for LightRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marks the root of something the operator can select.
#[derive(Component, Debug, Clone, Copy)]
pub struct Selectable {
    pub kind: EntityKind,
}

/// Gaussian splat point cloud. At most one exists at a time.
#[derive(Component, Debug, Clone)]
pub struct SplatVolume {
    pub source: String,
    pub format: SplatFormat,
    pub fade_in: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplatFormat {
    Ply,
    Splat,
    KSplat,
}

impl SplatFormat {
    /// Detects the format from a URL or file name, defaulting to PLY.
    pub fn detect(source: &str) -> Self {
        let lower = source.to_lowercase();
        if lower.contains(".ksplat") {
            Self::KSplat
        } else if lower.contains(".splat") {
            Self::Splat
        } else {
            Self::Ply
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ply => "PLY",
            Self::Splat => "SPLAT",
            Self::KSplat => "KSPLAT",
        }
    }
}

/// Neural radiance field streamed from a capture service. At most one exists at a time.
#[derive(Component, Debug, Clone)]
pub struct NeuralSplatField {
    pub source: String,
    pub particle_reveal: bool,
}

#[derive(Component, Debug, Clone)]
pub struct MeshImport {
    pub id: u32,
    pub name: String,
    pub path: String,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct StudioLight {
    pub role: LightRole,
}

/// Pickable stand-in drawn for a light. Spawned as a child of its light.
#[derive(Component, Debug, Clone, Copy)]
pub struct LightHelper {
    pub light: Entity,
}

/// Local-space box used for ray picking when an entity has no mesh bounds.
#[derive(Component, Debug, Clone, Copy)]
pub struct PickBounds {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl PickBounds {
    pub fn cube(half_size: f32) -> Self {
        Self {
            center: Vec3::ZERO,
            half_extents: Vec3::splat(half_size),
        }
    }
}
