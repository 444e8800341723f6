use super::store::{ConfigStore, StoreError};
use crate::engine::scene::{LightRole, TransformFields};
use bevy::prelude::*;
use chrono::{DateTime, Utc};
use lora_capture::CaptureConfig;
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_VERSION: u32 = 1;

const SNAPSHOT_KEY_PREFIX: &str = "splat_studio.snapshot.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSnapshot {
    pub position: Vec3,
    pub target: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightSnapshot {
    pub role: LightRole,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplatSnapshot {
    pub source: String,
    pub fade_in: bool,
    pub fields: TransformFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralSnapshot {
    pub source: String,
    pub particle_reveal: bool,
    pub fields: TransformFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshSnapshot {
    pub path: String,
    pub fields: TransformFields,
}

/// Everything needed to rebuild a studio session, minus captured images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub capture: CaptureConfig,
    pub export_captions: bool,
    pub camera: CameraSnapshot,
    pub lights: Vec<LightSnapshot>,
    pub splat: Option<SplatSnapshot>,
    pub neural: Option<NeuralSnapshot>,
    /// Ordered by import id.
    pub meshes: Vec<MeshSnapshot>,
}

fn snapshot_key(name: &str) -> String {
    format!("{}{}", SNAPSHOT_KEY_PREFIX, name)
}

pub fn save_snapshot(
    store: &mut dyn ConfigStore,
    name: &str,
    snapshot: &SceneSnapshot,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(snapshot)?;
    store.set(&snapshot_key(name), &json)
}

/// `Ok(None)` when no snapshot has that name.
pub fn load_snapshot(
    store: &dyn ConfigStore,
    name: &str,
) -> Result<Option<SceneSnapshot>, StoreError> {
    match store.get(&snapshot_key(name))? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

pub fn delete_snapshot(store: &mut dyn ConfigStore, name: &str) -> Result<(), StoreError> {
    store.remove(&snapshot_key(name))
}

/// Names of every stored snapshot, sorted.
pub fn list_snapshots(store: &dyn ConfigStore) -> Result<Vec<String>, StoreError> {
    let mut names: Vec<String> = store
        .keys()?
        .into_iter()
        .filter_map(|key| key.strip_prefix(SNAPSHOT_KEY_PREFIX).map(str::to_string))
        .collect();
    names.sort();
    Ok(names)
}
