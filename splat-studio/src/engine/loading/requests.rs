use crate::engine::scene::{SplatFormat, TransformFields};
use bevy::prelude::*;
use thiserror::Error;

/// Loads a splat volume, replacing the current one.
#[derive(Event, Debug, Clone)]
pub struct LoadSplatVolume {
    pub source: String,
    pub fade_in: bool,
    /// Transform to apply once spawned. Defaults to the standard splat placement.
    pub fields: Option<TransformFields>,
}

/// Loads a neural splat field from a capture service URL, replacing the current one.
#[derive(Event, Debug, Clone)]
pub struct LoadNeuralField {
    pub source: String,
    pub particle_reveal: bool,
    pub fields: Option<TransformFields>,
}

/// Imports a glTF binary or JSON scene as a new mesh entity.
#[derive(Event, Debug, Clone)]
pub struct ImportMesh {
    pub path: String,
    pub fields: Option<TransformFields>,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct DeleteEntity {
    pub entity: Entity,
}

/// A mesh import finished loading and is ready to be selected.
#[derive(Event, Debug, Clone, Copy)]
pub struct MeshImported {
    pub entity: Entity,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Unsupported source '{0}'")]
    UnsupportedSource(String),

    #[error("Could not read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Could not parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Asset {path} failed to load: {reason}")]
    AssetFailed { path: String, reason: String },
}

pub fn validate_splat_source(source: &str) -> Result<SplatFormat, LoadError> {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return Err(LoadError::UnsupportedSource(source.to_string()));
    }
    Ok(SplatFormat::detect(trimmed))
}

pub fn validate_neural_source(source: &str) -> Result<(), LoadError> {
    let trimmed = source.trim();
    let remote = trimmed.starts_with("https://") || trimmed.starts_with("http://");
    let host_present = trimmed
        .split_once("://")
        .map(|(_, rest)| !rest.is_empty())
        .unwrap_or(false);

    if remote && host_present {
        Ok(())
    } else {
        Err(LoadError::UnsupportedSource(source.to_string()))
    }
}

/// Returns the display name of a mesh path, the file stem.
pub fn validate_mesh_path(path: &str) -> Result<String, LoadError> {
    let lower = path.to_lowercase();
    if !(lower.ends_with(".glb") || lower.ends_with(".gltf")) {
        return Err(LoadError::UnsupportedSource(path.to_string()));
    }

    let file_name = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path);
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);

    if stem.is_empty() {
        return Err(LoadError::UnsupportedSource(path.to_string()));
    }
    Ok(stem.to_string())
}
