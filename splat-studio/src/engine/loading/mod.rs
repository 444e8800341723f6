//! Loading and removal of scene entities.
//!
//! Loads are requested through events so the shortcuts, snapshot restore and
//! startup settings all share one path. Invalid requests are logged and
//! leave the scene untouched.

/// Glb/glTF imports and their load-state watcher.
pub mod meshes;

/// Request events, validation and load errors.
pub mod requests;

/// `studio_settings.json` asset applied at startup.
pub mod settings_loader;

/// Splat volume and neural field proxies plus entity deletion.
pub mod volumes;

use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

pub use meshes::{MeshImportCounter, PendingMeshLoad};
pub use requests::{
    DeleteEntity, ImportMesh, LoadError, LoadNeuralField, LoadSplatVolume, MeshImported,
};
pub use settings_loader::{SettingsLoader, StudioSettings};

pub struct LoadingPlugin;

impl Plugin for LoadingPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(JsonAssetPlugin::<StudioSettings>::new(&["json"]))
            .init_resource::<MeshImportCounter>()
            .init_resource::<SettingsLoader>()
            .add_event::<LoadSplatVolume>()
            .add_event::<LoadNeuralField>()
            .add_event::<ImportMesh>()
            .add_event::<DeleteEntity>()
            .add_event::<MeshImported>()
            .add_systems(Startup, settings_loader::start_settings_load)
            .add_systems(
                Update,
                (
                    settings_loader::apply_studio_settings,
                    volumes::load_splat_volumes,
                    volumes::load_neural_fields,
                    meshes::import_meshes,
                    meshes::watch_mesh_loads,
                    volumes::delete_entities,
                ),
            );
    }
}
