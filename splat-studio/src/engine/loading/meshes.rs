use super::requests::{ImportMesh, LoadError, MeshImported, validate_mesh_path};
use crate::engine::scene::{EntityKind, MeshImport, Selectable, TransformFields, adapter_for};
use bevy::asset::{AssetLoadError, LoadState};
use bevy::prelude::*;

/// Running id for mesh imports. Ids are never reused within a session.
#[derive(Resource, Default, Debug)]
pub struct MeshImportCounter {
    next: u32,
}

impl MeshImportCounter {
    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Mesh import whose glTF scene is still loading.
#[derive(Component)]
pub struct PendingMeshLoad {
    pub handle: Handle<Scene>,
}

pub fn import_meshes(
    mut commands: Commands,
    mut requests: EventReader<ImportMesh>,
    mut counter: ResMut<MeshImportCounter>,
    asset_server: Res<AssetServer>,
) {
    for request in requests.read() {
        let name = match validate_mesh_path(&request.path) {
            Ok(name) => name,
            Err(e) => {
                error!("Mesh not imported: {}", e);
                continue;
            }
        };

        let id = counter.allocate();
        let kind = EntityKind::MeshImport(id);
        let mut transform = Transform::default();
        adapter_for(kind).write(&request.fields.unwrap_or_default(), &mut transform);

        let handle: Handle<Scene> =
            asset_server.load(GltfAssetLabel::Scene(0).from_asset(request.path.clone()));

        commands.spawn((
            Name::new(format!("glb-{}", id)),
            MeshImport {
                id,
                name: name.clone(),
                path: request.path.clone(),
            },
            Selectable { kind },
            SceneRoot(handle.clone()),
            PendingMeshLoad { handle },
            transform,
        ));

        info!("Importing mesh {} as glb-{}", name, id);
    }
}

pub fn load_error_from_asset(path: &str, error: &AssetLoadError) -> LoadError {
    match error {
        AssetLoadError::AssetReaderError(e) => LoadError::Io {
            path: path.to_string(),
            reason: e.to_string(),
        },
        AssetLoadError::AssetLoaderError(e) => LoadError::Parse {
            path: path.to_string(),
            reason: e.to_string(),
        },
        other => LoadError::AssetFailed {
            path: path.to_string(),
            reason: other.to_string(),
        },
    }
}

/// Finishes pending imports: loaded meshes are announced for auto-selection,
/// failed ones are despawned so nothing half-built stays selectable.
pub fn watch_mesh_loads(
    mut commands: Commands,
    pending: Query<(Entity, &PendingMeshLoad, &MeshImport)>,
    asset_server: Res<AssetServer>,
    mut imported: EventWriter<MeshImported>,
) {
    for (entity, load, mesh) in &pending {
        match asset_server.get_load_state(&load.handle) {
            Some(LoadState::Loaded) => {
                commands.entity(entity).remove::<PendingMeshLoad>();
                imported.write(MeshImported { entity });
                info!("✓ Mesh glb-{} ({}) loaded", mesh.id, mesh.name);
            }
            Some(LoadState::Failed(e)) => {
                let error = load_error_from_asset(&mesh.path, &e);
                error!("Mesh glb-{} removed: {}", mesh.id, error);
                commands.entity(entity).despawn();
            }
            _ => {}
        }
    }
}
