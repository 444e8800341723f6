//! Named scene snapshots behind a key-value store.
//!
//! A snapshot records the capture parameters, the camera, light positions and
//! the sources and transforms of every loaded entity. Restoring one goes
//! through the same load events as the operator, so invalid sources are
//! rejected the same way.

/// Snapshot schema and the save/load/list helpers.
pub mod snapshot;

/// Key-value store trait with file, memory and browser backends.
pub mod store;

use crate::engine::camera::OrbitCamera;
use crate::engine::capture::CaptureSettings;
use crate::engine::loading::{DeleteEntity, ImportMesh, LoadNeuralField, LoadSplatVolume};
use crate::engine::scene::{
    EntityKind, LightRole, MeshImport, NeuralSplatField, SplatVolume, StudioLight, TransformFields,
    adapter_for,
};
use crate::tools::selection::DeselectEntity;
use bevy::prelude::*;
use chrono::Utc;

pub use snapshot::{
    CameraSnapshot, LightSnapshot, MeshSnapshot, NeuralSnapshot, SNAPSHOT_VERSION, SceneSnapshot,
    SplatSnapshot, delete_snapshot, list_snapshots, load_snapshot, save_snapshot,
};
pub use store::{ConfigStore, FileConfigStore, MemoryConfigStore, StoreError};

/// Name used by the F5/F9 quick save and load.
pub const QUICK_SNAPSHOT_NAME: &str = "quick";

#[cfg(not(target_arch = "wasm32"))]
const SNAPSHOT_FILE: &str = "splat_studio_snapshots.json";

#[derive(Event, Debug, Clone)]
pub struct SaveSnapshot {
    pub name: String,
}

#[derive(Event, Debug, Clone)]
pub struct LoadSnapshot {
    pub name: String,
}

#[derive(Event, Debug, Clone)]
pub struct DeleteSnapshot {
    pub name: String,
}

#[derive(Resource)]
pub struct SnapshotStore(pub Box<dyn ConfigStore>);

impl Default for SnapshotStore {
    #[cfg(not(target_arch = "wasm32"))]
    fn default() -> Self {
        Self(Box::new(FileConfigStore::new(SNAPSHOT_FILE)))
    }

    #[cfg(target_arch = "wasm32")]
    fn default() -> Self {
        Self(Box::new(store::LocalStorageConfigStore))
    }
}

pub struct PersistencePlugin;

impl Plugin for PersistencePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SnapshotStore>()
            .add_event::<SaveSnapshot>()
            .add_event::<LoadSnapshot>()
            .add_event::<DeleteSnapshot>()
            .add_systems(
                Update,
                (save_snapshots, load_snapshots, delete_snapshots).chain(),
            );
    }
}

fn fields_of(kind: EntityKind, transform: &Transform) -> TransformFields {
    adapter_for(kind).read(transform)
}

pub fn save_snapshots(
    mut requests: EventReader<SaveSnapshot>,
    mut store: ResMut<SnapshotStore>,
    settings: Res<CaptureSettings>,
    orbit: Res<OrbitCamera>,
    lights: Query<(&StudioLight, &Transform)>,
    splats: Query<(&SplatVolume, &Transform)>,
    neural: Query<(&NeuralSplatField, &Transform)>,
    meshes: Query<(&MeshImport, &Transform)>,
) {
    for request in requests.read() {
        let mut light_snapshots: Vec<LightSnapshot> = lights
            .iter()
            .map(|(light, transform)| LightSnapshot {
                role: light.role,
                position: transform.translation,
            })
            .collect();
        light_snapshots.sort_by_key(|light| LightRole::ALL.iter().position(|r| *r == light.role));

        let mut mesh_entries: Vec<(u32, MeshSnapshot)> = meshes
            .iter()
            .map(|(mesh, transform)| {
                (
                    mesh.id,
                    MeshSnapshot {
                        path: mesh.path.clone(),
                        fields: fields_of(EntityKind::MeshImport(mesh.id), transform),
                    },
                )
            })
            .collect();
        mesh_entries.sort_by_key(|(id, _)| *id);

        let snapshot = SceneSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            capture: settings.capture.clone(),
            export_captions: settings.export_captions,
            camera: CameraSnapshot {
                position: orbit.eye(),
                target: orbit.target,
            },
            lights: light_snapshots,
            splat: splats.iter().next().map(|(splat, transform)| SplatSnapshot {
                source: splat.source.clone(),
                fade_in: splat.fade_in,
                fields: fields_of(EntityKind::SplatVolume, transform),
            }),
            neural: neural.iter().next().map(|(field, transform)| NeuralSnapshot {
                source: field.source.clone(),
                particle_reveal: field.particle_reveal,
                fields: fields_of(EntityKind::NeuralSplatField, transform),
            }),
            meshes: mesh_entries.into_iter().map(|(_, mesh)| mesh).collect(),
        };

        match save_snapshot(store.0.as_mut(), &request.name, &snapshot) {
            Ok(()) => info!(
                "✓ Saved snapshot '{}' ({} meshes)",
                request.name,
                snapshot.meshes.len()
            ),
            Err(e) => error!("Failed to save snapshot '{}': {}", request.name, e),
        }
    }
}

pub fn load_snapshots(
    mut requests: EventReader<LoadSnapshot>,
    store: Res<SnapshotStore>,
    mut settings: ResMut<CaptureSettings>,
    mut orbit: ResMut<OrbitCamera>,
    mut lights: Query<(&StudioLight, &mut Transform)>,
    splats: Query<Entity, With<SplatVolume>>,
    neural: Query<Entity, With<NeuralSplatField>>,
    meshes: Query<Entity, With<MeshImport>>,
    mut deselect: EventWriter<DeselectEntity>,
    mut delete: EventWriter<DeleteEntity>,
    mut load_splat: EventWriter<LoadSplatVolume>,
    mut load_neural: EventWriter<LoadNeuralField>,
    mut import_mesh: EventWriter<ImportMesh>,
) {
    // Several loads in one frame would race their own deletes; keep the last.
    let Some(request) = requests.read().last() else {
        return;
    };

    let snapshot = match load_snapshot(store.0.as_ref(), &request.name) {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => {
            warn!("No snapshot named '{}'", request.name);
            return;
        }
        Err(e) => {
            error!("Failed to load snapshot '{}': {}", request.name, e);
            return;
        }
    };

    if snapshot.version != SNAPSHOT_VERSION {
        warn!(
            "Snapshot '{}' has version {}, expected {}",
            request.name, snapshot.version, SNAPSHOT_VERSION
        );
    }

    settings.capture = snapshot.capture.clone();
    settings.export_captions = snapshot.export_captions;

    if !orbit.capture_lock {
        orbit.set_from_pose(snapshot.camera.position, snapshot.camera.target);
    }

    for (light, mut transform) in &mut lights {
        if let Some(saved) = snapshot.lights.iter().find(|l| l.role == light.role) {
            adapter_for(EntityKind::Light(light.role))
                .write(&TransformFields::at(saved.position), &mut transform);
        }
    }

    deselect.write(DeselectEntity);

    match &snapshot.splat {
        Some(splat) => {
            load_splat.write(LoadSplatVolume {
                source: splat.source.clone(),
                fade_in: splat.fade_in,
                fields: Some(splat.fields),
            });
        }
        None => {
            for entity in &splats {
                delete.write(DeleteEntity { entity });
            }
        }
    }

    match &snapshot.neural {
        Some(field) => {
            load_neural.write(LoadNeuralField {
                source: field.source.clone(),
                particle_reveal: field.particle_reveal,
                fields: Some(field.fields),
            });
        }
        None => {
            for entity in &neural {
                delete.write(DeleteEntity { entity });
            }
        }
    }

    for entity in &meshes {
        delete.write(DeleteEntity { entity });
    }
    for mesh in &snapshot.meshes {
        import_mesh.write(ImportMesh {
            path: mesh.path.clone(),
            fields: Some(mesh.fields),
        });
    }

    info!(
        "✓ Restored snapshot '{}' saved {}",
        request.name,
        snapshot.saved_at.format("%Y-%m-%d %H:%M")
    );
}

pub fn delete_snapshots(mut requests: EventReader<DeleteSnapshot>, mut store: ResMut<SnapshotStore>) {
    for request in requests.read() {
        match delete_snapshot(store.0.as_mut(), &request.name) {
            Ok(()) => info!("Deleted snapshot '{}'", request.name),
            Err(e) => error!("Failed to delete snapshot '{}': {}", request.name, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::{EntityKind, Selectable, SplatFormat};

    fn app() -> App {
        let mut app = App::new();
        app.insert_resource(SnapshotStore(Box::new(MemoryConfigStore::default())))
            .init_resource::<CaptureSettings>()
            .init_resource::<OrbitCamera>()
            .add_event::<DeselectEntity>()
            .add_event::<DeleteEntity>()
            .add_event::<LoadSplatVolume>()
            .add_event::<LoadNeuralField>()
            .add_event::<ImportMesh>()
            .add_event::<SaveSnapshot>()
            .add_event::<LoadSnapshot>()
            .add_event::<DeleteSnapshot>()
            .add_systems(
                Update,
                (save_snapshots, load_snapshots, delete_snapshots).chain(),
            );
        app
    }

    fn sent<E: Event + Clone>(app: &App) -> Vec<E> {
        let events = app.world().resource::<Events<E>>();
        let mut cursor = events.get_cursor();
        cursor.read(events).cloned().collect()
    }

    fn spawn_scene(app: &mut App) -> Entity {
        let world = app.world_mut();
        world.spawn((
            StudioLight { role: LightRole::Fill },
            Transform::from_xyz(-3.0, 4.0, 5.0),
        ));
        world.spawn((
            SplatVolume {
                source: "garden.splat".to_string(),
                format: SplatFormat::Splat,
                fade_in: true,
            },
            Selectable {
                kind: EntityKind::SplatVolume,
            },
            Transform::from_xyz(0.0, 1.0, 0.0).with_scale(Vec3::new(-2.0, -2.0, 2.0)),
        ));
        for (id, x) in [(1, 2.0), (0, -2.0)] {
            world.spawn((
                MeshImport {
                    id,
                    name: format!("mesh{}", id),
                    path: format!("models/mesh{}.glb", id),
                },
                Transform::from_xyz(x, 0.0, 0.0),
            ));
        }
        world
            .spawn((
                NeuralSplatField {
                    source: "https://fields.example/scene".to_string(),
                    particle_reveal: false,
                },
                Transform::default(),
            ))
            .id()
    }

    #[test]
    fn save_records_scene_in_import_order() {
        let mut app = app();
        spawn_scene(&mut app);
        app.world_mut()
            .resource_mut::<CaptureSettings>()
            .capture
            .trigger_token = "ohwx".to_string();

        app.world_mut().send_event(SaveSnapshot {
            name: "studio".to_string(),
        });
        app.update();

        let store = app.world().resource::<SnapshotStore>();
        let snapshot = load_snapshot(store.0.as_ref(), "studio").unwrap().unwrap();

        assert_eq!(snapshot.capture.trigger_token, "ohwx");
        assert_eq!(snapshot.lights.len(), 1);
        assert_eq!(snapshot.lights[0].position, Vec3::new(-3.0, 4.0, 5.0));
        let splat = snapshot.splat.unwrap();
        assert_eq!(splat.source, "garden.splat");
        assert_eq!(splat.fields.scale, 2.0);
        let paths: Vec<&str> = snapshot.meshes.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["models/mesh0.glb", "models/mesh1.glb"]);
        assert!(snapshot.neural.is_some());
    }

    #[test]
    fn load_replays_entities_through_load_events() {
        let mut app = app();
        let neural = spawn_scene(&mut app);
        app.world_mut().send_event(SaveSnapshot {
            name: "studio".to_string(),
        });
        app.update();

        // Drop the neural field from the stored copy and change a setting.
        {
            let mut store = app.world_mut().resource_mut::<SnapshotStore>();
            let mut snapshot = load_snapshot(store.0.as_ref(), "studio").unwrap().unwrap();
            snapshot.neural = None;
            snapshot.export_captions = false;
            save_snapshot(store.0.as_mut(), "studio", &snapshot).unwrap();
        }

        app.world_mut().send_event(LoadSnapshot {
            name: "studio".to_string(),
        });
        app.update();

        assert!(!app.world().resource::<CaptureSettings>().export_captions);
        assert_eq!(sent::<DeselectEntity>(&app).len(), 1);

        let splats = sent::<LoadSplatVolume>(&app);
        assert_eq!(splats.len(), 1);
        assert_eq!(splats[0].fields.map(|f| f.scale), Some(2.0));

        let imports: Vec<String> = sent::<ImportMesh>(&app).into_iter().map(|m| m.path).collect();
        assert_eq!(imports, vec!["models/mesh0.glb", "models/mesh1.glb"]);

        // Two old meshes plus the neural field absent from the snapshot.
        let deleted: Vec<Entity> = sent::<DeleteEntity>(&app).into_iter().map(|d| d.entity).collect();
        assert_eq!(deleted.len(), 3);
        assert!(deleted.contains(&neural));
        assert!(sent::<LoadNeuralField>(&app).is_empty());
    }

    #[test]
    fn missing_snapshot_changes_nothing() {
        let mut app = app();
        app.world_mut().send_event(LoadSnapshot {
            name: "nope".to_string(),
        });
        app.update();

        assert!(sent::<DeselectEntity>(&app).is_empty());
        assert!(app.world().resource::<CaptureSettings>().export_captions);
    }

    #[test]
    fn delete_removes_from_listing() {
        let mut app = app();
        app.world_mut().send_event(SaveSnapshot {
            name: QUICK_SNAPSHOT_NAME.to_string(),
        });
        app.update();
        app.world_mut().send_event(DeleteSnapshot {
            name: QUICK_SNAPSHOT_NAME.to_string(),
        });
        app.update();

        let store = app.world().resource::<SnapshotStore>();
        assert!(list_snapshots(store.0.as_ref()).unwrap().is_empty());
    }
}
