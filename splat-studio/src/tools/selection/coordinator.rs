use super::manipulator::Manipulator;
use super::panel::{ControlPanel, MaterialFields};
use super::state::{SelectionChange, SelectionState};
use crate::engine::loading::MeshImported;
use crate::engine::scene::{
    EntityAdapter, LightHelper, MeshImport, Selectable, TransformFields, adapter_for,
};
use bevy::prelude::*;

/// Selects an entity, or toggles it off if it is already selected. Picked
/// children and light helpers resolve to the selectable that owns them.
#[derive(Event, Debug, Clone, Copy)]
pub struct SelectEntity {
    pub entity: Entity,
}

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct DeselectEntity;

/// A committed control panel edit.
#[derive(Event, Debug, Clone, Copy)]
pub enum PanelEdit {
    Transform {
        entity: Entity,
        fields: TransformFields,
    },
    Material {
        entity: Entity,
        material: MaterialFields,
    },
}

/// Topmost selectable at or above `hit`. Helpers resolve to their light.
pub fn resolve_target(
    hit: Entity,
    helpers: &Query<&LightHelper>,
    selectables: &Query<&Selectable>,
    parents: &Query<&ChildOf>,
) -> Option<Entity> {
    if let Ok(helper) = helpers.get(hit) {
        return selectables.contains(helper.light).then_some(helper.light);
    }

    std::iter::once(hit)
        .chain(parents.iter_ancestors(hit))
        .filter(|entity| selectables.contains(*entity))
        .last()
}

fn sample_material(
    root: Entity,
    children: &Query<&Children>,
    handles: &Query<&MeshMaterial3d<StandardMaterial>>,
    materials: &Assets<StandardMaterial>,
) -> Option<MaterialFields> {
    std::iter::once(root)
        .chain(children.iter_descendants(root))
        .filter_map(|entity| handles.get(entity).ok())
        .find_map(|handle| materials.get(&handle.0))
        .map(MaterialFields::from_material)
}

/// Runs select and deselect requests through the selection state machine,
/// moving the manipulator and refreshing the panel on every transition.
pub fn apply_selection_requests(
    mut commands: Commands,
    mut selects: EventReader<SelectEntity>,
    mut deselects: EventReader<DeselectEntity>,
    mut state: ResMut<SelectionState>,
    mut panel: ResMut<ControlPanel>,
    entities: Query<(&Selectable, &Transform, Option<&MeshImport>)>,
    helpers: Query<&LightHelper>,
    selectables: Query<&Selectable>,
    parents: Query<&ChildOf>,
    children: Query<&Children>,
    handles: Query<&MeshMaterial3d<StandardMaterial>>,
    materials: Res<Assets<StandardMaterial>>,
) {
    let mut changes = Vec::new();

    if deselects.read().count() > 0 {
        changes.push(state.deselect());
    }

    // A hit with no selectable owner counts as a click on empty space.
    for request in selects.read() {
        let Some(target) = resolve_target(request.entity, &helpers, &selectables, &parents)
        else {
            debug!("Entity {:?} is not selectable, deselecting", request.entity);
            changes.push(state.deselect());
            continue;
        };
        changes.push(state.select(target));
    }

    for change in changes {
        match change {
            SelectionChange::Selected(entity) => {
                attach(&mut commands, &mut panel, entity, &entities, &children, &handles, &materials)
            }
            SelectionChange::Deselected(entity) => {
                detach(&mut commands, &mut panel, entity, &entities)
            }
            SelectionChange::Switched { from, to } => {
                detach(&mut commands, &mut panel, from, &entities);
                attach(&mut commands, &mut panel, to, &entities, &children, &handles, &materials);
            }
            SelectionChange::Unchanged => {}
        }
    }
}

fn attach(
    commands: &mut Commands,
    panel: &mut ControlPanel,
    entity: Entity,
    entities: &Query<(&Selectable, &Transform, Option<&MeshImport>)>,
    children: &Query<&Children>,
    handles: &Query<&MeshMaterial3d<StandardMaterial>>,
    materials: &Assets<StandardMaterial>,
) {
    let Ok((selectable, transform, mesh)) = entities.get(entity) else {
        return;
    };
    let kind = selectable.kind;

    let material = mesh.and_then(|_| sample_material(entity, children, handles, materials));
    panel.begin_editing(
        kind,
        adapter_for(kind).read(transform),
        material,
        mesh.map(|m| m.name.as_str()),
    );

    commands.entity(entity).insert(Manipulator);
    info!("Selected {}", kind.label());
}

fn detach(
    commands: &mut Commands,
    panel: &mut ControlPanel,
    entity: Entity,
    entities: &Query<(&Selectable, &Transform, Option<&MeshImport>)>,
) {
    let kind = match entities.get(entity) {
        Ok((selectable, _, _)) => Some(selectable.kind),
        Err(_) => panel.editing(),
    };
    if let Some(kind) = kind {
        panel.end_editing(kind);
    }

    if let Ok(mut entity_commands) = commands.get_entity(entity) {
        entity_commands.remove::<Manipulator>();
    }
}

/// Returns to idle when the selected entity is despawned.
pub fn release_despawned_selection(
    mut removed: RemovedComponents<Selectable>,
    mut state: ResMut<SelectionState>,
    mut panel: ResMut<ControlPanel>,
) {
    for entity in removed.read() {
        if let SelectionChange::Deselected(_) = state.on_despawned(entity) {
            if let Some(kind) = panel.editing() {
                panel.end_editing(kind);
                panel.forget(kind);
            }
            info!("Selected entity removed, selection cleared");
        }
    }
}

pub fn select_imported_meshes(
    mut imported: EventReader<MeshImported>,
    state: Res<SelectionState>,
    mut selects: EventWriter<SelectEntity>,
) {
    // Only the newest import is selected; selecting it twice would toggle it off.
    let Some(last) = imported.read().last() else {
        return;
    };
    if !state.is_selected(last.entity) {
        selects.write(SelectEntity {
            entity: last.entity,
        });
    }
}

/// Manipulator drags flow back into the panel.
pub fn sync_panel_from_manipulator(
    moved: Query<(&Selectable, &Transform), (With<Manipulator>, Changed<Transform>)>,
    mut panel: ResMut<ControlPanel>,
) {
    for (selectable, transform) in &moved {
        let kind = selectable.kind;
        panel.sync_fields(kind, adapter_for(kind).read(transform));
    }
}

/// Panel commits flow into the entity through its kind's adapter.
pub fn apply_panel_edits(
    mut edits: EventReader<PanelEdit>,
    mut entities: Query<(&Selectable, &mut Transform)>,
    children: Query<&Children>,
    handles: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut panel: ResMut<ControlPanel>,
) {
    for edit in edits.read() {
        match *edit {
            PanelEdit::Transform { entity, fields } => {
                let Ok((selectable, mut transform)) = entities.get_mut(entity) else {
                    warn!("Panel edit for missing entity {:?}", entity);
                    continue;
                };
                let adapter = adapter_for(selectable.kind);
                adapter.write(&fields, &mut transform);
                panel.sync_fields(selectable.kind, adapter.read(&transform));
            }
            PanelEdit::Material { entity, material } => {
                let targets: Vec<Handle<StandardMaterial>> = std::iter::once(entity)
                    .chain(children.iter_descendants(entity))
                    .filter_map(|e| handles.get(e).ok())
                    .map(|handle| handle.0.clone())
                    .collect();

                for handle in targets {
                    if let Some(existing) = materials.get_mut(&handle) {
                        material.apply(existing);
                    }
                }
                panel.material = material;
            }
        }
    }
}
