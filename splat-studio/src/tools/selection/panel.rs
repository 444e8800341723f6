use crate::engine::scene::{EntityKind, LightRole, TransformFields};
use bevy::prelude::*;
use std::collections::{HashMap, HashSet};

pub const SELECTED_LABEL: &str = "— Selected —";
pub const EDITING_LABEL: &str = "— Editing —";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelSection {
    SplatTransform,
    NeuralTransform,
    MeshTransform,
    MeshMaterial,
    Lights,
}

impl PanelSection {
    pub fn for_kind(kind: EntityKind) -> &'static [PanelSection] {
        match kind {
            EntityKind::SplatVolume => &[PanelSection::SplatTransform],
            EntityKind::NeuralSplatField => &[PanelSection::NeuralTransform],
            EntityKind::MeshImport(_) => &[PanelSection::MeshTransform, PanelSection::MeshMaterial],
            EntityKind::Light(_) => &[PanelSection::Lights],
        }
    }
}

/// PBR fields shown for a selected mesh import.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialFields {
    pub metalness: f32,
    pub roughness: f32,
    /// Emissive hue, normalised so its largest channel is 1.
    pub emissive: Vec3,
    pub emissive_intensity: f32,
    pub env_intensity: f32,
}

impl Default for MaterialFields {
    fn default() -> Self {
        Self {
            metalness: 0.0,
            roughness: 0.5,
            emissive: Vec3::ZERO,
            emissive_intensity: 0.0,
            env_intensity: 1.0,
        }
    }
}

impl MaterialFields {
    pub fn from_material(material: &StandardMaterial) -> Self {
        let e = material.emissive;
        let intensity = e.red.max(e.green).max(e.blue);
        let emissive = if intensity > 0.0 {
            Vec3::new(e.red, e.green, e.blue) / intensity
        } else {
            Vec3::ZERO
        };

        Self {
            metalness: material.metallic,
            roughness: material.perceptual_roughness,
            emissive,
            emissive_intensity: intensity,
            env_intensity: material.reflectance * 2.0,
        }
    }

    pub fn apply(&self, material: &mut StandardMaterial) {
        let emissive = self.emissive * self.emissive_intensity;
        material.metallic = self.metalness.clamp(0.0, 1.0);
        material.perceptual_roughness = self.roughness.clamp(0.0, 1.0);
        material.emissive = LinearRgba::rgb(emissive.x, emissive.y, emissive.z);
        material.reflectance = (self.env_intensity * 0.5).clamp(0.0, 1.0);
    }
}

/// Model behind the control panel: the values it shows, which sections are
/// open, and the text of each kind's select affordance.
#[derive(Resource, Debug, Clone)]
pub struct ControlPanel {
    pub splat: TransformFields,
    pub neural: TransformFields,
    pub mesh: TransformFields,
    pub material: MaterialFields,
    pub lights: HashMap<LightRole, Vec3>,
    open_sections: HashSet<PanelSection>,
    labels: HashMap<EntityKind, String>,
    previous_labels: HashMap<EntityKind, String>,
    editing: Option<EntityKind>,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            splat: TransformFields::default(),
            neural: TransformFields::default(),
            mesh: TransformFields::default(),
            material: MaterialFields::default(),
            lights: LightRole::ALL
                .iter()
                .map(|role| (*role, role.default_position()))
                .collect(),
            open_sections: HashSet::new(),
            labels: HashMap::new(),
            previous_labels: HashMap::new(),
            editing: None,
        }
    }
}

pub fn default_label(kind: EntityKind, mesh_name: Option<&str>) -> String {
    match kind {
        EntityKind::SplatVolume => "Edit Splat".to_string(),
        EntityKind::NeuralSplatField => "Edit Neural Field".to_string(),
        EntityKind::MeshImport(id) => match mesh_name {
            Some(name) => format!("Select {}", name),
            None => format!("Select glb-{}", id),
        },
        EntityKind::Light(_) => "Edit Position".to_string(),
    }
}

fn editing_label(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::MeshImport(_) => SELECTED_LABEL,
        _ => EDITING_LABEL,
    }
}

impl ControlPanel {
    pub fn editing(&self) -> Option<EntityKind> {
        self.editing
    }

    pub fn is_open(&self, section: PanelSection) -> bool {
        self.open_sections.contains(&section)
    }

    pub fn label(&self, kind: EntityKind, mesh_name: Option<&str>) -> String {
        self.labels
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| default_label(kind, mesh_name))
    }

    pub fn fields(&self, kind: EntityKind) -> TransformFields {
        match kind {
            EntityKind::SplatVolume => self.splat,
            EntityKind::NeuralSplatField => self.neural,
            EntityKind::MeshImport(_) => self.mesh,
            EntityKind::Light(role) => {
                TransformFields::at(self.lights.get(&role).copied().unwrap_or_default())
            }
        }
    }

    /// Mirrors a live transform into the fields of its kind.
    pub fn sync_fields(&mut self, kind: EntityKind, fields: TransformFields) {
        match kind {
            EntityKind::SplatVolume => self.splat = fields,
            EntityKind::NeuralSplatField => self.neural = fields,
            EntityKind::MeshImport(_) => self.mesh = fields,
            EntityKind::Light(role) => {
                self.lights.insert(role, fields.position);
            }
        }
    }

    pub fn begin_editing(
        &mut self,
        kind: EntityKind,
        fields: TransformFields,
        material: Option<MaterialFields>,
        mesh_name: Option<&str>,
    ) {
        self.sync_fields(kind, fields);
        if let Some(material) = material {
            self.material = material;
        }

        self.open_sections
            .extend(PanelSection::for_kind(kind).iter().copied());

        let previous = self.label(kind, mesh_name);
        self.previous_labels.insert(kind, previous);
        self.labels.insert(kind, editing_label(kind).to_string());
        self.editing = Some(kind);
    }

    /// Restores the label the kind had before editing began and resets the
    /// fields that only make sense while something is selected.
    pub fn end_editing(&mut self, kind: EntityKind) {
        match self.previous_labels.remove(&kind) {
            Some(previous) => {
                self.labels.insert(kind, previous);
            }
            None => {
                self.labels.remove(&kind);
            }
        }

        for section in PanelSection::for_kind(kind) {
            self.open_sections.remove(section);
        }

        if matches!(kind, EntityKind::MeshImport(_)) {
            self.mesh = TransformFields::default();
            self.material = MaterialFields::default();
        }

        if self.editing == Some(kind) {
            self.editing = None;
        }
    }

    /// Forgets a kind whose entity is gone.
    pub fn forget(&mut self, kind: EntityKind) {
        self.labels.remove(&kind);
        self.previous_labels.remove(&kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_relabels_and_restores() {
        let mut panel = ControlPanel::default();
        let kind = EntityKind::MeshImport(2);

        assert_eq!(panel.label(kind, Some("chair")), "Select chair");
        panel.begin_editing(kind, TransformFields::at(Vec3::X), None, Some("chair"));
        assert_eq!(panel.label(kind, Some("chair")), SELECTED_LABEL);
        assert!(panel.is_open(PanelSection::MeshTransform));
        assert!(panel.is_open(PanelSection::MeshMaterial));
        assert_eq!(panel.mesh.position, Vec3::X);

        panel.end_editing(kind);
        assert_eq!(panel.label(kind, Some("chair")), "Select chair");
        assert!(!panel.is_open(PanelSection::MeshTransform));
        assert_eq!(panel.mesh, TransformFields::default());
        assert_eq!(panel.editing(), None);
    }

    #[test]
    fn non_mesh_kinds_show_editing_indicator() {
        let mut panel = ControlPanel::default();
        panel.begin_editing(EntityKind::SplatVolume, TransformFields::default(), None, None);
        assert_eq!(panel.label(EntityKind::SplatVolume, None), EDITING_LABEL);

        panel.end_editing(EntityKind::SplatVolume);
        assert_eq!(panel.label(EntityKind::SplatVolume, None), "Edit Splat");
    }

    #[test]
    fn light_fields_track_position_only() {
        let mut panel = ControlPanel::default();
        let kind = EntityKind::Light(LightRole::Back);
        assert_eq!(panel.fields(kind).position, Vec3::new(-5.0, 10.0, -15.0));

        panel.sync_fields(
            kind,
            TransformFields {
                position: Vec3::new(1.0, 2.0, 3.0),
                rotation_deg: Vec3::splat(45.0),
                scale: 4.0,
            },
        );
        assert_eq!(panel.fields(kind), TransformFields::at(Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn material_round_trip() {
        let mut material = StandardMaterial {
            metallic: 0.8,
            perceptual_roughness: 0.3,
            emissive: LinearRgba::rgb(2.0, 1.0, 0.0),
            reflectance: 0.25,
            ..default()
        };

        let fields = MaterialFields::from_material(&material);
        assert_eq!(fields.emissive_intensity, 2.0);
        assert_eq!(fields.emissive, Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(fields.env_intensity, 0.5);

        let edited = MaterialFields {
            roughness: 0.9,
            ..fields
        };
        edited.apply(&mut material);
        assert_eq!(material.perceptual_roughness, 0.9);
        assert_eq!(material.emissive, LinearRgba::rgb(2.0, 1.0, 0.0));
        assert_eq!(material.reflectance, 0.25);
    }
}
