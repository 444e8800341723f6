//! Scene entities shared by loading, selection and capture.
//!
//! Every selectable root carries a [`Selectable`] component naming its
//! [`EntityKind`]. Per-kind transform conventions live behind the
//! [`EntityAdapter`] trait so the rest of the application reads and writes
//! transforms through one interface.
//!
//! ```text
//! SplatVolume ──────┐
//! NeuralSplatField ─┤
//! MeshImport(id) ───┼─> Selectable { kind } ──> adapter_for(kind) ──> TransformFields
//! Light(role) ──────┘        ▲
//!   └─ LightHelper (child) ──┘ picks resolve to the owning light
//! ```

/// Per-kind transform adapters and panel transform fields.
pub mod adapters;

/// Entity kinds, marker components and pick bounds.
pub mod entities;

/// Key, fill and back lights with pickable helpers.
pub mod lighting;

pub use adapters::{EntityAdapter, TransformFields, adapter_for};
pub use entities::{
    EntityKind, LightHelper, LightRole, MeshImport, NeuralSplatField, PickBounds, Selectable,
    SplatFormat, SplatVolume, StudioLight,
};
pub use lighting::{LightHelperSettings, spawn_studio_lights};
