//! Unified selection of scene entities and the transform manipulator.
//!
//! Every selectable kind goes through one state machine. Picking, the
//! keyboard and asset loading only send [`SelectEntity`] / [`DeselectEntity`];
//! the coordinator owns the transitions and keeps the control panel in sync
//! with whatever the manipulator is attached to.
//!
//! ```text
//!            select(e)              select(e2)
//!   Idle ────────────────► Selected(e) ───────────► Selected(e2)
//!    ▲                        │                        (e detached first)
//!    └── deselect / select(e) ┘
//! ```

/// Select/deselect events, target resolution and panel synchronisation.
pub mod coordinator;

/// Manipulator modes, handle picking and drag math.
pub mod manipulator;

/// Control panel model: fields, sections and affordance labels.
pub mod panel;

/// Click detection and ray picking.
pub mod picking;

/// Ray intersection helpers.
pub mod ray;

/// The Idle/Selected state machine.
pub mod state;

use crate::engine::camera::orbit_camera_controller;
use bevy::prelude::*;

pub use coordinator::{DeselectEntity, PanelEdit, SelectEntity};
pub use manipulator::{Manipulator, ManipulatorMode, ManipulatorState};
pub use panel::{ControlPanel, MaterialFields, PanelSection};
pub use picking::PointerState;
pub use state::{SelectionChange, SelectionState};

pub struct SelectionPlugin;

impl Plugin for SelectionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SelectionState>()
            .init_resource::<ControlPanel>()
            .init_resource::<ManipulatorState>()
            .init_resource::<PointerState>()
            .add_event::<SelectEntity>()
            .add_event::<DeselectEntity>()
            .add_event::<PanelEdit>()
            .add_systems(
                Update,
                (
                    manipulator::switch_manipulator_mode,
                    manipulator::begin_manipulator_drag,
                    picking::pick_on_click,
                    manipulator::update_manipulator_drag,
                    coordinator::select_imported_meshes,
                    coordinator::apply_selection_requests,
                    coordinator::release_despawned_selection,
                    coordinator::apply_panel_edits,
                    coordinator::sync_panel_from_manipulator,
                )
                    .chain()
                    .before(orbit_camera_controller),
            );
    }
}
