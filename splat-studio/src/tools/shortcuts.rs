use crate::engine::capture::{
    CancelCaptureRequest, CaptureTask, ExportDatasetRequest, StartCaptureRequest,
};
use crate::engine::loading::DeleteEntity;
use crate::engine::scene::LightHelperSettings;
use crate::persistence::{LoadSnapshot, QUICK_SNAPSHOT_NAME, SaveSnapshot};
use crate::tools::selection::{DeselectEntity, SelectionState};
use bevy::prelude::*;

/// Studio keyboard shortcuts. Manipulator modes (W/E/R) live with the manipulator.
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_studio_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    capture_task: Res<CaptureTask>,
    selection: Res<SelectionState>,
    mut helper_settings: ResMut<LightHelperSettings>,
    mut start_capture: EventWriter<StartCaptureRequest>,
    mut cancel_capture: EventWriter<CancelCaptureRequest>,
    mut export: EventWriter<ExportDatasetRequest>,
    mut deselect: EventWriter<DeselectEntity>,
    mut delete: EventWriter<DeleteEntity>,
    mut save: EventWriter<SaveSnapshot>,
    mut load: EventWriter<LoadSnapshot>,
) {
    if keyboard.just_pressed(KeyCode::KeyC) {
        start_capture.write(StartCaptureRequest);
    }

    // Escape stops a running capture first, otherwise it drops the selection.
    if keyboard.just_pressed(KeyCode::Escape) {
        if capture_task.is_running() {
            cancel_capture.write(CancelCaptureRequest);
        } else {
            deselect.write(DeselectEntity);
        }
    }

    if keyboard.just_pressed(KeyCode::KeyX) {
        export.write(ExportDatasetRequest);
    }

    if keyboard.just_pressed(KeyCode::Delete) {
        if let Some(entity) = selection.selected() {
            delete.write(DeleteEntity { entity });
        }
    }

    if keyboard.just_pressed(KeyCode::KeyH) {
        helper_settings.visible = !helper_settings.visible;
        info!(
            "Light helpers {}",
            if helper_settings.visible { "shown" } else { "hidden" }
        );
    }

    if keyboard.just_pressed(KeyCode::F5) {
        save.write(SaveSnapshot {
            name: QUICK_SNAPSHOT_NAME.to_string(),
        });
    }

    if keyboard.just_pressed(KeyCode::F9) {
        load.write(LoadSnapshot {
            name: QUICK_SNAPSHOT_NAME.to_string(),
        });
    }
}

/// Placeholder system for WASM builds where the host page drives the studio.
#[cfg(target_arch = "wasm32")]
pub fn handle_studio_shortcuts() {}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    fn app() -> App {
        let mut app = App::new();
        app.init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<CaptureTask>()
            .init_resource::<SelectionState>()
            .init_resource::<LightHelperSettings>()
            .add_event::<StartCaptureRequest>()
            .add_event::<CancelCaptureRequest>()
            .add_event::<ExportDatasetRequest>()
            .add_event::<DeselectEntity>()
            .add_event::<DeleteEntity>()
            .add_event::<SaveSnapshot>()
            .add_event::<LoadSnapshot>()
            .add_systems(Update, handle_studio_shortcuts);
        app
    }

    fn press(app: &mut App, key: KeyCode) {
        let mut keyboard = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keyboard.clear();
        keyboard.press(key);
        app.update();
    }

    #[test]
    fn escape_deselects_when_idle() {
        let mut app = app();
        press(&mut app, KeyCode::Escape);

        assert_eq!(app.world().resource::<Events<DeselectEntity>>().len(), 1);
        assert!(app.world().resource::<Events<CancelCaptureRequest>>().is_empty());
    }

    #[test]
    fn helper_toggle_and_quick_save() {
        let mut app = app();
        press(&mut app, KeyCode::KeyH);
        assert!(!app.world().resource::<LightHelperSettings>().visible);

        press(&mut app, KeyCode::F5);
        let saves = app.world().resource::<Events<SaveSnapshot>>();
        let mut cursor = saves.get_cursor();
        let names: Vec<&str> = cursor.read(saves).map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec![QUICK_SNAPSHOT_NAME]);
    }
}
