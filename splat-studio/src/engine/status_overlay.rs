use crate::engine::capture::{CaptureProgressView, StudioCapture};
use crate::engine::scene::EntityKind;
use crate::tools::selection::{ControlPanel, ManipulatorMode, ManipulatorState};
use bevy::prelude::*;

#[derive(Component)]
pub struct StatusText;

fn mode_name(mode: ManipulatorMode) -> &'static str {
    match mode {
        ManipulatorMode::Translate => "translate",
        ManipulatorMode::Rotate => "rotate",
        ManipulatorMode::Scale => "scale",
    }
}

/// Overlay text: capture status, stored capture count and what is being edited.
pub fn status_text(
    status: &str,
    captures: usize,
    editing: Option<EntityKind>,
    mode: ManipulatorMode,
) -> String {
    let status = if status.is_empty() { "Ready" } else { status };
    let editing = match editing {
        Some(kind) => format!("Editing {} ({})", kind.label(), mode_name(mode)),
        None => "Nothing selected".to_string(),
    };
    format!("{}\nCaptures: {}\n{}", status, captures, editing)
}

pub fn spawn_status_overlay(mut commands: Commands) {
    commands.spawn((
        Text::new(status_text("", 0, None, ManipulatorMode::default())),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(Color::srgb(0.9, 0.9, 0.9)),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
        StatusText,
    ));
}

pub fn update_status_overlay(
    capture: Res<StudioCapture>,
    progress: Res<CaptureProgressView>,
    panel: Res<ControlPanel>,
    manipulator: Res<ManipulatorState>,
    mut query: Query<&mut Text, With<StatusText>>,
) {
    let text = {
        let session = capture.scheduler.session();
        let status = progress
            .progress
            .as_ref()
            .filter(|_| session.is_active())
            .map(|p| p.status.as_str())
            .unwrap_or_else(|| session.status());
        status_text(status, session.len(), panel.editing(), manipulator.mode)
    };

    for mut line in &mut query {
        if line.0 != text {
            line.0 = text.clone();
        }
    }
}
