use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy::window::PresentMode;
mod engine;
mod persistence;
mod tools;
use engine::{
    camera::{OrbitCamera, orbit_camera_controller, spawn_studio_camera},
    capture::CapturePlugin,
    gizmos::{draw_light_helpers, draw_manipulator, draw_selection_outline},
    loading::LoadingPlugin,
    scene::{LightHelperSettings, spawn_studio_lights},
};
use persistence::PersistencePlugin;
use tools::{selection::SelectionPlugin, shortcuts::handle_studio_shortcuts};

fn main() {
    let mut app = create_app();

    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(async move {
            app.run();
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.run();
    }
}

fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_resource::<OrbitCamera>()
        .init_resource::<LightHelperSettings>()
        .add_plugins((
            LoadingPlugin,
            CapturePlugin,
            SelectionPlugin,
            PersistencePlugin,
        ))
        .add_systems(Startup, (setup, spawn_studio_camera, spawn_studio_lights))
        .add_systems(
            Update,
            (
                handle_studio_shortcuts,
                orbit_camera_controller,
                draw_light_helpers,
                draw_selection_outline,
                draw_manipulator,
            ),
        );

    #[cfg(not(target_arch = "wasm32"))]
    {
        use engine::status_overlay::{spawn_status_overlay, update_status_overlay};
        app.add_systems(Startup, spawn_status_overlay)
            .add_systems(Update, update_status_overlay);
    }

    app
}

fn setup() {
    println!("=== SPLAT STUDIO ===");
    println!("  C capture | Esc cancel/deselect | X export dataset");
    println!("  W/E/R translate/rotate/scale | Del delete | H light helpers");
    println!("  F5 quick save | F9 quick load");
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}

fn create_window_config() -> Window {
    #[cfg(target_arch = "wasm32")]
    {
        Window {
            canvas: Some("#bevy".into()),
            fit_canvas_to_parent: true,
            prevent_default_event_handling: false,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Window {
            title: "Splat Studio".into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}
