use super::requests::LoadSplatVolume;
use crate::engine::capture::CaptureSettings;
use crate::engine::scene::LightHelperSettings;
use bevy::prelude::*;
use constants::capture::DEFAULT_EXPORT_DIR;
use constants::pose_grid::DEFAULT_EXPORT_CAPTIONS;
use lora_capture::CaptureConfig;
use serde::Deserialize;

pub const STUDIO_SETTINGS_PATH: &str = "studio_settings.json";

/// Startup configuration read from the assets folder. Missing keys fall back
/// to the compiled defaults.
#[derive(Asset, TypePath, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StudioSettings {
    pub capture: CaptureConfig,
    pub export_captions: bool,
    pub export_dir: String,
    pub light_helpers_visible: bool,
    /// Splat volume loaded once the settings arrive.
    pub startup_splat: Option<String>,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            export_captions: DEFAULT_EXPORT_CAPTIONS,
            export_dir: DEFAULT_EXPORT_DIR.to_string(),
            light_helpers_visible: true,
            startup_splat: None,
        }
    }
}

impl StudioSettings {
    pub fn apply(&self, capture: &mut CaptureSettings, helpers: &mut LightHelperSettings) {
        capture.capture = self.capture.clone();
        capture.export_captions = self.export_captions;
        capture.export_dir = self.export_dir.clone();
        helpers.visible = self.light_helpers_visible;
    }
}

#[derive(Resource, Default)]
pub struct SettingsLoader {
    handle: Option<Handle<StudioSettings>>,
    loaded: bool,
}

pub fn start_settings_load(mut loader: ResMut<SettingsLoader>, asset_server: Res<AssetServer>) {
    println!("Loading studio settings from: {}", STUDIO_SETTINGS_PATH);
    loader.handle = Some(asset_server.load(STUDIO_SETTINGS_PATH));
}

/// Applies the settings once. A failed load keeps the compiled defaults.
pub fn apply_studio_settings(
    mut loader: ResMut<SettingsLoader>,
    asset_server: Res<AssetServer>,
    settings_assets: Res<Assets<StudioSettings>>,
    mut capture: ResMut<CaptureSettings>,
    mut helpers: ResMut<LightHelperSettings>,
    mut load_splat: EventWriter<LoadSplatVolume>,
) {
    if loader.loaded {
        return;
    }
    let Some(handle) = loader.handle.clone() else {
        return;
    };

    if let Some(settings) = settings_assets.get(&handle) {
        settings.apply(&mut capture, &mut helpers);
        if let Some(source) = &settings.startup_splat {
            load_splat.write(LoadSplatVolume {
                source: source.clone(),
                fade_in: true,
                fields: None,
            });
        }
        loader.loaded = true;
        println!("✓ Studio settings loaded");
    } else if asset_server.load_state(&handle).is_failed() {
        warn!("Studio settings unavailable, using defaults");
        loader.loaded = true;
    }
}
