use bevy::asset::LoadState;
use bevy::prelude::*;
use serde::Deserialize;

use constants::placement::{DEFAULT_MODEL_URL, VIEWER_CONFIG_PATH};

use crate::engine::model::{LoadModelEvent, ModelSource};
use crate::xr::placement::{PlacementPolicy, PlacementSettings};

/// Viewer configuration, loaded from a JSON asset at startup.
#[derive(Deserialize, Asset, TypePath, Clone, Debug)]
pub struct ViewerConfig {
    pub default_model_url: String,
    #[serde(default)]
    pub placement_policy: PlacementPolicy,
}

#[derive(Resource, Default)]
pub struct ConfigLoader {
    handle: Option<Handle<ViewerConfig>>,
    applied: bool,
}

/// Start loading the viewer config.
pub fn start_config_loading(mut loader: ResMut<ConfigLoader>, asset_server: Res<AssetServer>) {
    loader.handle = Some(asset_server.load(VIEWER_CONFIG_PATH));
}

/// Apply the config once loaded and kick off the initial model load.
/// A missing config falls back to the built-in defaults.
pub fn apply_viewer_config(
    mut loader: ResMut<ConfigLoader>,
    configs: Res<Assets<ViewerConfig>>,
    asset_server: Res<AssetServer>,
    mut settings: ResMut<PlacementSettings>,
    mut load_requests: EventWriter<LoadModelEvent>,
) {
    if loader.applied {
        return;
    }
    let Some(handle) = loader.handle.clone() else {
        return;
    };

    if let Some(config) = configs.get(&handle) {
        println!("✓ Viewer config loaded");
        settings.policy = config.placement_policy;
        load_requests.write(LoadModelEvent {
            source: ModelSource::Url(config.default_model_url.clone()),
        });
        loader.applied = true;
    } else if matches!(asset_server.load_state(handle.id()), LoadState::Failed(_)) {
        warn!("viewer config missing, using built-in defaults");
        load_requests.write(LoadModelEvent {
            source: ModelSource::Url(DEFAULT_MODEL_URL.to_string()),
        });
        loader.applied = true;
    }
}
