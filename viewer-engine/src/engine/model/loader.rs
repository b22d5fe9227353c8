use bevy::asset::LoadState;
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;

use crate::engine::model::model_handle::{ModelLoadState, ModelSource, PlaceableModel};
use crate::rpc::web_rpc::WebRpcInterface;
use crate::xr::mode::{ModeState, ViewerMode};

/// Request to replace the displayed model.
#[derive(Event, Debug, Clone)]
pub struct LoadModelEvent {
    pub source: ModelSource,
}

/// Fired once when the current model instance finishes loading.
#[derive(Event, Debug, Default)]
pub struct ModelReadyEvent;

/// Fired at most once when the current model instance fails to load.
#[derive(Event, Debug, Clone)]
pub struct ModelLoadFailedEvent {
    pub error: String,
}

/// Marker for the model's scene entity.
#[derive(Component)]
pub struct ModelSceneRoot;

/// Tracks the live scene entity and handle so replacement stays exact
/// even when several load requests land in one tick.
#[derive(Resource, Default)]
pub struct ModelScene {
    pub entity: Option<Entity>,
    pub handle: Option<Handle<Scene>>,
    pub generation: u64,
}

/// Dispose the previous instance and spawn the replacement scene.
pub fn handle_load_requests(
    mut requests: EventReader<LoadModelEvent>,
    mode: Res<ModeState>,
    mut model: ResMut<PlaceableModel>,
    mut scene: ResMut<ModelScene>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
) {
    for request in requests.read() {
        if let Some(previous) = scene.entity.take() {
            commands.entity(previous).despawn();
        }

        let start_hidden = mode.mode == ViewerMode::Ar;
        let (generation, replaced) = model.begin_load(request.source.clone(), start_hidden);
        if let Some(old) = replaced {
            release_source(&old);
        }

        info!("loading model from {}", request.source.asset_path());
        let handle: Handle<Scene> = asset_server.load(
            GltfAssetLabel::Scene(0).from_asset(request.source.asset_path().to_string()),
        );

        let entity = commands
            .spawn((
                SceneRoot(handle.clone()),
                Transform::from_translation(model.position),
                if model.visible {
                    Visibility::Visible
                } else {
                    Visibility::Hidden
                },
                ModelSceneRoot,
                Name::new("placeable-model"),
            ))
            .id();

        scene.entity = Some(entity);
        scene.handle = Some(handle);
        scene.generation = generation;
    }
}

/// Poll the asset server for the pending load and deliver the ready or
/// failed notification. Only the live handle is polled, so results from
/// superseded instances can never arrive here.
pub fn poll_model_load_state(
    mut model: ResMut<PlaceableModel>,
    mut scene: ResMut<ModelScene>,
    asset_server: Res<AssetServer>,
    mut commands: Commands,
    mut ready_events: EventWriter<ModelReadyEvent>,
    mut failed_events: EventWriter<ModelLoadFailedEvent>,
    mut rpc: ResMut<WebRpcInterface>,
) {
    if model.load_state() != ModelLoadState::Loading {
        return;
    }
    let Some(handle) = scene.handle.clone() else {
        return;
    };

    match asset_server.load_state(handle.id()) {
        LoadState::Loaded => {
            if model.mark_ready(scene.generation) {
                info!("model ready");
                ready_events.write(ModelReadyEvent);
                rpc.send_notification("model_ready", serde_json::json!({}));
            }
        }
        LoadState::Failed(error) => {
            if model.mark_failed(scene.generation) {
                let error = error.to_string();
                warn!("model load failed: {error}");

                // Leave no half-initialized asset in the scene.
                if let Some(entity) = scene.entity.take() {
                    commands.entity(entity).despawn();
                }
                scene.handle = None;

                failed_events.write(ModelLoadFailedEvent {
                    error: error.clone(),
                });
                rpc.send_notification("model_load_failed", serde_json::json!({ "error": error }));
            }
        }
        _ => {}
    }
}

/// Push the model's authoritative transform and visibility onto its
/// scene entity.
pub fn sync_model_entity(
    model: Res<PlaceableModel>,
    mut query: Query<(&mut Transform, &mut Visibility), With<ModelSceneRoot>>,
) {
    for (mut transform, mut visibility) in &mut query {
        transform.translation = model.position;
        transform.rotation = model.orientation;
        transform.scale = model.scale;
        *visibility = if model.visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}

/// Release host-side resources backing a disposed source. Object URLs
/// minted for user-picked files are revoked on wasm; the asset handle
/// itself is dropped by the caller.
fn release_source(source: &ModelSource) {
    #[cfg(target_arch = "wasm32")]
    if let ModelSource::ObjectUrl(url) = source {
        if web_sys::Url::revoke_object_url(url).is_err() {
            warn!("failed to revoke object URL {url}");
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    let _ = source;
}
