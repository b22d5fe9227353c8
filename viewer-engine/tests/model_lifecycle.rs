//! Integration tests for the single-live-model guarantee, driven with a
//! stub scene loader that never resolves so load state stays deterministic.

use bevy::asset::io::Reader;
use bevy::asset::{AssetLoader, AssetMetaCheck, AssetPlugin, LoadContext};
use bevy::prelude::*;

use viewer_engine::engine::model::{
    LoadModelEvent, ModelLoadState, ModelPlugin, ModelScene, ModelSceneRoot, ModelSource,
    PlaceableModel,
};
use viewer_engine::xr::XrPlacementPlugin;

/// Pretends to load a scene but never completes, keeping every load in
/// the `Loading` state for as long as the test runs.
struct PendingSceneLoader;

impl AssetLoader for PendingSceneLoader {
    type Asset = Scene;
    type Settings = ();
    type Error = std::io::Error;

    async fn load(
        &self,
        _reader: &mut dyn Reader,
        _settings: &(),
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Scene, Self::Error> {
        std::future::pending().await
    }

    fn extensions(&self) -> &[&str] {
        &["glb"]
    }
}

fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(AssetPlugin {
        file_path: "tests/fixtures".to_string(),
        meta_check: AssetMetaCheck::Never,
        ..default()
    });
    app.init_asset::<Scene>();
    app.register_asset_loader(PendingSceneLoader);
    app.add_plugins(XrPlacementPlugin);
    app.add_plugins(ModelPlugin);
    app
}

fn load_model(app: &mut App, path: &str) {
    app.world_mut().send_event(LoadModelEvent {
        source: ModelSource::Url(path.to_string()),
    });
    app.update();
}

fn scene_root_entities(app: &mut App) -> Vec<Entity> {
    let world = app.world_mut();
    let mut query = world.query_filtered::<Entity, With<ModelSceneRoot>>();
    query.iter(world).collect()
}

#[test]
fn exactly_one_model_instance_survives_any_load_sequence() {
    let mut app = test_app();
    app.update();

    load_model(&mut app, "cube.glb");
    let first = scene_root_entities(&mut app);
    assert_eq!(first.len(), 1);

    load_model(&mut app, "sphere.glb");
    load_model(&mut app, "cube.glb");
    let survivors = scene_root_entities(&mut app);
    assert_eq!(survivors.len(), 1);

    // The original instance was disposed, not just hidden.
    assert!(app.world().get_entity(first[0]).is_err());

    let model = app.world().resource::<PlaceableModel>();
    assert_eq!(model.generation(), 3);
    assert_eq!(model.load_state(), ModelLoadState::Loading);
}

#[test]
fn two_loads_in_one_tick_leave_a_single_instance() {
    let mut app = test_app();
    app.update();

    app.world_mut().send_event(LoadModelEvent {
        source: ModelSource::Url("cube.glb".to_string()),
    });
    app.world_mut().send_event(LoadModelEvent {
        source: ModelSource::Url("sphere.glb".to_string()),
    });
    app.update();

    assert_eq!(scene_root_entities(&mut app).len(), 1);
    assert_eq!(
        app.world().resource::<PlaceableModel>().source(),
        Some(&ModelSource::Url("sphere.glb".to_string()))
    );
}

#[test]
fn replacement_inherits_the_current_mode_visibility() {
    let mut app = test_app();
    app.update();

    app.world_mut()
        .send_event(viewer_engine::xr::session::XrSessionStarted);
    app.update();

    load_model(&mut app, "cube.glb");
    let model = app.world().resource::<PlaceableModel>();
    assert!(!model.visible, "a load during AR starts hidden");

    let scene = app.world().resource::<ModelScene>();
    assert!(scene.entity.is_some());
    assert!(scene.handle.is_some());
}
