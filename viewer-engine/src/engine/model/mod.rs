//! The placeable model: one live instance, disposed before replacement,
//! with generation-guarded asynchronous load notifications.

/// Scene spawning, load-state polling, and entity sync.
pub mod loader;

/// The model resource and its state transitions.
pub mod model_handle;

use bevy::prelude::*;

pub use loader::{LoadModelEvent, ModelLoadFailedEvent, ModelReadyEvent, ModelScene, ModelSceneRoot};
pub use model_handle::{ModelLoadState, ModelSource, PlaceableModel};

use crate::xr::XrCoreSet;
use loader::{handle_load_requests, poll_model_load_state, sync_model_entity};

/// Registers the asset-server-backed model pipeline. Runs after the AR
/// core so that same-frame mode transitions and placement commits are
/// reflected in what gets spawned and synced.
pub struct ModelPlugin;

impl Plugin for ModelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelScene>()
            .add_event::<LoadModelEvent>()
            .add_event::<ModelReadyEvent>()
            .add_event::<ModelLoadFailedEvent>()
            .add_systems(
                Update,
                (handle_load_requests, poll_model_load_state, sync_model_entity)
                    .chain()
                    .after(XrCoreSet),
            );
    }
}
