use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::model::PlaceableModel;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::xr::mode::{ModeState, ViewerMode};
use crate::xr::reticle::Reticle;

/// User "select" input, fired by the XR host while an AR session runs.
#[derive(Event, Debug, Default)]
pub struct XrSelectEvent;

/// What a placement commit copies from the reticle.
///
/// `PositionOnly` keeps the model upright and is the default; `FullPose`
/// also adopts the surface orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPolicy {
    #[default]
    PositionOnly,
    FullPose,
}

#[derive(Resource, Debug, Default)]
pub struct PlacementSettings {
    pub policy: PlacementPolicy,
}

/// Commit the reticle's pose to the model on select.
///
/// A select with a hidden reticle, an unloaded model, or outside AR mode
/// is an expected silent no-op, not an error.
pub fn handle_select(
    mut selects: EventReader<XrSelectEvent>,
    mode: Res<ModeState>,
    settings: Res<PlacementSettings>,
    reticle: Res<Reticle>,
    mut model: ResMut<PlaceableModel>,
    mut rpc: ResMut<WebRpcInterface>,
) {
    for _ in selects.read() {
        if mode.mode != ViewerMode::Ar {
            continue;
        }
        if !reticle.visible || !model.is_placeable() {
            continue;
        }

        model.visible = true;
        model.position = reticle.position;
        if settings.policy == PlacementPolicy::FullPose {
            model.orientation = reticle.orientation;
        }

        info!("model placed at {:?}", model.position);
        rpc.send_notification(
            "placement_committed",
            serde_json::json!({
                "position": [model.position.x, model.position.y, model.position.z],
            }),
        );
    }
}
