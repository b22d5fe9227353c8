use bevy::prelude::*;

use crate::engine::camera::OrbitCamera;
use crate::engine::model::PlaceableModel;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::xr::hit_test::HitTestState;
use crate::xr::reticle::Reticle;
use crate::xr::session::{XrSessionEnded, XrSessionStarted, XrSessionState};

/// The two viewing modes. Inspection uses the orbit camera with the model
/// always visible; AR hides the model until the user places it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerMode {
    #[default]
    Inspection,
    Ar,
}

impl ViewerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inspection => "inspection",
            Self::Ar => "ar",
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct ModeState {
    pub mode: ViewerMode,
}

/// Top-level state machine reacting to session lifecycle notifications.
///
/// Every AR exit runs the full reset regardless of prior state, so a
/// duplicate session-end notification leaves state bit-identical.
pub fn handle_session_transitions(
    mut started: EventReader<XrSessionStarted>,
    mut ended: EventReader<XrSessionEnded>,
    mut mode: ResMut<ModeState>,
    mut sessions: ResMut<XrSessionState>,
    mut hit_test: ResMut<HitTestState>,
    mut reticle: ResMut<Reticle>,
    mut model: ResMut<PlaceableModel>,
    mut orbit: ResMut<OrbitCamera>,
    mut rpc: ResMut<WebRpcInterface>,
) {
    for _ in started.read() {
        let session = sessions.begin();
        mode.mode = ViewerMode::Ar;
        orbit.enabled = false;
        // Hidden until placed; position and scale are left untouched and
        // get overwritten on a successful placement commit.
        model.visible = false;

        info!("AR session {} started, entering AR mode", session.value());
        rpc.send_notification(
            "mode_changed",
            serde_json::json!({ "mode": mode.mode.as_str() }),
        );
    }

    for _ in ended.read() {
        let was_ar = mode.mode == ViewerMode::Ar;

        sessions.end();
        mode.mode = ViewerMode::Inspection;
        orbit.enabled = true;
        model.visible = true;
        model.reset_transform();
        // Clears a stored source and a still-pending request alike.
        hit_test.clear();
        reticle.hide();

        if was_ar {
            info!("AR session ended, back to inspection mode");
            rpc.send_notification(
                "mode_changed",
                serde_json::json!({ "mode": mode.mode.as_str() }),
            );
        }
    }
}
