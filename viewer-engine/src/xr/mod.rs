//! The AR placement core: session lifecycle, asynchronous hit-test
//! acquisition, per-frame surface sampling, placement commit, and the
//! mode coordinator that resets AR state on every transition.
//!
//! ## Frame pipeline
//!
//! ```text
//! XrFrameEvent (host)
//!   └─> dispatch_device_frames     mode-gated ArFrameEvent
//!         └─> acquire_hit_test_source   one request per session
//!         └─> apply_hit_test_resolution stale-guarded store
//!         └─> update_reticle_from_frames sample -> pose/visibility
//!         └─> apply_viewer_pose          camera follows device
//!         └─> handle_select              placement commit
//! ```
//!
//! The systems run as one `.chain()`ed sequence in [`XrCoreSet`], which
//! gives the per-frame ordering guarantee: sampling before reticle
//! update, reticle update before any placement commit from the same
//! frame's input.

/// Native-only keyboard simulation of the XR host.
#[cfg(not(target_arch = "wasm32"))]
pub mod debug_input;

/// Device-frame contract types and per-frame dispatch.
pub mod frame;

/// Hit-test source acquisition state machine and sampling.
pub mod hit_test;

/// Inspection/AR mode coordinator and session-end resets.
pub mod mode;

/// Select handling and the placement policy.
pub mod placement;

/// Surface indicator.
pub mod reticle;

/// Session identity and lifecycle events.
pub mod session;

use bevy::prelude::*;

use crate::engine::camera::OrbitCamera;
use crate::engine::model::PlaceableModel;
use crate::rpc::web_rpc::WebRpcInterface;

use frame::{ArFrameEvent, XrFrameEvent, apply_viewer_pose, dispatch_device_frames};
use hit_test::{
    HitTestSourceResolved, HitTestState, acquire_hit_test_source, apply_hit_test_resolution,
};
use mode::{ModeState, handle_session_transitions};
use placement::{PlacementSettings, XrSelectEvent, handle_select};
use reticle::{Reticle, sync_reticle_entity, update_reticle_from_frames};
use session::{XrSessionEnded, XrSessionStarted, XrSessionState};

/// Label for the ordered AR placement chain. Host-event producers run
/// before this set, presentation syncs after it.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XrCoreSet;

/// Registers the AR placement state machine. Deliberately free of any
/// renderer or asset-server dependency so tests can drive it headless.
pub struct XrPlacementPlugin;

impl Plugin for XrPlacementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<XrSessionState>()
            .init_resource::<HitTestState>()
            .init_resource::<Reticle>()
            .init_resource::<ModeState>()
            .init_resource::<PlaceableModel>()
            .init_resource::<PlacementSettings>()
            .init_resource::<OrbitCamera>()
            .init_resource::<WebRpcInterface>()
            .add_event::<XrSessionStarted>()
            .add_event::<XrSessionEnded>()
            .add_event::<XrFrameEvent>()
            .add_event::<ArFrameEvent>()
            .add_event::<HitTestSourceResolved>()
            .add_event::<XrSelectEvent>()
            .add_systems(
                Update,
                (
                    handle_session_transitions,
                    dispatch_device_frames,
                    acquire_hit_test_source,
                    apply_hit_test_resolution,
                    update_reticle_from_frames,
                    apply_viewer_pose,
                    handle_select,
                    sync_reticle_entity,
                )
                    .chain()
                    .in_set(XrCoreSet),
            );
    }
}
