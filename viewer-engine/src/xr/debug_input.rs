//! Keyboard-driven AR simulation for native development builds.
//!
//! Native builds have no XR host, so a small simulator injects the same
//! events the web bridge would deliver: `X` toggles a fake session,
//! `Space` fires a select, and while the session runs a synthetic device
//! frame with one floor hit is emitted every tick. Acquisition requests
//! are answered one frame later, which keeps the asynchronous path honest.

use bevy::prelude::*;

use crate::xr::frame::{ViewerPose, XrFrame, XrFrameEvent};
use crate::xr::hit_test::{HitTestSourceId, HitTestSourceResolved, HitTestState};
use crate::xr::mode::{ModeState, ViewerMode};
use crate::xr::placement::XrSelectEvent;
use crate::xr::session::{XrSessionEnded, XrSessionStarted};

const SIMULATED_VIEWER_POSITION: Vec3 = Vec3::new(0.0, 1.6, 1.5);
const SIMULATED_HIT_POINT: Vec3 = Vec3::new(0.0, 0.0, -0.5);

pub fn simulate_xr_host(
    keyboard: Res<ButtonInput<KeyCode>>,
    mode: Res<ModeState>,
    hit_test: Res<HitTestState>,
    time: Res<Time>,
    mut started: EventWriter<XrSessionStarted>,
    mut ended: EventWriter<XrSessionEnded>,
    mut frames: EventWriter<XrFrameEvent>,
    mut selects: EventWriter<XrSelectEvent>,
    mut resolutions: EventWriter<HitTestSourceResolved>,
) {
    if keyboard.just_pressed(KeyCode::KeyX) {
        match mode.mode {
            ViewerMode::Inspection => {
                started.write(XrSessionStarted);
            }
            ViewerMode::Ar => {
                ended.write(XrSessionEnded);
            }
        }
        return;
    }

    if mode.mode != ViewerMode::Ar {
        return;
    }

    if keyboard.just_pressed(KeyCode::Space) {
        selects.write(XrSelectEvent);
    }

    // Answer last frame's acquisition request.
    if let Some(session) = hit_test.requesting_session() {
        resolutions.write(HitTestSourceResolved {
            session,
            source: Some(HitTestSourceId(1)),
        });
    }

    frames.write(XrFrameEvent {
        timestamp: time.elapsed_secs_f64() * 1000.0,
        frame: Some(XrFrame {
            viewer_pose: ViewerPose {
                position: SIMULATED_VIEWER_POSITION,
                orientation: Quat::from_rotation_x(-0.4),
            },
            surface_hits: vec![Mat4::from_translation(SIMULATED_HIT_POINT)],
        }),
    });
}
