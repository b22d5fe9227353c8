use bevy::prelude::*;

use crate::xr::mode::{ModeState, ViewerMode};

/// Device pose of the viewer for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerPose {
    pub position: Vec3,
    pub orientation: Quat,
}

/// Device data carried by one AR frame: the viewer pose plus the surface
/// intersections the device reported for the active hit-test source, as
/// 4x4 transforms (position + orientation, identity scale).
#[derive(Debug, Clone, PartialEq)]
pub struct XrFrame {
    pub viewer_pose: ViewerPose,
    pub surface_hits: Vec<Mat4>,
}

/// Per-frame entry point from the host render loop. `frame` is `None`
/// for ordinary inspection-mode frames.
#[derive(Event, Debug, Clone)]
pub struct XrFrameEvent {
    pub timestamp: f64,
    pub frame: Option<XrFrame>,
}

/// Device frame accepted for AR processing this tick.
///
/// Mode is the single source of truth: pose-carrying frames are only
/// forwarded while AR mode is active, so the downstream chain never has
/// to re-check the mode.
#[derive(Event, Debug, Clone)]
pub struct ArFrameEvent(pub XrFrame);

/// Gate raw host frames into the AR processing chain.
pub fn dispatch_device_frames(
    mut raw: EventReader<XrFrameEvent>,
    mode: Res<ModeState>,
    mut accepted: EventWriter<ArFrameEvent>,
) {
    for event in raw.read() {
        let Some(frame) = &event.frame else {
            // Inspection frame: orbit controls run instead.
            continue;
        };

        if mode.mode != ViewerMode::Ar {
            warn!(
                "dropping device frame at t={}: pose data received while in inspection mode",
                event.timestamp
            );
            continue;
        }

        accepted.write(ArFrameEvent(frame.clone()));
    }
}

/// Drive the 3D camera from the device pose while in AR mode.
pub fn apply_viewer_pose(
    mut frames: EventReader<ArFrameEvent>,
    mut cameras: Query<&mut Transform, With<Camera3d>>,
) {
    let Some(ArFrameEvent(frame)) = frames.read().last() else {
        return;
    };
    let Ok(mut transform) = cameras.single_mut() else {
        return;
    };

    transform.translation = frame.viewer_pose.position;
    transform.rotation = frame.viewer_pose.orientation;
}
