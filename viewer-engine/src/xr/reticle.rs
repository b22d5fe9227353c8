use bevy::prelude::*;

use crate::xr::frame::ArFrameEvent;
use crate::xr::hit_test::{HitTestState, SurfaceSample};

/// Surface indicator state. Created once at startup and never destroyed;
/// hidden whenever no surface was found or no hit-test source exists yet.
/// While hidden the pose is stale and must not be read.
#[derive(Resource, Debug, Clone, Copy)]
pub struct Reticle {
    pub visible: bool,
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Reticle {
    fn default() -> Self {
        Self {
            visible: false,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl Reticle {
    pub fn apply(&mut self, sample: SurfaceSample) {
        match sample {
            SurfaceSample::Hit {
                position,
                orientation,
            } => {
                self.visible = true;
                self.position = position;
                self.orientation = orientation;
            }
            SurfaceSample::Miss => {
                self.visible = false;
            }
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// Marker for the reticle's render entity.
#[derive(Component)]
pub struct ReticleMarker;

/// Sample the hit-test source for every accepted AR frame and update the
/// reticle accordingly.
pub fn update_reticle_from_frames(
    mut frames: EventReader<ArFrameEvent>,
    hit_test: Res<HitTestState>,
    mut reticle: ResMut<Reticle>,
) {
    for ArFrameEvent(frame) in frames.read() {
        reticle.apply(hit_test.sample(frame));
    }
}

/// Push reticle pose and visibility onto its render entity.
pub fn sync_reticle_entity(
    reticle: Res<Reticle>,
    mut query: Query<(&mut Transform, &mut Visibility), With<ReticleMarker>>,
) {
    for (mut transform, mut visibility) in &mut query {
        *visibility = if reticle.visible {
            transform.translation = reticle.position;
            transform.rotation = reticle.orientation;
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}
