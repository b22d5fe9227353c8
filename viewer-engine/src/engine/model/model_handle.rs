use bevy::prelude::*;

use constants::placement::{MODEL_REST_POSITION, MODEL_UNIT_SCALE};

/// Where a model comes from: a plain URL, or an object URL minted for a
/// user-picked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Url(String),
    ObjectUrl(String),
}

impl ModelSource {
    pub fn asset_path(&self) -> &str {
        match self {
            Self::Url(path) | Self::ObjectUrl(path) => path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelLoadState {
    #[default]
    Unloaded,
    Loading,
    Ready,
    Failed,
}

/// The single placeable model instance.
///
/// Exactly one instance exists at a time: `begin_load` disposes the
/// previous one before recording its replacement. The generation counter
/// ties asynchronous load notifications to the instance that started
/// them; results for a superseded generation are ignored.
#[derive(Resource, Debug, Clone)]
pub struct PlaceableModel {
    source: Option<ModelSource>,
    generation: u64,
    load_state: ModelLoadState,
    pub visible: bool,
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
}

impl Default for PlaceableModel {
    fn default() -> Self {
        Self {
            source: None,
            generation: 0,
            load_state: ModelLoadState::Unloaded,
            visible: true,
            position: MODEL_REST_POSITION,
            orientation: Quat::IDENTITY,
            scale: MODEL_UNIT_SCALE,
        }
    }
}

impl PlaceableModel {
    /// Dispose the current instance and record its replacement. Returns
    /// the new generation plus the replaced source so the caller can
    /// release it (object URLs are revoked on wasm).
    pub fn begin_load(&mut self, source: ModelSource, start_hidden: bool) -> (u64, Option<ModelSource>) {
        let replaced = self.dispose();
        self.generation += 1;
        self.source = Some(source);
        self.load_state = ModelLoadState::Loading;
        self.visible = !start_hidden;
        self.position = MODEL_REST_POSITION;
        self.orientation = Quat::IDENTITY;
        self.scale = MODEL_UNIT_SCALE;
        (self.generation, replaced)
    }

    /// Release the current instance. Idempotent; safe after a failed load.
    pub fn dispose(&mut self) -> Option<ModelSource> {
        self.load_state = ModelLoadState::Unloaded;
        self.source.take()
    }

    /// Transition to Ready. Fires at most once per instance; stale
    /// notifications for superseded generations return false.
    pub fn mark_ready(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.load_state != ModelLoadState::Loading {
            return false;
        }
        self.load_state = ModelLoadState::Ready;
        true
    }

    /// Transition to Failed, same staleness rules as `mark_ready`.
    pub fn mark_failed(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.load_state != ModelLoadState::Loading {
            return false;
        }
        self.load_state = ModelLoadState::Failed;
        true
    }

    /// Placement only ever mutates an already-loaded instance.
    pub fn is_placeable(&self) -> bool {
        self.load_state == ModelLoadState::Ready
    }

    /// AR-exit reset: position and scale back to defaults. Orientation is
    /// left alone, matching what placement may or may not have set.
    pub fn reset_transform(&mut self) {
        self.position = MODEL_REST_POSITION;
        self.scale = MODEL_UNIT_SCALE;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn load_state(&self) -> ModelLoadState {
        self.load_state
    }

    pub fn source(&self) -> Option<&ModelSource> {
        self.source.as_ref()
    }
}
