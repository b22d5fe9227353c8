use bevy::prelude::*;

/// Resting point for a freshly loaded model in inspection mode.
pub const MODEL_REST_POSITION: Vec3 = Vec3::ZERO;

/// Models are always rendered at unit scale, in both viewing modes.
pub const MODEL_UNIT_SCALE: Vec3 = Vec3::ONE;

/// Model shown when no viewer config is available.
pub const DEFAULT_MODEL_URL: &str = "models/astronaut.glb";

/// Asset path of the viewer configuration file.
pub const VIEWER_CONFIG_PATH: &str = "viewer_config.json";
