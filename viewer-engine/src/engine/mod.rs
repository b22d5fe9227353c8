/// Orbit camera for inspection mode.
pub mod camera;

/// Startup configuration loading.
pub mod loading;

/// The placeable model handle and its loader systems.
pub mod model;
