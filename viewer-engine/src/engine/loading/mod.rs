/// Viewer config JSON asset and its loader resource/system pair.
pub mod config_loader;
