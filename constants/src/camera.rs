/// Initial orbit distance from the focus point in metres.
pub const ORBIT_DEFAULT_DISTANCE: f32 = 2.5;

pub const ORBIT_DISTANCE_MIN: f32 = 0.5;
pub const ORBIT_DISTANCE_MAX: f32 = 20.0;

/// Pitch clamp keeps the camera above the ground and below the zenith.
pub const ORBIT_PITCH_MIN: f32 = -1.5;
pub const ORBIT_PITCH_MAX: f32 = -0.05;

pub const ORBIT_ROTATE_SENSITIVITY: f32 = 0.005;
pub const ORBIT_PAN_SENSITIVITY: f32 = 0.001;
pub const ORBIT_KEYBOARD_YAW_SPEED: f32 = 1.0;

/// Smoothing factor applied when interpolating towards the target pose.
pub const CAMERA_LERP_SPEED: f32 = 12.0;
