use bevy::{
    input::mouse::{MouseMotion, MouseWheel},
    prelude::*,
};

use constants::camera::*;

/// Orbit camera state for inspection mode. The mode coordinator flips
/// `enabled` on AR entry/exit; while disabled the controller consumes no
/// input and leaves the camera transform to the device pose.
#[derive(Resource)]
pub struct OrbitCamera {
    pub enabled: bool,
    pub focus_point: Vec3,
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            enabled: true,
            focus_point: Vec3::ZERO,
            distance: ORBIT_DEFAULT_DISTANCE,
            pitch: -0.5,
            yaw: 0.0,
        }
    }
}

impl OrbitCamera {
    /// Camera transform for the current orbit parameters.
    pub fn target_transform(&self) -> Transform {
        let rotation = Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch);
        let offset = rotation * Vec3::new(0.0, 0.0, self.distance);
        Transform::from_translation(self.focus_point + offset)
            .looking_at(self.focus_point, Vec3::Y)
    }
}

/// Mouse/keyboard orbit controls: left-drag rotates, middle-drag pans,
/// scroll zooms, A/D rotate around the focus point.
pub fn orbit_camera_controller(
    mut cameras: Query<&mut Transform, With<Camera3d>>,
    mut orbit: ResMut<OrbitCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
) {
    if !orbit.enabled {
        mouse_motion.clear();
        scroll_events.clear();
        return;
    }

    let Ok(mut camera_transform) = cameras.single_mut() else {
        return;
    };

    for scroll in scroll_events.read() {
        let zoom_factor = if scroll.y > 0.0 { 0.9 } else { 1.1 };
        orbit.distance = (orbit.distance * zoom_factor).clamp(ORBIT_DISTANCE_MIN, ORBIT_DISTANCE_MAX);
    }

    let total_motion: Vec2 = mouse_motion.read().map(|motion| motion.delta).sum();

    if mouse_button.pressed(MouseButton::Left) && total_motion != Vec2::ZERO {
        orbit.yaw -= total_motion.x * ORBIT_ROTATE_SENSITIVITY;
        orbit.pitch =
            (orbit.pitch - total_motion.y * ORBIT_ROTATE_SENSITIVITY).clamp(ORBIT_PITCH_MIN, ORBIT_PITCH_MAX);
    }

    if mouse_button.pressed(MouseButton::Middle) && total_motion != Vec2::ZERO {
        let sensitivity = orbit.distance * ORBIT_PAN_SENSITIVITY;
        let yaw_rot = Quat::from_rotation_y(orbit.yaw);
        let right = yaw_rot * Vec3::X;
        let forward = yaw_rot * Vec3::Z;
        orbit.focus_point += right * -total_motion.x * sensitivity;
        orbit.focus_point += forward * -total_motion.y * sensitivity;
    }

    let mut rotation_input = 0.0;
    if keyboard.pressed(KeyCode::KeyA) {
        rotation_input -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        rotation_input += 1.0;
    }
    if rotation_input != 0.0 {
        orbit.yaw += rotation_input * ORBIT_KEYBOARD_YAW_SPEED * time.delta_secs();
    }

    let target = orbit.target_transform();
    let lerp_speed = (CAMERA_LERP_SPEED * time.delta_secs()).min(1.0);
    camera_transform.translation = camera_transform.translation.lerp(target.translation, lerp_speed);
    camera_transform.rotation = camera_transform.rotation.slerp(target.rotation, lerp_speed);
}
