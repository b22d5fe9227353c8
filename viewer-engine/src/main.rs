use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::math::primitives::Torus;
use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy_common_assets::json::JsonAssetPlugin;

use constants::reticle::{RETICLE_COLOUR, RETICLE_RING_RADIUS, RETICLE_RING_THICKNESS};

use viewer_engine::engine::camera::{OrbitCamera, orbit_camera_controller};
use viewer_engine::engine::loading::config_loader::{
    ConfigLoader, ViewerConfig, apply_viewer_config, start_config_loading,
};
use viewer_engine::engine::model::{ModelLoadFailedEvent, ModelPlugin, ModelReadyEvent};
use viewer_engine::rpc::web_rpc::WebRpcPlugin;
use viewer_engine::xr::XrPlacementPlugin;
use viewer_engine::xr::reticle::ReticleMarker;

fn main() {
    let mut app = create_app();

    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(async move {
            app.run();
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.run();
    }
}

/// Create the viewer application: AR placement core, model pipeline, and
/// the host RPC bridge on top of the default render stack.
fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        .add_plugins(JsonAssetPlugin::<ViewerConfig>::new(&["json"]))
        .add_plugins(XrPlacementPlugin)
        .add_plugins(ModelPlugin)
        .add_plugins(WebRpcPlugin);

    app.init_resource::<ConfigLoader>()
        .add_systems(Startup, (setup, start_config_loading))
        .add_systems(
            Update,
            (
                apply_viewer_config,
                orbit_camera_controller,
                fps_text_update_system,
                update_status_text,
            ),
        );

    #[cfg(not(target_arch = "wasm32"))]
    app.add_systems(
        Update,
        viewer_engine::xr::debug_input::simulate_xr_host.before(viewer_engine::xr::XrCoreSet),
    );

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}

fn create_window_config() -> Window {
    #[cfg(target_arch = "wasm32")]
    {
        Window {
            canvas: Some("#bevy".into()),
            fit_canvas_to_parent: true,
            prevent_default_event_handling: false,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Window {
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}

#[derive(Component)]
struct FpsText;

#[derive(Component)]
struct StatusText;

/// Spawn camera, lighting, the reticle entity, and the UI overlay.
fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    orbit: Res<OrbitCamera>,
) {
    println!("=== AR MODEL VIEWER ===");

    commands.spawn((Camera3d::default(), orbit.target_transform()));

    commands.spawn((
        DirectionalLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));

    spawn_reticle(&mut commands, &mut meshes, &mut materials);
    spawn_ui(&mut commands);
}

/// The reticle entity exists for the application's lifetime; visibility
/// alone tracks surface detection.
fn spawn_reticle(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
) {
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(RETICLE_COLOUR[0], RETICLE_COLOUR[1], RETICLE_COLOUR[2]),
        unlit: true,
        ..default()
    });

    commands.spawn((
        Mesh3d(meshes.add(Torus {
            minor_radius: RETICLE_RING_THICKNESS,
            major_radius: RETICLE_RING_RADIUS,
        })),
        MeshMaterial3d(material),
        Transform::default(),
        Visibility::Hidden,
        ReticleMarker,
        Name::new("reticle"),
    ));
}

fn spawn_ui(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1., 0., 0.)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));

            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.4, 0.3)),
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(12.0),
                    left: Val::Px(12.0),
                    ..default()
                },
                Visibility::Hidden,
                StatusText,
            ));
        });
}

fn fps_text_update_system(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut Text, With<FpsText>>,
) {
    for mut text in &mut query {
        if let Some(fps) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
            if let Some(value) = fps.smoothed() {
                text.0 = format!("FPS: {value:.1}");
            }
        }
    }
}

/// Surface load failures to the user; clear the indicator once a model
/// comes back.
fn update_status_text(
    mut ready_events: EventReader<ModelReadyEvent>,
    mut failed_events: EventReader<ModelLoadFailedEvent>,
    mut query: Query<(&mut Text, &mut Visibility), With<StatusText>>,
) {
    let Ok((mut text, mut visibility)) = query.single_mut() else {
        return;
    };

    for _ in ready_events.read() {
        text.0.clear();
        *visibility = Visibility::Hidden;
    }

    for failed in failed_events.read() {
        text.0 = format!("Model failed to load: {}", failed.error);
        *visibility = Visibility::Visible;
    }
}
