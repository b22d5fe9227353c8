use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::model::{LoadModelEvent, ModelSource};
use crate::xr::XrCoreSet;
use crate::xr::frame::{ViewerPose, XrFrame, XrFrameEvent};
use crate::xr::hit_test::{HitTestSourceId, HitTestSourceResolved};
use crate::xr::placement::XrSelectEvent;
use crate::xr::session::{SessionId, XrSessionEnded, XrSessionStarted};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following specification.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Resource managing bidirectional RPC communication with the embedding
/// page: XR host events and UI actions in, state notifications out.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host page without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the host page.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }

    /// Notifications queued and not yet transmitted.
    pub fn notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }
}

/// Menu open/close state mirrored from the UI surface.
#[derive(Resource, Default)]
pub struct MenuState {
    pub open: bool,
}

/// Plugin establishing the host communication layer. Inbound dispatch
/// runs before the AR core so host events take effect in the same frame;
/// transmission runs after it so notifications from that frame go out
/// together.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .init_resource::<MenuState>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .before(XrCoreSet),
            )
            .add_systems(Update, send_outgoing_messages.after(XrCoreSet));

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Thread-safe message queue for cross-thread communication.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            // Attempt JSON parsing to validate RPC format before queuing.
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if window
            .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            .is_err()
        {
            error!("Failed to register message listener");
        }
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing an incoming RPC message from the host page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Event writers the RPC dispatcher can reach.
#[derive(bevy::ecs::system::SystemParam)]
pub struct RpcEventWriters<'w> {
    session_started: EventWriter<'w, XrSessionStarted>,
    session_ended: EventWriter<'w, XrSessionEnded>,
    frames: EventWriter<'w, XrFrameEvent>,
    selects: EventWriter<'w, XrSelectEvent>,
    resolutions: EventWriter<'w, HitTestSourceResolved>,
    load_requests: EventWriter<'w, LoadModelEvent>,
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    diagnostics: Res<DiagnosticsStore>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut writers: RpcEventWriters,
    mut menu: ResMut<MenuState>,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                let result = dispatch_method(&request, &diagnostics, &mut writers, &mut menu);

                // Only requests carrying an id get a response; host events
                // arrive as fire-and-forget notifications.
                if let Some(id) = request.id.clone() {
                    rpc_interface.queue_response(match result {
                        Ok(value) => RpcResponse {
                            jsonrpc: "2.0".to_string(),
                            result: Some(value),
                            error: None,
                            id: Some(id),
                        },
                        Err(error) => RpcResponse {
                            jsonrpc: "2.0".to_string(),
                            result: None,
                            error: Some(error),
                            id: Some(id),
                        },
                    });
                } else if let Err(error) = result {
                    warn!("RPC notification {} failed: {}", request.method, error.message);
                }
            }
            Err(parse_error) => {
                warn!("Discarding unparseable RPC message: {parse_error}");
            }
        }
    }
}

/// Route one request or notification to its handler.
fn dispatch_method(
    request: &RpcRequest,
    diagnostics: &DiagnosticsStore,
    writers: &mut RpcEventWriters,
    menu: &mut MenuState,
) -> Result<serde_json::Value, RpcError> {
    match request.method.as_str() {
        "session_started" => {
            writers.session_started.write(XrSessionStarted);
            Ok(serde_json::json!({ "accepted": true }))
        }
        "session_ended" => {
            writers.session_ended.write(XrSessionEnded);
            Ok(serde_json::json!({ "accepted": true }))
        }
        "xr_frame" => handle_xr_frame(&request.params, writers),
        "select" => {
            writers.selects.write(XrSelectEvent);
            Ok(serde_json::json!({ "accepted": true }))
        }
        "hit_test_source_resolved" => handle_source_resolved(&request.params, writers),
        "load_model" => handle_load_model(&request.params, writers),
        "load_model_blob" => handle_load_model_blob(&request.params, writers),
        "set_menu_open" => handle_set_menu_open(&request.params, menu),
        "get_fps" => handle_get_fps(diagnostics),
        other => {
            warn!("Unknown RPC method: {other}");
            Err(RpcError {
                code: -32601,
                message: "Method not found".to_string(),
                data: Some(serde_json::json!({ "method": other })),
            })
        }
    }
}

/// Per-frame device data pushed by the XR host.
fn handle_xr_frame(
    params: &serde_json::Value,
    writers: &mut RpcEventWriters,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct PoseParams {
        position: [f32; 3],
        orientation: [f32; 4],
    }

    #[derive(Deserialize)]
    struct XrFrameParams {
        timestamp: f64,
        #[serde(default)]
        viewer_pose: Option<PoseParams>,
        #[serde(default)]
        hits: Vec<[f32; 16]>,
    }

    let frame_params = serde_json::from_value::<XrFrameParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'timestamp' with optional pose/hits"))?;

    let frame = frame_params.viewer_pose.map(|pose| XrFrame {
        viewer_pose: ViewerPose {
            position: Vec3::from_array(pose.position),
            orientation: Quat::from_array(pose.orientation),
        },
        surface_hits: frame_params
            .hits
            .iter()
            .map(Mat4::from_cols_array)
            .collect(),
    });

    writers.frames.write(XrFrameEvent {
        timestamp: frame_params.timestamp,
        frame,
    });
    Ok(serde_json::json!({ "accepted": true }))
}

/// Resolution of an earlier `request_hit_test_source` notification.
fn handle_source_resolved(
    params: &serde_json::Value,
    writers: &mut RpcEventWriters,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct ResolvedParams {
        session: u64,
        source: Option<u32>,
    }

    let resolved = serde_json::from_value::<ResolvedParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'session' and optional 'source'"))?;

    writers.resolutions.write(HitTestSourceResolved {
        session: SessionId::from_value(resolved.session),
        source: resolved.source.map(HitTestSourceId),
    });
    Ok(serde_json::json!({ "accepted": true }))
}

/// UI action: load a model from a URL typed into the text input.
fn handle_load_model(
    params: &serde_json::Value,
    writers: &mut RpcEventWriters,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct LoadParams {
        url: String,
    }

    let load = serde_json::from_value::<LoadParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'url' parameter"))?;

    info!("Model load requested via RPC: {}", load.url);
    writers.load_requests.write(LoadModelEvent {
        source: ModelSource::Url(load.url),
    });
    Ok(serde_json::json!({ "accepted": true }))
}

/// UI action: load a model from a user-picked file's object URL.
fn handle_load_model_blob(
    params: &serde_json::Value,
    writers: &mut RpcEventWriters,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct LoadBlobParams {
        object_url: String,
    }

    let load = serde_json::from_value::<LoadBlobParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'object_url' parameter"))?;

    writers.load_requests.write(LoadModelEvent {
        source: ModelSource::ObjectUrl(load.object_url),
    });
    Ok(serde_json::json!({ "accepted": true }))
}

fn handle_set_menu_open(
    params: &serde_json::Value,
    menu: &mut MenuState,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct MenuParams {
        open: bool,
    }

    let menu_params = serde_json::from_value::<MenuParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'open' parameter"))?;

    menu.open = menu_params.open;
    Ok(serde_json::json!({ "open": menu.open }))
}

/// Handle FPS retrieval with diagnostic system integration.
fn handle_get_fps(diagnostics: &DiagnosticsStore) -> Result<serde_json::Value, RpcError> {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps_diagnostic| fps_diagnostic.smoothed())
        .unwrap_or(0.0) as f32;

    Ok(serde_json::json!({ "fps": fps }))
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window (host page).
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // Native builds keep the queue drained; there is no host page.
        let _ = message;
    }
}
