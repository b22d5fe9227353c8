/// JSON-RPC 2.0 bridge to the embedding page: XR host events and UI
/// actions in, state notifications out.
pub mod web_rpc;
