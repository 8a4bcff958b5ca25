//! Stamps recorded on each mount state generation, and the JSON response
//! shape shared by every `--format json` command.

use serde_json::{Map, Value as JsonValue, json};
use std::time::{SystemTime, UNIX_EPOCH};
use ulid::Ulid;

pub const ENVELOPE_VERSION: &str = "1.0.0";

/// `updated_at` value for a saved generation: epoch seconds, `Z` suffixed.
pub fn state_timestamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{secs}Z")
}

/// Sortable id tying a saved generation to the invocation that wrote it.
pub fn new_invocation_id() -> String {
    Ulid::new().to_string()
}

/// `{envelope_version, ts, event_id, cmd, status: "ok", ..payload}`.
///
/// Object payloads are flattened into the envelope; payload keys never
/// replace the envelope's own. Anything else lands under `data`.
pub fn command_envelope(cmd: &str, payload: JsonValue) -> JsonValue {
    let mut fields = match payload {
        JsonValue::Object(map) => map,
        other => Map::from_iter([("data".to_string(), other)]),
    };
    fields.insert("envelope_version".to_string(), json!(ENVELOPE_VERSION));
    fields.insert("ts".to_string(), json!(state_timestamp()));
    fields.insert("event_id".to_string(), json!(new_invocation_id()));
    fields.insert("cmd".to_string(), json!(cmd));
    fields.insert("status".to_string(), json!("ok"));
    JsonValue::Object(fields)
}
