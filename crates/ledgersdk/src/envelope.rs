//! Serialization envelope for stateful native objects.
//!
//! ```json
//! {"version": "1.0", "kind": "connection", "state": {...}, "data": <native JSON>}
//! ```
//!
//! `data` is whatever the native serializer produced, kept verbatim. `state`
//! is the local lifecycle stage, absent for objects without one.

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;

use ledgercore::Error;
use ledgercore::HandleKind;
use ledgercore::Result;

pub const ENVELOPE_VERSION: &str = "1.0";

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: String,
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<serde_json::Value>,
    data: serde_json::Value,
}

/// Wraps native serialized `data` together with the local `state`.
pub fn seal<S: Serialize>(kind: HandleKind, state: Option<&S>, data: &str) -> Result<String> {
    // non-JSON native output is carried as a string
    let data = serde_json::from_str(data).unwrap_or_else(|_| serde_json::Value::String(data.to_string()));
    let state = state.map(serde_json::to_value).transpose()?;

    let envelope = Envelope {
        version: ENVELOPE_VERSION.to_string(),
        kind: kind.to_string(),
        state,
        data,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Unwraps an envelope for `kind`, returning the local state and the native
/// data to hand back to the native deserializer.
pub fn open<S: DeserializeOwned>(kind: HandleKind, json: &str) -> Result<(Option<S>, String)> {
    let envelope: Envelope = serde_json::from_str(json)
        .map_err(|e| Error::invalid_param(1, format!("not a serialized {}: {}", kind, e)))?;

    if envelope.version != ENVELOPE_VERSION {
        return Err(Error::invalid_param(
            1,
            format!("unsupported envelope version {}", envelope.version),
        ));
    }
    if envelope.kind != kind.to_string() {
        return Err(Error::invalid_param(
            1,
            format!("expected a serialized {}, found {}", kind, envelope.kind),
        ));
    }

    let state: Option<S> = envelope
        .state
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| Error::invalid_param(1, format!("bad {} state: {}", kind, e)))?;

    let data = match envelope.data {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    };
    Ok((state, data))
}
