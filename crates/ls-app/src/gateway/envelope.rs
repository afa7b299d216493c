//! `{ "success": bool, "error"?: string, ...payload }` answers shared by both
//! transports.

use super::GatewayError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use serde_json::Value;

const NOT_FOUND: u64 = 404;

/// Check the `success` flag and hand back the body.
///
/// `status` is the HTTP status when there is one; the bridge may put a
/// `status` field in the body instead.
pub(crate) fn open(body: Value, status: Option<u16>) -> Result<Value, GatewayError> {
    let Some(success) = body.get("success").and_then(Value::as_bool) else {
        return Err(GatewayError::Malformed("missing success flag".into()));
    };
    if success {
        return Ok(body);
    }

    let message = body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("request failed")
        .to_string();
    let not_found = status.map(u64::from) == Some(NOT_FOUND)
        || body.get("status").and_then(Value::as_u64) == Some(NOT_FOUND);

    if not_found {
        Err(GatewayError::NotFound(message))
    } else {
        Err(GatewayError::Rejected(message))
    }
}

/// Take `name` out of an opened body and decode it
pub(crate) fn field<T: DeserializeOwned>(body: &mut Value, name: &str) -> Result<T, GatewayError> {
    let value = body
        .get_mut(name)
        .map(Value::take)
        .ok_or_else(|| GatewayError::Malformed(format!("missing `{name}`")))?;
    serde_json::from_value(value).map_err(|err| GatewayError::Malformed(format!("`{name}`: {err}")))
}

/// Decode the whole body, ignoring the envelope keys
pub(crate) fn whole<T: DeserializeOwned>(body: Value) -> Result<T, GatewayError> {
    serde_json::from_value(body).map_err(|err| GatewayError::Malformed(err.to_string()))
}

/// Accepts both bare base64 and `data:<mime>;base64,<payload>`
pub(crate) fn decode_base64(raw: &str) -> Result<Vec<u8>, GatewayError> {
    let payload = match raw.split_once(',') {
        Some((head, rest)) if head.starts_with("data:") => rest,
        _ => raw,
    };
    STANDARD
        .decode(payload.trim())
        .map_err(|err| GatewayError::Malformed(format!("invalid base64: {err}")))
}

pub(crate) fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
