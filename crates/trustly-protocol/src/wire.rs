//! JSON encoding of documents for the transport layer.
//!
//! Every document goes over the wire as the bare JSON object of its payload,
//! UTF-8 encoded, with object keys in sorted order.

use serde::Serialize;
use serde_json::Value;

use crate::error::ProtocolResult;
use crate::payload::Payload;

/// Encodes a document to the bytes handed to the transport.
///
/// # Example
///
/// ```rust
/// use trustly_protocol::{JsonRpcRequest, encode_document};
///
/// let request = JsonRpcRequest::with_method("Deposit");
/// let bytes = encode_document(&request).unwrap();
/// assert_eq!(bytes, br#"{"method":"Deposit","params":{},"version":"1.1"}"#);
/// ```
pub fn encode_document<T: Serialize>(document: &T) -> ProtocolResult<Vec<u8>> {
    Ok(serde_json::to_vec(document)?)
}

/// Encodes a document to a JSON string.
pub fn encode_document_string<T: Serialize>(document: &T) -> ProtocolResult<String> {
    Ok(serde_json::to_string(document)?)
}

/// Parses a raw body into a JSON value.
pub(crate) fn decode_value(body: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Builds a payload from a decoded value. Anything but an object yields an
/// empty payload.
pub(crate) fn into_payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => Payload::from_object(map),
        _ => Payload::new(),
    }
}

/// Whether a decoded body carries nothing usable: `null`, `false`, zero, an
/// empty string, or an empty array or object.
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
