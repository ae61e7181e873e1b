//! Incoming notifications pushed by the API.

use std::borrow::Cow;

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::PROTOCOL_VERSION;
use crate::error::{ProtocolError, ProtocolResult};
use crate::payload::{Object, Payload, as_object, as_str, ensure_utf8, present};
use crate::signing::{Verifier, signable_plaintext};
use crate::wire::{decode_value, into_payload};

/// A notification call received from the API.
///
/// ```text
/// {
///   "method": "credit",
///   "params": { "uuid": "...", "signature": "...", "data": { ... } },
///   "version": "1.1"
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    payload: Payload,
    body: Vec<u8>,
}

impl NotificationRequest {
    /// Parses a raw notification body.
    ///
    /// Fails with a data error for an empty or undecodable body, and with
    /// [`ProtocolError::UnsupportedVersion`] when the envelope does not
    /// declare version `1.1`. A `version` that is present but not a string is
    /// a data error.
    pub fn from_body(body: impl Into<Vec<u8>>) -> ProtocolResult<Self> {
        let body = body.into();
        if body.is_empty() {
            return Err(ProtocolError::data("Empty notification body"));
        }

        let value = match decode_value(&body) {
            Ok(Value::Null) => return Err(ProtocolError::data("Failed to parse JSON")),
            Ok(value) => value,
            Err(err) => return Err(ProtocolError::data(format!("Failed to parse JSON: {err}"))),
        };

        let notification = Self {
            payload: into_payload(value),
            body,
        };

        let version = notification.version()?;
        if version != Some(PROTOCOL_VERSION) {
            warn!(?version, "rejecting notification with unsupported version");
            return Err(ProtocolError::unsupported_version(version));
        }

        debug!(method = ?notification.method().ok().flatten(), "parsed notification");
        Ok(notification)
    }

    /// The underlying document.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The body exactly as received.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body as text.
    pub fn body_text(&self) -> Cow<'_, str> {
        ensure_utf8(&self.body)
    }

    /// Raw access to the `params` section.
    ///
    /// Without a name the section is returned after checking that it is an
    /// object. With a name the section is returned unchecked and the name is
    /// ignored. Use [`NotificationRequest::param`] to read a single value.
    pub fn params(&self, name: Option<&str>) -> ProtocolResult<Option<&Value>> {
        let params = self.payload.get("params");
        if name.is_some() {
            return Ok(params);
        }
        as_object(params, "Params")?;
        Ok(params)
    }

    /// One value from `params`.
    pub fn param(&self, name: &str) -> ProtocolResult<Option<&Value>> {
        let params = self.payload.get_object("params", "Params")?;
        Ok(params.and_then(|params| present(params.get(name))))
    }

    /// The whole `params.data` section.
    pub fn data(&self) -> ProtocolResult<Option<&Object>> {
        as_object(self.param("data")?, "Data")
    }

    /// One value from `params.data`.
    pub fn data_value(&self, name: &str) -> ProtocolResult<Option<&Value>> {
        Ok(self.data()?.and_then(|data| present(data.get(name))))
    }

    /// The notification identifier.
    pub fn uuid(&self) -> ProtocolResult<Option<&str>> {
        as_str(self.param("uuid")?, "UUID")
    }

    /// The notification method, e.g. `credit` or `account`.
    pub fn method(&self) -> ProtocolResult<Option<&str>> {
        self.payload.get_str("method", "Method")
    }

    /// The API's signature over the notification.
    pub fn signature(&self) -> ProtocolResult<Option<&str>> {
        as_str(self.param("signature")?, "Signature")
    }

    /// The declared JSON-RPC version.
    pub fn version(&self) -> ProtocolResult<Option<&str>> {
        self.payload.get_str("version", "Version")
    }

    /// Checks the API's signature over `method ++ uuid ++ serialize(data)`.
    pub fn verify<V: Verifier>(&self, verifier: &V) -> ProtocolResult<bool> {
        let signature = self
            .signature()?
            .ok_or_else(|| ProtocolError::data("Notification is not signed"))?;
        let plaintext = signable_plaintext(
            self.method()?.unwrap_or_default(),
            self.uuid()?.unwrap_or_default(),
            self.param("data")?,
        );
        verifier
            .verify(&plaintext, signature)
            .map_err(|err| ProtocolError::signing(err.to_string()))
    }
}

impl Serialize for NotificationRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.payload.serialize(serializer)
    }
}
