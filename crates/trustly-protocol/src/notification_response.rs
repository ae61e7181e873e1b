//! Acknowledgements sent back for incoming notifications.

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::PROTOCOL_VERSION;
use crate::error::{ProtocolError, ProtocolResult};
use crate::notification_request::NotificationRequest;
use crate::payload::{Object, Payload, as_object, as_str, object_entry, present};
use crate::signing::{Signer, signable_plaintext};

/// Status reported for a processed notification.
pub const STATUS_OK: &str = "OK";

/// Status reported for a notification that could not be processed.
pub const STATUS_FAILED: &str = "FAILED";

/// The answer to a [`NotificationRequest`].
///
/// ```text
/// {
///   "result": {
///     "uuid": "...", "method": "...", "signature": "...",
///     "data": { "status": "OK" }
///   },
///   "version": "1.1"
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationResponse {
    payload: Payload,
}

impl NotificationResponse {
    /// Starts an acknowledgement for `request`, echoing its uuid and method.
    ///
    /// The status is only written when `success` is given; call
    /// [`NotificationResponse::set_success`] later otherwise.
    pub fn new(request: &NotificationRequest, success: Option<bool>) -> ProtocolResult<Self> {
        let mut response = Self {
            payload: Payload::new(),
        };

        if let Some(uuid) = request.uuid()? {
            response.set_result("uuid", uuid)?;
        }
        if let Some(method) = request.method()? {
            response.set_result("method", method)?;
        }
        if success.is_some() {
            response.set_success(success)?;
        }

        response.payload.set("version", PROTOCOL_VERSION);
        debug!(?success, "built notification response");
        Ok(response)
    }

    /// The underlying document.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Writes `result.data.status`: `OK` for `Some(true)`, `FAILED` for
    /// anything else. Returns `success` unchanged.
    pub fn set_success(&mut self, success: Option<bool>) -> ProtocolResult<Option<bool>> {
        let status = if success == Some(true) {
            STATUS_OK
        } else {
            STATUS_FAILED
        };
        self.set_data("status", status)?;
        Ok(success)
    }

    /// The status written by [`NotificationResponse::set_success`].
    pub fn status(&self) -> ProtocolResult<Option<&str>> {
        as_str(self.data_value("status")?, "Status")
    }

    /// Stores the signature of the acknowledgement.
    pub fn set_signature(&mut self, signature: impl Into<String>) -> ProtocolResult<()> {
        self.set_result("signature", signature.into())
    }

    /// The stored signature.
    pub fn signature(&self) -> ProtocolResult<Option<&str>> {
        as_str(self.result_value("signature")?, "Signature")
    }

    /// Sets a value in `result`, creating the section if needed.
    pub fn set_result(&mut self, name: impl Into<String>, value: impl Into<Value>) -> ProtocolResult<()> {
        let result = self.payload.object_entry("result", "Result")?;
        result.insert(name.into(), value.into());
        Ok(())
    }

    /// The whole `result` section.
    pub fn result(&self) -> ProtocolResult<Option<&Object>> {
        self.payload.get_object("result", "Result")
    }

    /// One value from `result`.
    pub fn result_value(&self, name: &str) -> ProtocolResult<Option<&Value>> {
        Ok(self.result()?.and_then(|result| present(result.get(name))))
    }

    /// Sets a value in `result.data`, creating both sections if needed.
    pub fn set_data(&mut self, name: impl Into<String>, value: impl Into<Value>) -> ProtocolResult<()> {
        let result = self.payload.object_entry("result", "Result")?;
        let data = object_entry(result, "data", "Data")?;
        data.insert(name.into(), value.into());
        Ok(())
    }

    /// The whole `result.data` section.
    pub fn data(&self) -> ProtocolResult<Option<&Object>> {
        as_object(self.result_value("data")?, "Data")
    }

    /// One value from `result.data`.
    pub fn data_value(&self, name: &str) -> ProtocolResult<Option<&Value>> {
        Ok(self.data()?.and_then(|data| present(data.get(name))))
    }

    /// The echoed notification method.
    pub fn method(&self) -> ProtocolResult<Option<&str>> {
        as_str(self.result_value("method")?, "Method")
    }

    /// The echoed notification identifier.
    pub fn uuid(&self) -> ProtocolResult<Option<&str>> {
        as_str(self.result_value("uuid")?, "UUID")
    }

    /// Signs `method ++ uuid ++ serialize(result.data)` and stores the
    /// signature.
    pub fn sign<S: Signer>(&mut self, signer: &S) -> ProtocolResult<()> {
        let plaintext = signable_plaintext(
            self.method()?.unwrap_or_default(),
            self.uuid()?.unwrap_or_default(),
            self.result_value("data")?,
        );
        let signature = signer
            .sign(&plaintext)
            .map_err(|err| ProtocolError::signing(err.to_string()))?;

        debug!(uuid = ?self.uuid().ok().flatten(), "signed notification response");
        self.set_signature(signature)
    }
}

impl Serialize for NotificationResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.payload.serialize(serializer)
    }
}
