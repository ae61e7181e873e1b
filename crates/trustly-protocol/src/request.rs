//! Outgoing signed API calls.
//!
//! ```text
//! {
//!   "method": "Deposit",
//!   "params": {
//!     "UUID": "...",
//!     "Signature": "...",
//!     "Data": { ..., "Attributes": { ... } }
//!   },
//!   "version": "1.1"
//! }
//! ```

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::PROTOCOL_VERSION;
use crate::error::{ProtocolError, ProtocolResult};
use crate::payload::{Object, Payload, as_object, as_str, object_entry, present};
use crate::signing::{Signer, signable_plaintext};

/// An outgoing JSON-RPC call.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcRequest {
    payload: Payload,
}

impl JsonRpcRequest {
    /// Builds a call envelope.
    ///
    /// `attributes`, when given, is nested under `Data.Attributes`; an empty
    /// `Data` is created to hold it if no `data` was passed.
    pub fn new(method: Option<&str>, data: Option<Object>, attributes: Option<Object>) -> Self {
        let mut params = Object::new();

        if data.is_some() || attributes.is_some() {
            let mut data = data.unwrap_or_default();
            if let Some(attributes) = attributes {
                data.insert("Attributes".to_string(), Value::Object(attributes));
            }
            params.insert("Data".to_string(), Value::Object(data));
        }

        let mut payload = Payload::new();
        if let Some(method) = method {
            payload.set("method", method);
        }
        payload.set("params", params);
        payload.set("version", PROTOCOL_VERSION);

        debug!(method = ?method, "built request");
        Self { payload }
    }

    /// Builds an empty call for `method`.
    pub fn with_method(method: &str) -> Self {
        Self::new(Some(method), None, None)
    }

    /// The underlying document.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Mutable access to the underlying document.
    pub fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }

    fn params_mut(&mut self) -> ProtocolResult<&mut Object> {
        self.payload.object_entry("params", "Params")
    }

    fn params(&self) -> ProtocolResult<Option<&Object>> {
        self.payload.get_object("params", "Params")
    }

    /// Sets a value directly under `params`.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<Value>) -> ProtocolResult<()> {
        self.params_mut()?.insert(name.into(), value.into());
        Ok(())
    }

    /// Returns a value directly under `params`.
    pub fn param(&self, name: &str) -> ProtocolResult<Option<&Value>> {
        Ok(self.params()?.and_then(|params| present(params.get(name))))
    }

    /// Removes a value from `params`, returning what was there.
    ///
    /// Unlike the getters this requires the section: a request whose
    /// `params` was removed or nulled is a data error.
    pub fn pop_param(&mut self, name: &str) -> ProtocolResult<Option<Value>> {
        match self.payload.root_mut().get_mut("params") {
            Some(Value::Object(params)) => Ok(params.remove(name).filter(|v| !v.is_null())),
            _ => Err(ProtocolError::data("Params is not an object")),
        }
    }

    /// Sets the call identifier.
    pub fn set_uuid(&mut self, uuid: impl Into<String>) -> ProtocolResult<()> {
        self.set_param("UUID", uuid.into())
    }

    /// Returns the call identifier.
    pub fn uuid(&self) -> ProtocolResult<Option<&str>> {
        as_str(self.param("UUID")?, "UUID")
    }

    /// Seeds a random v4 call identifier unless one is already set, and
    /// returns the identifier in effect.
    pub fn assign_uuid(&mut self) -> ProtocolResult<String> {
        if let Some(uuid) = self.uuid()? {
            return Ok(uuid.to_string());
        }
        let uuid = Uuid::new_v4().to_string();
        self.set_uuid(uuid.clone())?;
        Ok(uuid)
    }

    /// Sets the API method.
    pub fn set_method(&mut self, method: impl Into<String>) {
        self.payload.set("method", method.into());
    }

    /// Returns the API method.
    pub fn method(&self) -> ProtocolResult<Option<&str>> {
        self.payload.get_str("method", "Method")
    }

    /// Returns the envelope version, always `1.1` unless overwritten.
    pub fn version(&self) -> ProtocolResult<Option<&str>> {
        self.payload.get_str("version", "Version")
    }

    /// Sets a value in `params.Data`, creating the section if needed.
    pub fn set_data(&mut self, name: impl Into<String>, value: impl Into<Value>) -> ProtocolResult<()> {
        let data = object_entry(self.params_mut()?, "Data", "Data")?;
        data.insert(name.into(), value.into());
        Ok(())
    }

    /// Returns the whole `params.Data` section.
    pub fn data(&self) -> ProtocolResult<Option<&Object>> {
        as_object(self.param("Data")?, "Data")
    }

    /// Returns one value from `params.Data`.
    pub fn data_value(&self, name: &str) -> ProtocolResult<Option<&Value>> {
        Ok(self.data()?.and_then(|data| present(data.get(name))))
    }

    /// Sets a value in `params.Data.Attributes`, creating both sections if
    /// needed.
    pub fn set_attribute(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> ProtocolResult<()> {
        let data = object_entry(self.params_mut()?, "Data", "Data")?;
        let attributes = object_entry(data, "Attributes", "Attributes")?;
        attributes.insert(name.into(), value.into());
        Ok(())
    }

    /// Returns one value from `params.Data.Attributes`.
    ///
    /// Unlike the other accessors this never fails: a missing or mistyped
    /// section along the way reads as absent.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        let attributes = self
            .payload
            .get("params")?
            .get("Data")?
            .get("Attributes")?
            .as_object()?;
        present(attributes.get(name))
    }

    /// Signs the call in place.
    ///
    /// Assigns a call identifier if there is none, signs
    /// `method ++ UUID ++ serialize(Data)` and stores the result in
    /// `params.Signature`.
    pub fn sign<S: Signer>(&mut self, signer: &S) -> ProtocolResult<()> {
        let uuid = self.assign_uuid()?;
        let method = self
            .method()?
            .ok_or_else(|| ProtocolError::data("Cannot sign a request without a method"))?;
        let data = self.param("Data")?;
        let plaintext = signable_plaintext(method, &uuid, data);

        let signature = signer
            .sign(&plaintext)
            .map_err(|err| ProtocolError::signing(err.to_string()))?;

        debug!(method, uuid = %uuid, "signed request");
        self.set_param("Signature", signature)
    }

    /// Returns the signature, if the call has been signed.
    pub fn signature(&self) -> ProtocolResult<Option<&str>> {
        as_str(self.param("Signature")?, "Signature")
    }
}

impl Serialize for JsonRpcRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.payload.serialize(serializer)
    }
}
