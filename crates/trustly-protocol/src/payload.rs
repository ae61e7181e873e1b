//! The keyed JSON document every message type is built on.
//!
//! A [`Payload`] is the decoded JSON object of one envelope. Lookups follow
//! two rules shared by all documents:
//!
//! - a key that is missing or holds JSON `null` is absent (`None`), never an
//!   error;
//! - a node that exists but is not an object where an object is required is
//!   a [`ProtocolError::Data`].

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ProtocolError, ProtocolResult};

/// A JSON object.
pub type Object = Map<String, Value>;

/// Generic keyed JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload {
    root: Object,
}

impl Payload {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already decoded JSON object.
    pub fn from_object(root: Object) -> Self {
        Self { root }
    }

    /// The whole document.
    pub fn root(&self) -> &Object {
        &self.root
    }

    /// Mutable access to the whole document.
    pub fn root_mut(&mut self) -> &mut Object {
        &mut self.root
    }

    /// Consumes the document, returning the root object.
    pub fn into_object(self) -> Object {
        self.root
    }

    /// Returns the value stored under a top-level key.
    pub fn get(&self, name: &str) -> Option<&Value> {
        present(self.root.get(name))
    }

    /// Stores `value` under a top-level key, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.root.insert(name.into(), value.into());
    }

    /// Stores caller supplied text of unknown encoding under a top-level key.
    ///
    /// See [`ensure_utf8`].
    pub fn set_text(&mut self, name: impl Into<String>, raw: &[u8]) {
        self.set(name, ensure_utf8(raw).into_owned());
    }

    /// Removes a top-level key, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.root.remove(name).filter(|value| !value.is_null())
    }

    /// Walks `path` from the root.
    ///
    /// Every segment but the last must resolve to an object. A missing
    /// segment yields `Ok(None)`; a segment holding a scalar or array yields
    /// a data error naming it. An empty path names no value and yields
    /// `Ok(None)`; the whole document is [`Payload::root`].
    pub fn get_path(&self, path: &[&str]) -> ProtocolResult<Option<&Value>> {
        let Some((last, parents)) = path.split_last() else {
            return Ok(None);
        };

        let mut node = &self.root;
        for segment in parents {
            match as_object(node.get(*segment), segment)? {
                Some(child) => node = child,
                None => return Ok(None),
            }
        }
        Ok(present(node.get(*last)))
    }

    /// Returns a top-level string, failing if the value is of another type.
    ///
    /// `label` names the field in the error message.
    pub fn get_str(&self, name: &str, label: &str) -> ProtocolResult<Option<&str>> {
        as_str(self.get(name), label)
    }

    /// Returns a top-level object, failing if the value is of another type.
    pub(crate) fn get_object(&self, name: &str, label: &str) -> ProtocolResult<Option<&Object>> {
        as_object(self.get(name), label)
    }

    /// Returns the top-level object under `name`, creating it when absent.
    pub(crate) fn object_entry(&mut self, name: &str, label: &str) -> ProtocolResult<&mut Object> {
        object_entry(&mut self.root, name, label)
    }
}

impl From<Object> for Payload {
    fn from(root: Object) -> Self {
        Self::from_object(root)
    }
}

/// Normalizes text of unknown encoding to UTF-8.
///
/// Valid UTF-8 is borrowed unchanged. Anything else is taken to be
/// ISO-8859-1 and transcoded byte by byte, so the result is always
/// well-formed and no input is rejected. Values that are already a Rust
/// `str` or a non-string JSON value never need this.
pub fn ensure_utf8(raw: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(raw) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(raw.iter().map(|&byte| char::from(byte)).collect()),
    }
}

/// Treats JSON `null` like a missing key.
pub(crate) fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null())
}

/// Interprets a looked up value as an object.
pub(crate) fn as_object<'a>(
    value: Option<&'a Value>,
    label: &str,
) -> ProtocolResult<Option<&'a Object>> {
    match present(value) {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(ProtocolError::data(format!("{label} is not an object"))),
    }
}

/// Interprets a looked up value as a string.
pub(crate) fn as_str<'a>(value: Option<&'a Value>, label: &str) -> ProtocolResult<Option<&'a str>> {
    match present(value) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(_) => Err(ProtocolError::data(format!("{label} is not a string"))),
    }
}

/// Returns the object stored under `key` in `parent`, creating an empty one
/// when the key is absent or null.
pub(crate) fn object_entry<'a>(
    parent: &'a mut Object,
    key: &str,
    label: &str,
) -> ProtocolResult<&'a mut Object> {
    let slot = parent.entry(key).or_insert(Value::Null);
    if slot.is_null() {
        *slot = Value::Object(Object::new());
    }

    match slot {
        Value::Object(map) => Ok(map),
        _ => Err(ProtocolError::data(format!("{label} is not an object"))),
    }
}
