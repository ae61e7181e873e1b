//! Canonical plaintext for message signatures and the signer interfaces.
//!
//! The API signs `method ++ uuid ++ serialize(data)` where `serialize`
//! flattens the data section into a single string:
//!
//! - objects: keys in ascending order, each written as key then value;
//! - arrays: items concatenated in order;
//! - `null` and `false`: nothing; `true`: `1`;
//! - numbers: their JSON text; strings: verbatim.
//!
//! The RSA implementation lives outside this crate behind [`Signer`] and
//! [`Verifier`].

use std::fmt::Display;

use serde_json::Value;

/// Produces signatures for outgoing documents.
pub trait Signer {
    /// Error reported by the signing backend.
    type Error: Display;

    /// Signs the canonical plaintext, returning the encoded signature.
    fn sign(&self, plaintext: &[u8]) -> Result<String, Self::Error>;
}

/// Checks signatures on incoming documents.
pub trait Verifier {
    /// Error reported by the verification backend.
    type Error: Display;

    /// Returns whether `signature` is valid for `plaintext`.
    fn verify(&self, plaintext: &[u8], signature: &str) -> Result<bool, Self::Error>;
}

/// Flattens a data section into its canonical string form.
pub fn serialize_data(data: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, data);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null | Value::Bool(false) => {}
        Value::Bool(true) => out.push('1'),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::String(text) => out.push_str(text),
        Value::Array(items) => {
            for item in items {
                write_value(out, item);
            }
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                out.push_str(key);
                write_value(out, &map[key]);
            }
        }
    }
}

/// Builds the bytes a signature is computed over.
pub fn signable_plaintext(method: &str, uuid: &str, data: Option<&Value>) -> Vec<u8> {
    let mut plaintext = String::with_capacity(method.len() + uuid.len());
    plaintext.push_str(method);
    plaintext.push_str(uuid);
    if let Some(data) = data {
        write_value(&mut plaintext, data);
    }
    plaintext.into_bytes()
}

#[cfg(test)]
pub(crate) mod testing {
    //! Deterministic signer used across the crate's tests.

    use super::*;

    /// "Signs" by reversing the plaintext; verifies by doing it again.
    pub struct ReversingSigner;

    impl Signer for ReversingSigner {
        type Error = String;

        fn sign(&self, plaintext: &[u8]) -> Result<String, String> {
            Ok(String::from_utf8_lossy(plaintext).chars().rev().collect())
        }
    }

    impl Verifier for ReversingSigner {
        type Error = String;

        fn verify(&self, plaintext: &[u8], signature: &str) -> Result<bool, String> {
            Ok(self.sign(plaintext)? == signature)
        }
    }

    /// Always fails, for exercising error propagation.
    pub struct BrokenSigner;

    impl Signer for BrokenSigner {
        type Error = &'static str;

        fn sign(&self, _plaintext: &[u8]) -> Result<String, &'static str> {
            Err("no private key loaded")
        }
    }

    impl Verifier for BrokenSigner {
        type Error = &'static str;

        fn verify(&self, _plaintext: &[u8], _signature: &str) -> Result<bool, &'static str> {
            Err("no public key loaded")
        }
    }
}
