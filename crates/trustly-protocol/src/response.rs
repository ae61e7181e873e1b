//! Responses to outgoing API calls.

use std::borrow::Cow;

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::SUCCESS_STATUS;
use crate::error::{ProtocolError, ProtocolResult};
use crate::payload::{Object, Payload, as_str, ensure_utf8, present};
use crate::signing::{Verifier, signable_plaintext};
use crate::wire::{decode_value, into_payload, is_blank};

/// Which top-level section a response was bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultBranch {
    /// `result`: the call went through.
    Result,
    /// `error`: the API rejected the call.
    Error,
}

impl ResultBranch {
    /// The top-level key of the section.
    pub fn key(self) -> &'static str {
        match self {
            Self::Result => "result",
            Self::Error => "error",
        }
    }
}

/// A parsed API response.
///
/// Construction binds the `result` section, or the `error` section when
/// there is no `result`; the `result_*` accessors read from that section.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    payload: Payload,
    body: Vec<u8>,
    status: Option<u16>,
    branch: ResultBranch,
    result: Object,
}

impl Response {
    /// Parses a raw response body.
    ///
    /// An undecodable body is a [`ProtocolError::Connection`] when the
    /// transport reported a status other than 200, and a data error
    /// otherwise. A body without a `result` or `error` object is a data
    /// error.
    pub fn from_body(body: impl Into<Vec<u8>>, status: Option<u16>) -> ProtocolResult<Self> {
        let body = body.into();

        let decoded = decode_value(&body);
        let value = match decoded {
            Ok(value) if !is_blank(&value) => value,
            failed => {
                if let Some(code) = status.filter(|code| *code != SUCCESS_STATUS) {
                    warn!(status = code, "undecodable response from failed call");
                    return Err(ProtocolError::Connection { status: code });
                }
                let reason = match failed {
                    Err(err) => err.to_string(),
                    Ok(_) => "empty document".to_string(),
                };
                return Err(ProtocolError::data(format!(
                    "Failed to decode response JSON: {reason}"
                )));
            }
        };

        let payload = into_payload(value);
        let (branch, result) = match (payload.get("result"), payload.get("error")) {
            (Some(Value::Object(result)), _) => (ResultBranch::Result, result.clone()),
            (_, Some(Value::Object(error))) => (ResultBranch::Error, error.clone()),
            _ => return Err(ProtocolError::data("No result or error in response")),
        };

        debug!(?status, branch = branch.key(), "parsed response");
        Ok(Self {
            payload,
            body,
            status,
            branch,
            result,
        })
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

    /// The transport status code, if one was supplied.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// The section bound at construction.
    pub fn branch(&self) -> ResultBranch {
        self.branch
    }

    /// Whether the document has a top-level `error`.
    ///
    /// This only tests for the key: a document carrying both `result` and
    /// `error` reports true here and from [`Response::is_success`].
    pub fn is_error(&self) -> bool {
        self.payload.get("error").is_some()
    }

    /// Whether the document has a top-level `result`.
    ///
    /// Not a guarantee that the call succeeded, see [`Response::is_error`].
    pub fn is_success(&self) -> bool {
        self.payload.get("result").is_some()
    }

    /// The bound section.
    pub fn result(&self) -> &Object {
        &self.result
    }

    /// One value from the bound section.
    pub fn result_value(&self, name: &str) -> Option<&Value> {
        present(self.result().get(name))
    }

    /// The error message, for error responses.
    pub fn error_message(&self) -> ProtocolResult<Option<&str>> {
        if !self.is_error() {
            return Ok(None);
        }
        as_str(self.result_value("message"), "Message")
    }

    /// The numeric error code, for error responses.
    pub fn error_code(&self) -> ProtocolResult<Option<i64>> {
        if !self.is_error() {
            return Ok(None);
        }
        match self.result_value("code") {
            None => Ok(None),
            Some(code) => code
                .as_i64()
                .map(Some)
                .ok_or_else(|| ProtocolError::data("Code is not an integer")),
        }
    }

    /// The call identifier echoed back by the API.
    pub fn uuid(&self) -> ProtocolResult<Option<&str>> {
        as_str(self.result_value("uuid"), "UUID")
    }

    /// The method the response belongs to.
    pub fn method(&self) -> ProtocolResult<Option<&str>> {
        as_str(self.result_value("method"), "Method")
    }

    /// The API's signature over the bound section.
    pub fn signature(&self) -> ProtocolResult<Option<&str>> {
        as_str(self.result_value("signature"), "Signature")
    }

    /// Checks the API's signature over `method ++ uuid ++ serialize(data)`
    /// of the bound section.
    pub fn verify<V: Verifier>(&self, verifier: &V) -> ProtocolResult<bool> {
        let signature = self
            .signature()?
            .ok_or_else(|| ProtocolError::data("Response is not signed"))?;
        let plaintext = signable_plaintext(
            self.method()?.unwrap_or_default(),
            self.uuid()?.unwrap_or_default(),
            self.result_value("data"),
        );
        verifier
            .verify(&plaintext, signature)
            .map_err(|err| ProtocolError::signing(err.to_string()))
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.payload.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::testing::{BrokenSigner, ReversingSigner};
    use crate::signing::Signer;
    use serde_json::json;

    fn parse(value: Value) -> ProtocolResult<Response> {
        Response::from_body(value.to_string(), Some(200))
    }

    #[test]
    fn binds_result_section() {
        let response = parse(json!({
            "result": {"uuid": "u-1", "method": "Deposit", "data": {"orderid": "1"}},
            "version": "1.1",
        }))
        .unwrap();

        assert_eq!(response.branch(), ResultBranch::Result);
        assert!(response.is_success());
        assert!(!response.is_error());
        assert_eq!(
            Value::Object(response.result().clone()),
            json!({"uuid": "u-1", "method": "Deposit", "data": {"orderid": "1"}})
        );
        assert_eq!(response.uuid().unwrap(), Some("u-1"));
        assert_eq!(response.method().unwrap(), Some("Deposit"));
        assert_eq!(response.result_value("data"), Some(&json!({"orderid": "1"})));
        assert_eq!(response.error_message().unwrap(), None);
        assert_eq!(response.error_code().unwrap(), None);
        assert_eq!(response.status(), Some(200));
    }

    #[test]
    fn binds_error_section() {
        let response = parse(json!({
            "error": {"message": "ERROR_INVALID_CREDENTIALS", "code": 616, "name": "JSONRPCError"},
            "version": "1.1",
        }))
        .unwrap();

        assert_eq!(response.branch(), ResultBranch::Error);
        assert!(response.is_error());
        assert!(!response.is_success());
        assert_eq!(response.error_message().unwrap(), Some("ERROR_INVALID_CREDENTIALS"));
        assert_eq!(response.error_code().unwrap(), Some(616));
        assert_eq!(response.result_value("name"), Some(&json!("JSONRPCError")));
    }

    #[test]
    fn error_fields_are_type_checked() {
        let response = parse(json!({"error": {"message": 1, "code": "616"}})).unwrap();
        assert!(response.error_message().unwrap_err().is_data());
        assert_eq!(
            response.error_code().unwrap_err().to_string(),
            "data error: Code is not an integer"
        );

        let response = parse(json!({"error": {"code": 6.5}})).unwrap();
        assert!(response.error_code().unwrap_err().is_data());
    }

    #[test]
    fn typed_accessors_reject_wrong_types() {
        let response = parse(json!({
            "result": {"uuid": 1, "method": ["Deposit"], "signature": true},
        }))
        .unwrap();

        assert_eq!(
            response.uuid().unwrap_err().to_string(),
            "data error: UUID is not a string"
        );
        assert!(response.method().unwrap_err().is_data());
        assert!(response.signature().unwrap_err().is_data());
        assert!(response.verify(&ReversingSigner).unwrap_err().is_data());
    }

    #[test]
    fn bound_section_matches_document() {
        let response = parse(json!({"error": {"message": "x", "code": 1}})).unwrap();
        assert_eq!(
            response.payload().get(response.branch().key()),
            Some(&Value::Object(response.result().clone()))
        );
    }

    #[test]
    fn garbage_with_failed_status_is_connection_error() {
        let err = Response::from_body("<html>Bad Gateway</html>", Some(500)).unwrap_err();
        assert!(matches!(err, ProtocolError::Connection { status: 500 }));
    }

    #[test]
    fn garbage_with_ok_status_is_data_error() {
        let err = Response::from_body("<html>Bad Gateway</html>", Some(200)).unwrap_err();
        assert!(err.is_data());
        assert!(err.to_string().contains("Failed to decode response JSON"));

        let err = Response::from_body("not json", None).unwrap_err();
        assert!(err.is_data());
    }

    #[test]
    fn blank_document_counts_as_undecodable() {
        let err = Response::from_body("{}", Some(503)).unwrap_err();
        assert!(err.is_connection());

        let err = Response::from_body("null", Some(200)).unwrap_err();
        assert!(err.is_data());
    }

    #[test]
    fn valid_json_with_failed_status_uses_payload() {
        let response = Response::from_body(
            json!({"error": {"message": "nope", "code": 620}}).to_string(),
            Some(500),
        )
        .unwrap();
        assert_eq!(response.error_code().unwrap(), Some(620));
    }

    #[test]
    fn missing_sections_are_data_error() {
        for body in [
            json!({"version": "1.1"}),
            json!({"result": "OK"}),
            json!({"error": [1, 2]}),
            json!([{"result": {}}]),
        ] {
            let err = parse(body).unwrap_err();
            assert_eq!(err.to_string(), "data error: No result or error in response");
        }
    }

    #[test]
    fn both_sections_report_both_flags() {
        let response = parse(json!({"result": {"a": 1}, "error": {"message": "x"}})).unwrap();
        assert!(response.is_success());
        assert!(response.is_error());
        assert_eq!(response.branch(), ResultBranch::Result);
        // bound to result, which carries no message
        assert_eq!(response.error_message().unwrap(), None);
    }

    #[test]
    fn scalar_result_falls_back_to_error() {
        let response = parse(json!({"result": 1, "error": {"message": "x"}})).unwrap();
        assert_eq!(response.branch(), ResultBranch::Error);
        assert_eq!(response.error_message().unwrap(), Some("x"));
    }

    #[test]
    fn keeps_raw_body() {
        let raw = r#"{"result": {"uuid": "u-1"}}"#;
        let response = Response::from_body(raw, None).unwrap();
        assert_eq!(response.body(), raw.as_bytes());
        assert_eq!(response.body_text(), raw);
        assert_eq!(response.status(), None);
    }

    #[test]
    fn verify_checks_signature() {
        let plaintext = signable_plaintext("Deposit", "u-1", Some(&json!({"orderid": "1"})));
        let signature = ReversingSigner.sign(&plaintext).unwrap();
        let response = parse(json!({
            "result": {
                "uuid": "u-1",
                "method": "Deposit",
                "signature": signature.clone(),
                "data": {"orderid": "1"},
            }
        }))
        .unwrap();
        assert!(response.verify(&ReversingSigner).unwrap());

        let tampered = parse(json!({
            "result": {
                "uuid": "u-1",
                "method": "Deposit",
                "signature": signature,
                "data": {"orderid": "2"},
            }
        }))
        .unwrap();
        assert!(!tampered.verify(&ReversingSigner).unwrap());
    }

    #[test]
    fn verify_requires_signature() {
        let response = parse(json!({"result": {"uuid": "u-1"}})).unwrap();
        assert!(response.verify(&ReversingSigner).unwrap_err().is_data());

        let response = parse(json!({"result": {"signature": "s"}})).unwrap();
        assert!(matches!(
            response.verify(&BrokenSigner),
            Err(ProtocolError::Signing { .. })
        ));
    }
}
