//! JSON-RPC 1.1 message documents for the Trustly API.
//!
//! Four document types share one keyed JSON [`Payload`]:
//!
//! - [`JsonRpcRequest`]: an outgoing signed call;
//! - [`Response`]: the API's answer to a call;
//! - [`NotificationRequest`]: a notification pushed by the API;
//! - [`NotificationResponse`]: our acknowledgement of a notification.
//!
//! Every accessor checks that the sections it walks through are JSON
//! objects. Missing values come back as `None`; a section of the wrong type
//! is a [`ProtocolError::Data`]. Transport and the RSA signer stay outside
//! this crate: bodies come in as bytes, documents go out through
//! [`encode_document`], and signatures are produced through the [`Signer`]
//! and [`Verifier`] traits.
//!
//! # Example
//!
//! ```rust
//! use trustly_protocol::{NotificationRequest, NotificationResponse, encode_document};
//!
//! let body = r#"{
//!     "method": "credit",
//!     "params": {"uuid": "u-1", "signature": "...", "data": {"amount": "1.00"}},
//!     "version": "1.1"
//! }"#;
//!
//! let notification = NotificationRequest::from_body(body).unwrap();
//! let ack = NotificationResponse::new(&notification, Some(true)).unwrap();
//! let bytes = encode_document(&ack).unwrap();
//! assert!(bytes.starts_with(br#"{"result":{"data":{"status":"OK"}"#));
//! ```

mod error;
mod notification_request;
mod notification_response;
mod payload;
mod request;
mod response;
mod signing;
mod wire;

pub use error::{ProtocolError, ProtocolResult};
pub use notification_request::NotificationRequest;
pub use notification_response::{NotificationResponse, STATUS_FAILED, STATUS_OK};
pub use payload::{Object, Payload, ensure_utf8};
pub use request::JsonRpcRequest;
pub use response::{Response, ResultBranch};
pub use signing::{Signer, Verifier, serialize_data, signable_plaintext};
pub use wire::{encode_document, encode_document_string};

/// JSON-RPC version spoken by the API.
pub const PROTOCOL_VERSION: &str = "1.1";

/// Transport status of a successful call.
pub const SUCCESS_STATUS: u16 = 200;
