//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while building, parsing or reading a document.
///
/// Callers are expected to branch on the kind: a version mismatch means the
/// peer speaks a protocol we do not, a connection error means the transport
/// failed, everything else is an unprocessable message.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Malformed, missing or wrongly typed structure.
    #[error("data error: {message}")]
    Data { message: String },

    /// The message parsed but declares a JSON-RPC version we do not speak.
    #[error(
        "JSON-RPC version {} is not supported",
        .found.as_deref().unwrap_or("(none)")
    )]
    UnsupportedVersion { found: Option<String> },

    /// The body could not be parsed and the transport reported a failure.
    #[error("connection error: HTTP {status}")]
    Connection { status: u16 },

    /// The signer or verifier collaborator failed.
    #[error("signing error: {message}")]
    Signing { message: String },

    /// Failed to serialize a document to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProtocolError {
    /// Creates a data error.
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data {
            message: message.into(),
        }
    }

    /// Creates a signing error.
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    /// Creates an unsupported version error.
    pub fn unsupported_version(found: Option<&str>) -> Self {
        Self::UnsupportedVersion {
            found: found.map(str::to_string),
        }
    }

    /// Returns true for malformed data, including JSON encode failures.
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. } | Self::Serialization(_))
    }

    /// Returns true for an unsupported protocol version.
    pub fn is_version(&self) -> bool {
        matches!(self, Self::UnsupportedVersion { .. })
    }

    /// Returns true for a transport level failure.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            ProtocolError::data("Params is not an object").to_string(),
            "data error: Params is not an object"
        );
        assert_eq!(
            ProtocolError::unsupported_version(Some("2.0")).to_string(),
            "JSON-RPC version 2.0 is not supported"
        );
        assert_eq!(
            ProtocolError::unsupported_version(None).to_string(),
            "JSON-RPC version (none) is not supported"
        );
        assert_eq!(
            ProtocolError::Connection { status: 502 }.to_string(),
            "connection error: HTTP 502"
        );
    }

    #[test]
    fn kinds_are_disjoint() {
        let data = ProtocolError::data("x");
        let version = ProtocolError::unsupported_version(None);
        let connection = ProtocolError::Connection { status: 500 };

        assert!(data.is_data() && !data.is_version() && !data.is_connection());
        assert!(version.is_version() && !version.is_data());
        assert!(connection.is_connection() && !connection.is_data());
        assert!(!ProtocolError::signing("no key").is_data());
    }
}
