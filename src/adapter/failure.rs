// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Broker failure responses.

use std::fmt;

use serde::Deserialize;

/// Well-formed HTTP response carrying an error status
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerError {
    pub status_code: u16,
    /// Human description chosen by the call site for this status code
    pub description: String,
    /// Raw response body, kept for diagnostics
    pub body: String,
    pub detail: FailureDetail,
}

/// Outcome of parsing the provider error envelope out of a failure body
#[derive(Debug, Clone, PartialEq)]
pub enum FailureDetail {
    Structured(GcpError),
    Opaque,
}

/// Nested `{"error": {...}}` envelope returned by Google APIs
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GcpError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub details: Vec<ErrorDetail>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Deserialize)]
struct FailureResponseBody {
    error: Option<GcpError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 400
    MalformedRequest,
    /// 409, resource exists with different attributes
    Conflict,
    /// 410
    Gone,
    /// 422, the broker rejected the requested sync/async mode
    AsyncRequired,
    Other,
}

impl FailureKind {
    pub fn from_status(status_code: u16) -> Self {
        match status_code {
            400 => FailureKind::MalformedRequest,
            409 => FailureKind::Conflict,
            410 => FailureKind::Gone,
            422 => FailureKind::AsyncRequired,
            _ => FailureKind::Other,
        }
    }
}

impl BrokerError {
    /// Build an error from a failure response. A body that is not a provider envelope is kept
    /// verbatim as an opaque failure.
    pub fn from_response(status_code: u16, body: &[u8], description: impl Into<String>) -> Self {
        let detail = match serde_json::from_slice::<FailureResponseBody>(body) {
            Ok(FailureResponseBody { error: Some(err) }) => FailureDetail::Structured(err),
            _ => FailureDetail::Opaque,
        };

        Self {
            status_code,
            description: description.into(),
            body: String::from_utf8_lossy(body).into_owned(),
            detail,
        }
    }

    pub fn kind(&self) -> FailureKind {
        FailureKind::from_status(self.status_code)
    }

    pub fn gcp_error(&self) -> Option<&GcpError> {
        match &self.detail {
            FailureDetail::Structured(err) => Some(err),
            FailureDetail::Opaque => None,
        }
    }
}

impl fmt::Display for BrokerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = if self.description.is_empty() {
            "<nil>"
        } else {
            &self.description
        };
        write!(f, "StatusCode: {}\n Description: {}", self.status_code, description)?;
        if let Some(err) = self.gcp_error().filter(|e| !e.message.is_empty()) {
            write!(f, "\n Message: {}", err.message)?;
        }
        write!(f, "\n Details: {}", self.body)
    }
}

impl std::error::Error for BrokerError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_gcp_error() {
        let body = br#"{"error":{"code":409,"message":"already exists","status":"ALREADY_EXISTS","details":[{"detail":"instance i1"}]}}"#;

        let err = BrokerError::from_response(409, body, "instance with the same id but different attributes already exists");

        let gcp = err.gcp_error().unwrap();
        assert_eq!(gcp.code, 409);
        assert_eq!(gcp.status, "ALREADY_EXISTS");
        assert_eq!(gcp.details[0].detail.as_deref(), Some("instance i1"));
        assert_eq!(err.kind(), FailureKind::Conflict);
        assert!(err.to_string().contains("Message: already exists"));
    }

    #[test]
    fn test_non_json_body_is_opaque() {
        let err = BrokerError::from_response(500, b"<html>oops</html>", "request was not successful");

        assert_eq!(err.detail, FailureDetail::Opaque);
        assert_eq!(err.body, "<html>oops</html>");
        assert_eq!(err.description, "request was not successful");
        assert_eq!(
            err.to_string(),
            "StatusCode: 500\n Description: request was not successful\n Details: <html>oops</html>"
        );
    }

    #[test]
    fn test_json_without_envelope_is_opaque() {
        let err = BrokerError::from_response(400, br#"{"description":"bad"}"#, "request was malformed or missing mandatory data");

        assert_eq!(err.detail, FailureDetail::Opaque);
        assert_eq!(err.kind(), FailureKind::MalformedRequest);
    }

    #[test]
    fn test_envelope_with_unexpected_shape_is_opaque() {
        let err = BrokerError::from_response(422, br#"{"error":"AsyncRequired"}"#, "the broker only supports asynchronous requests");

        assert_eq!(err.detail, FailureDetail::Opaque);
        assert_eq!(err.kind(), FailureKind::AsyncRequired);
    }

    #[test]
    fn test_empty_description_prints_nil() {
        let err = BrokerError::from_response(410, b"", "");
        assert!(err.to_string().contains("Description: <nil>"));
        assert_eq!(err.kind(), FailureKind::Gone);
    }
}
