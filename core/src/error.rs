//! Error types for the Todoist client.
//!
//! # Design
//! Every variant except `Configuration` carries the name of the operation
//! that failed (`"get projects"`, `"exchange code"`, ...) so a caller can log
//! the error without wrapping it again. Nothing here is retried; the caller
//! owns retry and backoff.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Why a request never produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// The configured client timeout elapsed.
    Timeout,
    /// The connection could not be established.
    Connect,
    /// The caller's cancellation token fired while the request was in flight.
    Cancelled,
    Other,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TransportKind::Timeout => "timeout",
            TransportKind::Connect => "connection error",
            TransportKind::Cancelled => "cancelled",
            TransportKind::Other => "transport error",
        };
        f.write_str(label)
    }
}

/// Errors returned by [`crate::Client`] and the [`crate::RestApi`] parsers.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing or invalid client configuration (credentials, endpoint URLs).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The request could not be assembled (bad URL, bad header value).
    #[error("{operation}: failed to build request: {message}")]
    RequestBuild {
        operation: &'static str,
        message: String,
    },

    /// The HTTP call did not complete.
    #[error("{operation}: failed to send HTTP request ({kind}): {message}")]
    Transport {
        operation: &'static str,
        kind: TransportKind,
        message: String,
    },

    /// The server answered with anything other than 200.
    #[error("{operation}: API error: got {status}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The response body could not be read to the end.
    #[error("{operation}: failed to read response body: {message}")]
    BodyRead {
        operation: &'static str,
        message: String,
    },

    /// The response body was not the JSON shape we expected.
    #[error("{operation}: unable to decode json response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// HTTP status of an [`ClientError::Api`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            ClientError::Transport {
                kind: TransportKind::Cancelled,
                ..
            }
        )
    }

    pub(crate) fn transport(operation: &'static str, err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportKind::Timeout
        } else if err.is_connect() {
            TransportKind::Connect
        } else {
            TransportKind::Other
        };
        ClientError::Transport {
            operation,
            kind,
            message: err.to_string(),
        }
    }

    pub(crate) fn cancelled(operation: &'static str) -> Self {
        ClientError::Transport {
            operation,
            kind: TransportKind::Cancelled,
            message: "request cancelled by caller".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_status() {
        let err = ClientError::Api {
            operation: "get projects",
            status: 403,
            body: String::new(),
        };
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.to_string(), "get projects: API error: got 403");
    }

    #[test]
    fn non_api_errors_have_no_status() {
        let err = ClientError::Configuration("client id is empty".to_string());
        assert_eq!(err.status(), None);
        assert!(!err.is_cancelled());
    }

    #[test]
    fn cancelled_is_a_transport_error() {
        let err = ClientError::cancelled("get tasks");
        assert!(err.is_cancelled());
        assert!(matches!(
            err,
            ClientError::Transport {
                operation: "get tasks",
                kind: TransportKind::Cancelled,
                ..
            }
        ));
    }

    #[test]
    fn decode_error_names_operation() {
        let source = serde_json::from_str::<Vec<u8>>("nope").unwrap_err();
        let err = ClientError::Decode {
            operation: "get tasks",
            source,
        };
        assert!(err.to_string().starts_with("get tasks: unable to decode json response"));
    }
}
