//! Failure classification
//!
//! Collapses every transport failure into one of five kinds plus a
//! non-empty message. The rules form a total priority order — a response
//! wins over a sent-but-unanswered request, which wins over a bare
//! fault — so every failure maps to exactly one kind.

use transport::Failure;

/// Message for a request that went out and got nothing back.
const NETWORK_MESSAGE: &str = "request made but no response received";

/// Message for a failure nothing else could be derived from.
const UNKNOWN_MESSAGE: &str = "something went wrong";

/// Kind of a classified failure.
///
/// `Unauthorized` is intercepted by the facade (refresh + replay); it
/// reaches callers only when the replay itself still fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Expired or invalid session (401)
    Unauthorized,
    /// Request sent, no response received
    Network,
    /// Backend fault (status >= 500)
    Server,
    /// Request rejected (other 4xx)
    Client,
    /// Unclassifiable fault
    Unknown,
}

impl ErrorKind {
    /// Kind label for metrics and logging.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Network => "network",
            ErrorKind::Server => "server",
            ErrorKind::Client => "client",
            ErrorKind::Unknown => "unknown",
        }
    }
}

/// Normalized failure descriptor handed to callers and the notification
/// gate. Derived per failure, never persisted.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Classify a failed exchange.
pub fn classify(failure: &Failure) -> ClassifiedError {
    match failure {
        Failure::Status {
            status,
            status_text,
            body,
        } => {
            let kind = if *status >= 500 {
                ErrorKind::Server
            } else if *status == 401 {
                ErrorKind::Unauthorized
            } else {
                ErrorKind::Client
            };
            let message = body.as_ref().and_then(body_message).unwrap_or_else(|| {
                if status_text.is_empty() {
                    format!("HTTP {status}")
                } else {
                    status_text.clone()
                }
            });
            ClassifiedError { kind, message }
        }
        Failure::NoResponse { .. } => ClassifiedError {
            kind: ErrorKind::Network,
            message: NETWORK_MESSAGE.into(),
        },
        Failure::Fault { message } if !message.trim().is_empty() => ClassifiedError {
            kind: ErrorKind::Unknown,
            message: message.clone(),
        },
        Failure::Fault { .. } => ClassifiedError {
            kind: ErrorKind::Unknown,
            message: UNKNOWN_MESSAGE.into(),
        },
    }
}

/// The `message` field of a response body, at the top level or nested
/// under the backend's `data` envelope. Empty strings don't count.
fn body_message(body: &serde_json::Value) -> Option<String> {
    body.get("message")
        .and_then(|m| m.as_str())
        .or_else(|| {
            body.get("data")
                .and_then(|d| d.get("message"))
                .and_then(|m| m.as_str())
        })
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
}
