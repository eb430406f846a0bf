//! Typed resources for the cert-console backend
//!
//! Thin, typed wrappers over the client facade: wire models, list query
//! builders, and one module per backend resource. All recovery and
//! notification behavior lives in the facade; these functions only shape
//! requests and decode payloads.

pub mod auth;
pub mod certificates;
pub mod models;
pub mod query;
pub mod users;

use console_client::{ClassifiedError, ErrorKind};

/// Serialize a request body, folding an encoding failure into the
/// client's error shape.
pub(crate) fn to_body<T: serde::Serialize>(
    value: &T,
) -> Result<serde_json::Value, ClassifiedError> {
    serde_json::to_value(value).map_err(|e| ClassifiedError {
        kind: ErrorKind::Unknown,
        message: format!("encoding request body: {e}"),
    })
}
