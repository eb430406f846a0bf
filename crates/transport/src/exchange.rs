//! Exchange value types
//!
//! An `ApiRequest` is captured once with everything needed to issue it.
//! The facade replays a failed request verbatim after a session refresh,
//! so nothing about a request may depend on the attempt that carries it.
//!
//! A failed exchange collapses into one of three shapes: a response with
//! a non-success status, a request that got no response at all, or a
//! fault that happened before anything reached the wire. The error
//! classifier consumes exactly these three.

use serde_json::Value;

/// HTTP methods the backend API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fully-described exchange: method, path, query, headers, body.
///
/// Immutable value. `Clone` is the replay mechanism — a clone reissues
/// the exchange byte-for-byte.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured base URL, leading slash included.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_query_pairs(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A successful exchange. `data` is the parsed response body
/// (`Value::Null` when the body was empty). The facade hands callers
/// `data` only; the status never leaves the client layer.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub status: u16,
    pub data: Value,
}

/// A failed exchange.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Failure {
    /// A response arrived carrying a non-success status.
    #[error("server responded {status} {status_text}")]
    Status {
        status: u16,
        /// Canonical reason phrase ("Unauthorized", "Bad Gateway", ...).
        status_text: String,
        /// Response body, when it parsed as JSON.
        body: Option<Value>,
    },

    /// The request went out but no response came back (connection error,
    /// timeout, truncated body).
    #[error("no response received: {detail}")]
    NoResponse { detail: String },

    /// Failed before or outside the HTTP exchange itself. An empty
    /// message is allowed; the classifier substitutes its generic text.
    #[error("request failed: {message}")]
    Fault { message: String },
}

impl Failure {
    /// Response status, when a response arrived at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Failure::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this failure is an expired/invalid-session rejection.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Result alias for one exchange.
pub type ExchangeResult = std::result::Result<Envelope, Failure>;
