//! HTTP transport for the cert-console backend
//!
//! Defines the exchange value types (request, envelope, failure), the
//! `Transport` trait the client facade and refresh coordinator issue
//! exchanges through, and the reqwest-backed implementation. The trait is
//! the seam tests use to substitute deterministic fakes for the network.
//!
//! Session credentials live here too: `SessionStore` holds the bearer
//! token (optionally persisted across processes) and `HttpTransport`
//! attaches it to every exchange.

pub mod exchange;
pub mod http;
pub mod session;

pub use exchange::{ApiRequest, Envelope, ExchangeResult, Failure, Method};
pub use http::HttpTransport;
pub use session::{AccessToken, SessionStore};

use std::future::Future;
use std::pin::Pin;

/// Abstraction over the wire.
///
/// Issuing an exchange is the only suspension point in the client
/// pipeline; classification, refresh coordination, and notification all
/// run synchronously between polls.
///
/// Uses a `Pin<Box<dyn Future>>` return type for dyn-compatibility
/// (`Arc<dyn Transport>`).
pub trait Transport: Send + Sync {
    /// Issue one request/response round trip.
    fn execute<'a>(
        &'a self,
        request: &'a ApiRequest,
    ) -> Pin<Box<dyn Future<Output = ExchangeResult> + Send + 'a>>;
}
