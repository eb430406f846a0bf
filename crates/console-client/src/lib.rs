//! Shared HTTP client core for the cert-console apps
//!
//! Everything user-facing talks to the backend through `ApiClient`:
//!
//! 1. A request is issued through the `Transport`.
//! 2. A 401 means the session expired: the first request to notice it
//!    starts one refresh exchange, every concurrently failing request
//!    joins that same attempt, and each failed request is replayed
//!    exactly once after the refresh settles.
//! 3. Terminal failures are classified into a closed taxonomy and
//!    reported to the user at most once each — and not at all before the
//!    first exchange has ever succeeded.
//! 4. A refresh failure after authenticated use fires the reload hook:
//!    the session is gone and only a restart brings it back.

pub mod classify;
pub mod client;
mod metrics;
pub mod notify;
pub mod refresh;

pub use classify::{ClassifiedError, ErrorKind, classify};
pub use client::{ApiClient, NoopReload, ReloadHook};
pub use notify::{LogNotifier, NotificationGate, Notifier, SessionState};
pub use refresh::{RefreshCoordinator, RefreshError};
