//! Client pipeline counters
//!
//! - `client_exchanges_total` (counter): label `outcome`
//! - `client_refreshes_total` (counter): label `outcome`
//! - `client_notifications_total` (counter): label `kind`
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! the calls are no-ops, so library users opt in by installing one.

use crate::classify::ErrorKind;

/// Record a settled exchange (initial attempt or replay).
pub(crate) fn record_exchange(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!("client_exchanges_total", "outcome" => outcome).increment(1);
}

/// Record a settled refresh attempt.
pub(crate) fn record_refresh(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!("client_refreshes_total", "outcome" => outcome).increment(1);
}

/// Record a user-visible notification.
pub(crate) fn record_notification(kind: ErrorKind) {
    metrics::counter!("client_notifications_total", "kind" => kind.label()).increment(1);
}
