//! User-facing failure notifications
//!
//! The gate stays silent until the first exchange succeeds — startup
//! probes against a not-yet-authenticated backend would otherwise greet
//! the user with a wall of errors. Once armed, every terminal failure is
//! reported exactly once. Distinct failures are not deduplicated; each
//! failed call that reaches the gate notifies.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error};

use crate::classify::ClassifiedError;
use crate::metrics;

/// Fallback text when no message is derivable from the failure.
const GENERIC_MESSAGE: &str = "Something went wrong";

/// Sink for user-visible error notifications (the toast analog).
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Default notifier: a structured error log line.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        error!(message, "request failed");
    }
}

/// Whether any exchange has ever completed successfully.
///
/// Set once by the first success; never reset within the process
/// lifetime. Gates both notifications and the fatal-reload decision.
#[derive(Default)]
pub struct SessionState {
    completed: AtomicBool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_completed(&self) {
        self.completed.store(true, Ordering::Relaxed);
    }

    pub fn has_completed_any_exchange(&self) -> bool {
        self.completed.load(Ordering::Relaxed)
    }
}

/// Notification policy wrapped around a `Notifier`.
pub struct NotificationGate {
    notifier: Arc<dyn Notifier>,
    state: Arc<SessionState>,
}

impl NotificationGate {
    pub fn new(notifier: Arc<dyn Notifier>, state: Arc<SessionState>) -> Self {
        Self { notifier, state }
    }

    /// Report one terminal failure.
    ///
    /// Suppressed entirely until the first successful exchange; after
    /// that, exactly one notification per call.
    pub fn report(&self, error: &ClassifiedError) {
        if !self.state.has_completed_any_exchange() {
            debug!(kind = error.kind.label(), "notification suppressed before first successful exchange");
            return;
        }
        let message = if error.message.trim().is_empty() {
            GENERIC_MESSAGE
        } else {
            &error.message
        };
        self.notifier.notify(message);
        metrics::record_notification(error.kind);
    }
}
