//! Client facade
//!
//! The one entry point for talking to the backend. Every call runs the
//! same pipeline: issue the exchange; on success unwrap the payload; on
//! an expired session run one shared refresh and replay the request
//! exactly once; classify and report everything terminal.
//!
//! All coordination state (the outstanding refresh attempt, the
//! first-success flag) is owned by the client instance rather than
//! ambient globals — two clients never interfere, and tests build as
//! many as they like.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::de::DeserializeOwned;
use tracing::{Instrument, debug, warn};

use transport::{ApiRequest, Envelope, Failure, SessionStore, Transport};

use crate::classify::{ClassifiedError, ErrorKind, classify};
use crate::metrics;
use crate::notify::{LogNotifier, NotificationGate, Notifier, SessionState};
use crate::refresh::RefreshCoordinator;

/// Hook fired when the session is lost beyond recovery — the refresh
/// failed after this client had already completed authenticated work.
/// The full-application-reload analog: a browser reloads the page, the
/// CLI clears its persisted session and exits.
pub trait ReloadHook: Send + Sync {
    fn reload(&self);
}

/// Default hook for embedders that cannot restart themselves: log and
/// carry on. The failed call still returns its classified error.
pub struct NoopReload;

impl ReloadHook for NoopReload {
    fn reload(&self) {
        warn!("unrecoverable session loss and no reload hook installed");
    }
}

/// Facade over transport, refresh coordination, classification, and
/// notification.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session_store: Arc<SessionStore>,
    state: Arc<SessionState>,
    coordinator: RefreshCoordinator,
    gate: NotificationGate,
    reload: Arc<dyn ReloadHook>,
    /// A lost session is terminal; the hook fires once no matter how
    /// many in-flight requests observed the failed refresh.
    reload_fired: AtomicBool,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        session_store: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        reload: Arc<dyn ReloadHook>,
    ) -> Self {
        let state = Arc::new(SessionState::new());
        Self {
            coordinator: RefreshCoordinator::new(
                Arc::clone(&transport),
                Arc::clone(&session_store),
            ),
            gate: NotificationGate::new(notifier, Arc::clone(&state)),
            transport,
            session_store,
            state,
            reload,
            reload_fired: AtomicBool::new(false),
        }
    }

    /// Client with the default log notifier and no-op reload hook.
    pub fn with_defaults(transport: Arc<dyn Transport>, session_store: Arc<SessionStore>) -> Self {
        Self::new(
            transport,
            session_store,
            Arc::new(LogNotifier),
            Arc::new(NoopReload),
        )
    }

    /// The session store this client authenticates through.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session_store
    }

    /// Send a request through the full pipeline.
    ///
    /// On success the caller receives the response payload only — never
    /// the envelope, whatever the payload is (null and empty included).
    pub async fn send(&self, request: ApiRequest) -> Result<serde_json::Value, ClassifiedError> {
        let exchange_id = format!("ex_{}", uuid::Uuid::new_v4().as_simple());
        let span = tracing::info_span!(
            "exchange",
            id = %exchange_id,
            method = %request.method,
            path = %request.path,
        );
        self.send_inner(request).instrument(span).await
    }

    async fn send_inner(&self, request: ApiRequest) -> Result<serde_json::Value, ClassifiedError> {
        match self.transport.execute(&request).await {
            Ok(envelope) => Ok(self.complete(envelope)),
            Err(failure) if failure.is_unauthorized() => {
                debug!("session rejected, coordinating refresh");
                match self.coordinator.ensure_refreshed().await {
                    Ok(()) => {
                        // One replay; whatever it returns is terminal.
                        match self.transport.execute(&request).await {
                            Ok(envelope) => Ok(self.complete(envelope)),
                            Err(replay_failure) => Err(self.fail(replay_failure)),
                        }
                    }
                    Err(refresh_error) => {
                        if self.state.has_completed_any_exchange() {
                            if !self.reload_fired.swap(true, Ordering::SeqCst) {
                                warn!(error = %refresh_error, "session lost after authenticated use, triggering reload");
                                self.reload.reload();
                            }
                        } else {
                            debug!(error = %refresh_error, "refresh failed before any successful exchange, no reload");
                        }
                        Err(self.fail(failure))
                    }
                }
            }
            Err(failure) => Err(self.fail(failure)),
        }
    }

    /// Send and deserialize the unwrapped payload.
    pub async fn send_as<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ClassifiedError> {
        let data = self.send(request).await?;
        serde_json::from_value(data).map_err(|e| ClassifiedError {
            kind: ErrorKind::Unknown,
            message: format!("unexpected response shape: {e}"),
        })
    }

    fn complete(&self, envelope: Envelope) -> serde_json::Value {
        self.state.mark_completed();
        metrics::record_exchange(true);
        envelope.data
    }

    /// Terminal failure: classify, notify (gate permitting), propagate.
    fn fail(&self, failure: Failure) -> ClassifiedError {
        metrics::record_exchange(false);
        let classified = classify(&failure);
        self.gate.report(&classified);
        classified
    }
}
