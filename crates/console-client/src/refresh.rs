//! Single-flight session refresh
//!
//! Any number of requests can observe an expired session at once; the
//! backend must see exactly one refresh exchange. The first observer
//! publishes a shared attempt handle synchronously — before the exchange
//! suspends — so every later observer joins that attempt instead of
//! starting its own. The attempt clears its slot the moment it settles,
//! ahead of resolving the joined callers, so a 401 arriving afterward
//! starts fresh.
//!
//! The exchange itself runs as a spawned task: it completes (and its
//! outcome updates the session) even if every joined caller is dropped.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use futures_util::FutureExt;
use futures_util::future::Shared;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use transport::{ApiRequest, SessionStore, Transport};

use crate::metrics;

/// The fixed, parameterless refresh exchange.
const REFRESH_PATH: &str = "/auth/refresh-token";

/// Outcome shared by every caller joined to a failed attempt.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RefreshError {
    #[error("refresh exchange failed: {0}")]
    Exchange(String),

    #[error("refresh attempt aborted: {0}")]
    Aborted(String),
}

type AttemptOutcome = Result<(), RefreshError>;
type SharedAttempt = Shared<Pin<Box<dyn Future<Output = AttemptOutcome> + Send>>>;

struct Inner {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    /// The outstanding attempt. The lock is never held across an await,
    /// so check-then-publish is atomic with respect to every other
    /// caller — the invariant the whole coordinator rests on.
    in_flight: Mutex<Option<SharedAttempt>>,
}

/// Coordinates refresh exchanges so at most one is outstanding at any
/// instant, process-wide per client.
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<SessionStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                session,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Ensure one refresh exchange has run since this call started.
    ///
    /// Joins the outstanding attempt when there is one; otherwise starts
    /// one and publishes it before the exchange suspends. Every caller
    /// joined to one attempt receives the identical outcome.
    pub async fn ensure_refreshed(&self) -> Result<(), RefreshError> {
        let attempt = {
            let mut slot = self
                .inner
                .in_flight
                .lock()
                .expect("refresh slot lock poisoned");
            match slot.as_ref() {
                Some(outstanding) => {
                    debug!("joining outstanding refresh attempt");
                    outstanding.clone()
                }
                None => {
                    let attempt = start_attempt(Arc::clone(&self.inner));
                    *slot = Some(attempt.clone());
                    attempt
                }
            }
        };
        attempt.await
    }
}

/// Spawn a refresh attempt and return the joinable handle.
///
/// The spawned task clears the slot before resolving joiners, so by the
/// time any caller acts on the outcome the coordinator is back to
/// "nothing outstanding". The slot mutex orders the publish in
/// `ensure_refreshed` before the clear here even on a fast settle.
fn start_attempt(inner: Arc<Inner>) -> SharedAttempt {
    info!("starting session refresh");
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let outcome = run_refresh(&inner).await;
        *inner
            .in_flight
            .lock()
            .expect("refresh slot lock poisoned") = None;
        match &outcome {
            Ok(()) => info!("session refresh succeeded"),
            Err(e) => warn!(error = %e, "session refresh failed"),
        }
        metrics::record_refresh(outcome.is_ok());
        let _ = tx.send(outcome);
    });

    async move {
        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(RefreshError::Aborted("refresh task dropped".into())),
        }
    }
    .boxed()
    .shared()
}

/// Issue the refresh exchange and absorb a rotated bearer, if any.
///
/// Goes through the transport directly, never the facade pipeline — a
/// 401 on the refresh itself must not recurse into another refresh.
async fn run_refresh(inner: &Inner) -> AttemptOutcome {
    let request = ApiRequest::post(REFRESH_PATH);
    match inner.transport.execute(&request).await {
        Ok(envelope) => {
            // Cookie-mode backends rotate the credential server-side and
            // return no token; that is still a success.
            if let Some(token) = envelope
                .data
                .get("data")
                .and_then(|d| d.get("accessToken"))
                .and_then(|t| t.as_str())
            {
                if let Err(e) = inner.session.set(token.to_owned()).await {
                    warn!(error = %e, "failed to persist rotated session token");
                }
                debug!("stored rotated session token");
            }
            Ok(())
        }
        Err(failure) => Err(RefreshError::Exchange(failure.to_string())),
    }
}
