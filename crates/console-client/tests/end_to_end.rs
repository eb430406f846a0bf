//! End-to-end pipeline tests over a real socket
//!
//! Drives `ApiClient` through `HttpTransport` against an in-process mock
//! backend: stale bearer → 401 → one shared refresh → rotated bearer →
//! replay. The unit tests cover the interleavings deterministically;
//! these prove the same flow survives real HTTP.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Json;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use serde_json::json;
use tokio::net::TcpListener;

use console_client::{ApiClient, Notifier, ReloadHook};
use transport::{ApiRequest, HttpTransport, SessionStore};

/// Bearer the backend accepts.
const VALID_TOKEN: &str = "at_valid";

/// Mock backend: data routes demand the valid bearer, the refresh route
/// hands it out (slowly, so concurrent 401s pile onto one attempt).
async fn start_backend(refresh_delay: Duration) -> (String, Arc<AtomicUsize>) {
    let refreshes = Arc::new(AtomicUsize::new(0));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let counter = refreshes.clone();
    tokio::spawn(async move {
        let app = axum::Router::new()
            .route(
                "/auth/refresh-token",
                post(move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(refresh_delay).await;
                        Json(json!({"data": {"accessToken": VALID_TOKEN}}))
                    }
                }),
            )
            .fallback(|request: Request<Body>| async move {
                let expected = format!("Bearer {VALID_TOKEN}");
                let authorized = request
                    .headers()
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some(expected.as_str());
                if authorized {
                    let path = request.uri().path().to_owned();
                    Json(json!({"data": {"path": path}})).into_response()
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({"message": "jwt expired"})),
                    )
                        .into_response()
                }
            });
        axum::serve(listener, app).await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    (format!("http://{addr}"), refreshes)
}

struct RecordingNotifier(Mutex<Vec<String>>);

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_owned());
    }
}

struct CountingReload(AtomicUsize);

impl ReloadHook for CountingReload {
    fn reload(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

async fn stale_client(base_url: &str) -> (ApiClient, Arc<SessionStore>) {
    let session = Arc::new(SessionStore::in_memory());
    session.set("at_stale".into()).await.unwrap();
    let transport = Arc::new(
        HttpTransport::new(base_url, Arc::clone(&session), Duration::from_secs(5)).unwrap(),
    );
    let client = ApiClient::new(
        transport,
        Arc::clone(&session),
        Arc::new(RecordingNotifier(Mutex::new(Vec::new()))),
        Arc::new(CountingReload(AtomicUsize::new(0))),
    );
    (client, session)
}

#[tokio::test]
async fn stale_session_recovers_transparently() {
    let (base_url, refreshes) = start_backend(Duration::ZERO).await;
    let (client, session) = stale_client(&base_url).await;

    let data = client.send(ApiRequest::get("/certificate")).await.unwrap();

    assert_eq!(data["data"]["path"], "/certificate");
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(
        session.bearer().await.unwrap().expose(),
        VALID_TOKEN,
        "rotated bearer must be stored for subsequent exchanges"
    );
}

#[tokio::test]
async fn rotated_session_serves_later_requests_without_refreshing() {
    let (base_url, refreshes) = start_backend(Duration::ZERO).await;
    let (client, _session) = stale_client(&base_url).await;

    client.send(ApiRequest::get("/user")).await.unwrap();
    client.send(ApiRequest::get("/certificate")).await.unwrap();
    client.send(ApiRequest::get("/auth/profile")).await.unwrap();

    assert_eq!(
        refreshes.load(Ordering::SeqCst),
        1,
        "only the first stale exchange may refresh"
    );
}

#[tokio::test]
async fn concurrent_stale_requests_share_one_refresh() {
    // Slow refresh: every first attempt 401s well inside its window
    let (base_url, refreshes) = start_backend(Duration::from_millis(200)).await;
    let (client, _session) = stale_client(&base_url).await;

    let (a, b, c, d) = tokio::join!(
        client.send(ApiRequest::get("/a")),
        client.send(ApiRequest::get("/b")),
        client.send(ApiRequest::get("/c")),
        client.send(ApiRequest::get("/d")),
    );

    assert_eq!(a.unwrap()["data"]["path"], "/a");
    assert_eq!(b.unwrap()["data"]["path"], "/b");
    assert_eq!(c.unwrap()["data"]["path"], "/c");
    assert_eq!(d.unwrap()["data"]["path"], "/d");
    assert_eq!(
        refreshes.load(Ordering::SeqCst),
        1,
        "four concurrent 401s must coalesce into one refresh exchange"
    );
}
