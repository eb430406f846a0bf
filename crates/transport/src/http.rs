//! reqwest-backed transport
//!
//! Turns a captured `ApiRequest` into a real HTTP exchange: base-URL
//! join, query pairs, JSON body, bearer injection from the session store,
//! and the mapping from reqwest failures to the client's failure shapes.
//! Cookie storage is enabled so server-managed session cookies ride along
//! without the client ever inspecting them.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::exchange::{ApiRequest, Envelope, ExchangeResult, Failure, Method};
use crate::session::SessionStore;
use crate::Transport;

/// Error constructing the underlying HTTP client.
#[derive(Debug, thiserror::Error)]
#[error("failed to build HTTP client: {0}")]
pub struct BuildError(String);

/// Transport over reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl HttpTransport {
    /// Build a transport for the given API base URL.
    ///
    /// `timeout` bounds each exchange end to end. The session store is
    /// consulted per exchange, so a token rotated mid-flight is picked up
    /// by the next attempt.
    pub fn new(
        base_url: impl Into<String>,
        session: Arc<SessionStore>,
        timeout: Duration,
    ) -> Result<Self, BuildError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| BuildError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            session,
        })
    }

    fn url_for(&self, request: &ApiRequest) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), request.path)
    }
}

impl Transport for HttpTransport {
    fn execute<'a>(
        &'a self,
        request: &'a ApiRequest,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ExchangeResult> + Send + 'a>> {
        Box::pin(async move {
            let url = self.url_for(request);

            let mut builder = match request.method {
                Method::Get => self.client.get(&url),
                Method::Post => self.client.post(&url),
                Method::Put => self.client.put(&url),
                Method::Delete => self.client.delete(&url),
            };

            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            if let Some(token) = self.session.bearer().await {
                builder = builder.bearer_auth(token.expose());
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(map_send_error)?;

            let status = response.status();
            let status_text = status.canonical_reason().unwrap_or_default().to_string();
            let text = response.text().await.map_err(|e| Failure::NoResponse {
                detail: format!("reading response body: {e}"),
            })?;

            if status.is_success() {
                let data = if text.trim().is_empty() {
                    serde_json::Value::Null
                } else {
                    serde_json::from_str(&text).map_err(|e| Failure::Fault {
                        message: format!("invalid response body: {e}"),
                    })?
                };
                Ok(Envelope {
                    status: status.as_u16(),
                    data,
                })
            } else {
                debug!(method = %request.method, path = %request.path, status = status.as_u16(), "exchange failed");
                Err(Failure::Status {
                    status: status.as_u16(),
                    status_text,
                    body: serde_json::from_str(&text).ok(),
                })
            }
        })
    }
}

/// Map a reqwest send error onto the failure taxonomy.
///
/// Builder problems never reached the wire; everything else means the
/// request went out and no (complete) response came back.
fn map_send_error(e: reqwest::Error) -> Failure {
    if e.is_builder() {
        Failure::Fault {
            message: format!("building request: {e}"),
        }
    } else {
        Failure::NoResponse {
            detail: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use tokio::net::TcpListener;

    /// Start a mock backend that echoes method, path, query, and selected
    /// request headers back as JSON.
    async fn start_echo_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let app = axum::Router::new().fallback(
                |request: axum::http::Request<axum::body::Body>| async move {
                    let authorization = request
                        .headers()
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned);
                    let custom = request
                        .headers()
                        .get("x-trace")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned);
                    axum::Json(json!({
                        "method": request.method().to_string(),
                        "path": request.uri().path(),
                        "query": request.uri().query().unwrap_or(""),
                        "authorization": authorization,
                        "x-trace": custom,
                    }))
                },
            );
            axum::serve(listener, app).await.unwrap();
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        format!("http://{addr}")
    }

    fn transport_for(base_url: &str, session: Arc<SessionStore>) -> HttpTransport {
        HttpTransport::new(base_url, session, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn forwards_method_path_and_query() {
        let base_url = start_echo_server().await;
        let transport = transport_for(&base_url, Arc::new(SessionStore::in_memory()));

        let request = ApiRequest::get("/user")
            .with_query("page", "2")
            .with_query("_q", "ann");
        let envelope = transport.execute(&request).await.unwrap();

        assert_eq!(envelope.status, 200);
        assert_eq!(envelope.data["method"], "GET");
        assert_eq!(envelope.data["path"], "/user");
        assert_eq!(envelope.data["query"], "page=2&_q=ann");
    }

    #[tokio::test]
    async fn attaches_bearer_when_authenticated() {
        let base_url = start_echo_server().await;
        let session = Arc::new(SessionStore::in_memory());
        session.set("at_test".into()).await.unwrap();
        let transport = transport_for(&base_url, session);

        let envelope = transport.execute(&ApiRequest::get("/me")).await.unwrap();
        assert_eq!(envelope.data["authorization"], "Bearer at_test");
    }

    #[tokio::test]
    async fn no_bearer_when_logged_out() {
        let base_url = start_echo_server().await;
        let transport = transport_for(&base_url, Arc::new(SessionStore::in_memory()));

        let envelope = transport.execute(&ApiRequest::get("/me")).await.unwrap();
        assert_eq!(envelope.data["authorization"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn forwards_custom_headers() {
        let base_url = start_echo_server().await;
        let transport = transport_for(&base_url, Arc::new(SessionStore::in_memory()));

        let request = ApiRequest::get("/ping").with_header("x-trace", "ex_123");
        let envelope = transport.execute(&request).await.unwrap();
        assert_eq!(envelope.data["x-trace"], "ex_123");
    }

    #[tokio::test]
    async fn non_success_status_becomes_status_failure_with_body() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let app = axum::Router::new().fallback(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    axum::Json(json!({"message": "maintenance window"})),
                )
            });
            axum::serve(listener, app).await.unwrap();
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let transport = transport_for(
            &format!("http://{addr}"),
            Arc::new(SessionStore::in_memory()),
        );
        let failure = transport
            .execute(&ApiRequest::get("/anything"))
            .await
            .unwrap_err();

        match failure {
            Failure::Status {
                status,
                status_text,
                body,
            } => {
                assert_eq!(status, 503);
                assert_eq!(status_text, "Service Unavailable");
                assert_eq!(body.unwrap()["message"], "maintenance window");
            }
            other => panic!("expected Status failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn dead_endpoint_is_no_response() {
        // Nothing listens on port 1
        let transport = transport_for("http://127.0.0.1:1", Arc::new(SessionStore::in_memory()));
        let failure = transport
            .execute(&ApiRequest::get("/anything"))
            .await
            .unwrap_err();
        assert!(
            matches!(failure, Failure::NoResponse { .. }),
            "expected NoResponse, got {failure:?}"
        );
    }

    #[tokio::test]
    async fn empty_success_body_is_null_payload() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let app = axum::Router::new().fallback(|| async { StatusCode::NO_CONTENT });
            axum::serve(listener, app).await.unwrap();
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let transport = transport_for(
            &format!("http://{addr}"),
            Arc::new(SessionStore::in_memory()),
        );
        let envelope = transport.execute(&ApiRequest::delete("/user/1")).await.unwrap();
        assert_eq!(envelope.status, 204);
        assert_eq!(envelope.data, serde_json::Value::Null);
    }

    #[tokio::test]
    async fn base_url_trailing_slash_is_normalized() {
        let base_url = start_echo_server().await;
        let transport = transport_for(
            &format!("{base_url}/"),
            Arc::new(SessionStore::in_memory()),
        );

        let envelope = transport.execute(&ApiRequest::get("/user")).await.unwrap();
        assert_eq!(envelope.data["path"], "/user");
    }
}
