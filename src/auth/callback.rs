//! Loopback receiver for OAuth redirects.
//!
//! Native clients have no opener window for the provider's redirect page to
//! post to. Pointing a profile's redirect URI at this listener makes each
//! `GET /callback?code=...&state=...` post an authorization-code message to
//! the bus, tagged with the listener's own origin.

use crate::auth::bus::{CrossWindowMessage, MessageBus};
use crate::constants::LOOPBACK_CALLBACK_ROUTE;
use crate::render::callback_page;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Query parameters of a provider redirect.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CallbackParams {
    fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|code| !code.is_empty())
    }

    fn state(&self) -> Option<&str> {
        self.state.as_deref().filter(|state| !state.is_empty())
    }
}

#[derive(Clone)]
struct CallbackState {
    bus: MessageBus,
    origin: Arc<str>,
}

pub struct CallbackServer {
    listener: TcpListener,
    router: Router,
    origin: String,
}

impl CallbackServer {
    pub async fn bind(addr: &str, bus: MessageBus) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let origin = format!("http://{}", listener.local_addr()?);
        let router = Router::new()
            .route(LOOPBACK_CALLBACK_ROUTE, get(receive_code))
            .with_state(CallbackState {
                bus,
                origin: Arc::from(origin.as_str()),
            });
        tracing::info!("Authorization callback listening on {}", origin);
        Ok(Self {
            listener,
            router,
            origin,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Origin stamped on posted messages, e.g. `http://127.0.0.1:8765`.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Full redirect URI to register with the provider.
    pub fn redirect_uri(&self) -> String {
        format!("{}{}", self.origin, LOOPBACK_CALLBACK_ROUTE)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        if let Err(e) = axum::serve(self.listener, self.router).await {
            tracing::error!("Authorization callback server stopped: {}", e);
        }
    }
}

async fn receive_code(
    State(state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<String>) {
    if let Some(code) = params.code() {
        let delivered = state.bus.post(CrossWindowMessage::auth_code(
            &state.origin,
            code,
            params.state(),
        ));
        tracing::info!("Authorization code received, delivered to {} listener(s)", delivered);
        return (StatusCode::OK, Html(callback_page(true)));
    }
    match params.error.as_deref() {
        Some(error) => tracing::warn!("Provider redirected with error: {}", error),
        None => tracing::warn!("Redirect without authorization code"),
    }
    (StatusCode::BAD_REQUEST, Html(callback_page(false)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use uuid::Uuid;

    async fn start(bus: &MessageBus) -> String {
        let server = CallbackServer::bind("127.0.0.1:0", bus.clone()).await.unwrap();
        let origin = server.origin().to_string();
        server.spawn();
        origin
    }

    #[tokio::test]
    async fn test_redirect_posts_auth_code() {
        let bus = MessageBus::new(4);
        let mut listener = bus.subscribe(Uuid::new_v4());
        let origin = start(&bus).await;

        let response = reqwest::get(format!("{}/callback?code=abc%20d&state=s1", origin))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert!(response.text().await.unwrap().contains("Авторизация завершена"));

        let message = listener.recv().await.unwrap();
        assert_eq!(message.origin, origin);
        let payload = message.auth_payload().unwrap();
        assert_eq!(payload.code, "abc d");
        assert_eq!(payload.state.as_deref(), Some("s1"));
    }

    #[tokio::test]
    async fn test_redirect_without_code_posts_nothing() {
        let bus = MessageBus::new(4);
        let origin = start(&bus).await;
        let mut listener = bus.subscribe(Uuid::new_v4());
        let client = reqwest::Client::new();

        let denied = client
            .get(format!("{}/callback?error=access_denied", origin))
            .send()
            .await
            .unwrap();
        assert_eq!(denied.status(), reqwest::StatusCode::BAD_REQUEST);

        let empty = client
            .get(format!("{}/callback?code=", origin))
            .send()
            .await
            .unwrap();
        assert_eq!(empty.status(), reqwest::StatusCode::BAD_REQUEST);

        let post = client
            .post(format!("{}/callback?code=x", origin))
            .send()
            .await
            .unwrap();
        assert_eq!(post.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);

        let elsewhere = client
            .get(format!("{}/other?code=x", origin))
            .send()
            .await
            .unwrap();
        assert_eq!(elsewhere.status(), reqwest::StatusCode::NOT_FOUND);

        bus.post(CrossWindowMessage::auth_code("marker", "m", None));
        assert_eq!(listener.recv().await.unwrap().origin, "marker");
    }

    #[tokio::test]
    async fn test_bare_newline_request_is_answered() {
        let bus = MessageBus::new(4);
        let mut listener = bus.subscribe(Uuid::new_v4());
        let origin = start(&bus).await;
        let addr = origin.trim_start_matches("http://");

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /callback?code=xyz HTTP/1.1\nHost: localhost\nConnection: close\n\n")
            .await
            .unwrap();
        let mut response = String::new();
        tokio::time::timeout(Duration::from_secs(5), stream.read_to_string(&mut response))
            .await
            .unwrap()
            .unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert_eq!(listener.recv().await.unwrap().auth_payload().unwrap().code, "xyz");
    }

    #[tokio::test]
    async fn test_redirect_uri_uses_bound_port() {
        let server = CallbackServer::bind("127.0.0.1:0", MessageBus::new(1)).await.unwrap();
        let port = server.local_addr().unwrap().port();
        assert_eq!(
            server.redirect_uri(),
            format!("http://127.0.0.1:{}/callback", port)
        );
    }
}
