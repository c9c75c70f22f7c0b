//! HTTP server setup and the front controller.
//!
//! # Responsibilities
//! - Create the Axum app with a single catch-all handler
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Forward every request to the route table
//! - Convert propagated controller failures into error responses
//! - Rewrite middleware rejections (body limit, timeout) into the JSON envelope
//! - Serve until the shutdown signal fires

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode, Uri},
    middleware::map_response,
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::db::Database;
use crate::http::response::ApiResponse;
use crate::routing::Router as RouteTable;

/// The route table used by the service, dispatching over the catalog handle.
pub type BookstoreRouter = RouteTable<Database>;

/// Application state injected into the front controller.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<BookstoreRouter>,
    pub db: Database,
}

/// HTTP server for the bookstore.
pub struct HttpServer {
    app: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server over a fully built route table.
    pub fn new(config: AppConfig, routes: BookstoreRouter, db: Database) -> Self {
        let state = AppState {
            routes: Arc::new(routes),
            db,
        };
        let app = Self::build_app(&config, state);
        Self { app, config }
    }

    /// Build the Axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .fallback(front_controller)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
            .layer(map_response(envelope_rejections))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Front controller: every request goes through the route table.
async fn front_controller(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let raw = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    match state.routes.dispatch(raw, method.as_str(), &state.db, body) {
        Ok(response) => response.into_response(),
        Err(err) => {
            tracing::error!(
                method = %method,
                path = %uri.path(),
                status = err.status().as_u16(),
                error = %err,
                "Controller action failed"
            );
            ApiResponse::from_error(&err).into_response()
        }
    }
}

/// Replace plain-text rejections produced by the body limit and timeout
/// layers with the error envelope. JSON responses pass through untouched.
async fn envelope_rejections(response: Response) -> Response {
    let message = match response.status() {
        StatusCode::PAYLOAD_TOO_LARGE => "Corpo da requisição excede o limite.",
        StatusCode::REQUEST_TIMEOUT => "Tempo limite da requisição excedido.",
        _ => return response,
    };

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return response;
    }

    ApiResponse::error(response.status(), message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_timeout_becomes_envelope() {
        let response = envelope_rejections(StatusCode::REQUEST_TIMEOUT.into_response()).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            body_json(response).await,
            json!({"status": "error", "message": "Tempo limite da requisição excedido."})
        );
    }

    #[tokio::test]
    async fn test_body_limit_becomes_envelope() {
        let plain = (StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded").into_response();
        let response = envelope_rejections(plain).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(response).await["status"], "error");
    }

    #[tokio::test]
    async fn test_other_responses_untouched() {
        let response = envelope_rejections(ApiResponse::route_not_found().into_response()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "Rota não encontrada.");

        let json_timeout = ApiResponse::error(StatusCode::REQUEST_TIMEOUT, "lento").into_response();
        let response = envelope_rejections(json_timeout).await;
        assert_eq!(body_json(response).await["message"], "lento");
    }
}
