//! HTTP surface for the IntelliChat assistant.
//!
//! This crate exposes the chat cycle to browser clients as plain JSON over
//! HTTP: create a session, post input lines, upload a PDF, ask questions
//! about it, read the visible history. Replies are single documents rather
//! than streams because the assistant makes one blocking model call per
//! message; navigation side-commands come back as structured `redirect`
//! replies that the client acts on.

pub mod error;
pub mod sessions;

pub use error::{Result, ServerError};

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{delete, get, options, post};
use axum::{middleware, Router};
use intellichat_core::rag::Embedder;
use intellichat_core::{ChatSession, LanguageModel, SessionOptions};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use sessions::{SessionRegistry, SharedSession};

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

/// Configuration for the chat server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Enable CORS
    pub enable_cors: bool,
    /// CORS allowed origins (if None, allows any origin)
    pub cors_origins: Option<Vec<String>>,
    /// Maximum request body size in bytes; uploads are the ceiling here
    pub max_body_size: usize,
    /// Enable request logging
    pub enable_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            enable_cors: true,
            cors_origins: None,
            max_body_size: 16 * 1024 * 1024,
            enable_logging: true,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Parse and set the bind address from a string.
    pub fn with_bind_addr_str(mut self, addr: &str) -> Result<Self> {
        self.bind_addr = addr
            .parse()
            .map_err(|e| ServerError::config_error(format!("Invalid bind address: {}", e)))?;
        Ok(self)
    }

    pub fn with_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    pub fn with_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }
}

/// Shared application state: the model and embedder handles plus the
/// session registry.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn LanguageModel>,
    pub embedder: Arc<dyn Embedder>,
    pub sessions: SessionRegistry,
    pub options: SessionOptions,
    pub config: ServerConfig,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct DocumentParams {
    pub name: Option<String>,
}

type HandlerError = (StatusCode, Json<Value>);

fn error_body(status: StatusCode, error: &str, details: impl std::fmt::Display) -> HandlerError {
    (
        status,
        Json(json!({
            "error": error,
            "details": details.to_string(),
            "timestamp": chrono::Utc::now()
        })),
    )
}

fn chat_error_body(e: intellichat_core::ChatError) -> HandlerError {
    use intellichat_core::ChatError;

    let status = match &e {
        ChatError::Config(_) | ChatError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    error_body(status, "chat error", e)
}

async fn lookup_session(
    state: &AppState,
    id: Uuid,
) -> std::result::Result<SharedSession, HandlerError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| error_body(StatusCode::NOT_FOUND, "unknown session", id))
}

/// Handler for the /sessions POST endpoint.
async fn create_session_handler(State(state): State<AppState>) -> Json<Value> {
    let session = ChatSession::new(
        state.model.clone(),
        state.embedder.clone(),
        state.options.clone(),
    );
    let id = state.sessions.create(session).await;
    log::info!("created session {}", id);

    Json(json!({
        "session_id": id,
        "timestamp": chrono::Utc::now()
    }))
}

/// Handler for the /sessions/{id} DELETE endpoint.
async fn delete_session_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> std::result::Result<Json<Value>, HandlerError> {
    if state.sessions.remove(id).await {
        log::info!("deleted session {}", id);
        Ok(Json(json!({
            "status": "success",
            "session_id": id,
            "timestamp": chrono::Utc::now()
        })))
    } else {
        Err(error_body(StatusCode::NOT_FOUND, "unknown session", id))
    }
}

/// Handler for the /sessions/{id}/history GET endpoint.
async fn history_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> std::result::Result<Json<Value>, HandlerError> {
    let session = lookup_session(&state, id).await?;
    let session = session.lock().await;
    let turns = session.visible_turns();

    Ok(Json(json!({
        "turns": turns,
        "count": turns.len(),
        "timestamp": chrono::Utc::now()
    })))
}

/// Handler for the /sessions/{id}/messages POST endpoint.
async fn message_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<MessageRequest>,
) -> std::result::Result<Json<Value>, HandlerError> {
    let session = lookup_session(&state, id).await?;
    let mut session = session.lock().await;

    match session.handle_input(&request.text).await {
        Ok(reply) => Ok(Json(json!({
            "reply": reply,
            "timestamp": chrono::Utc::now()
        }))),
        Err(e) => {
            log::error!("session {} failed to handle input: {}", id, e);
            Err(chat_error_body(e))
        }
    }
}

/// Handler for the /sessions/{id}/document POST endpoint. The body is the
/// raw PDF bytes.
async fn document_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<DocumentParams>,
    body: Bytes,
) -> std::result::Result<Json<Value>, HandlerError> {
    if body.is_empty() {
        return Err(error_body(
            StatusCode::BAD_REQUEST,
            "invalid request",
            "empty document body",
        ));
    }

    let name = params.name.unwrap_or_else(|| "uploaded.pdf".to_string());
    let session = lookup_session(&state, id).await?;
    let mut session = session.lock().await;

    match session.attach_document(&body, &name).await {
        Ok(digest) => Ok(Json(json!({
            "digest": digest,
            "timestamp": chrono::Utc::now()
        }))),
        Err(e) => {
            log::error!("session {} failed to ingest document: {}", id, e);
            Err(chat_error_body(e))
        }
    }
}

/// Handler for the /sessions/{id}/question POST endpoint.
async fn question_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<MessageRequest>,
) -> std::result::Result<Json<Value>, HandlerError> {
    let session = lookup_session(&state, id).await?;
    let session = session.lock().await;

    match session.ask_document(&request.text).await {
        Ok(answer) => Ok(Json(json!({
            "answer": answer,
            "timestamp": chrono::Utc::now()
        }))),
        Err(e) => {
            log::error!("session {} failed to answer question: {}", id, e);
            Err(chat_error_body(e))
        }
    }
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// The chat HTTP server.
pub struct ChatServer {
    state: AppState,
}

impl ChatServer {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        embedder: Arc<dyn Embedder>,
        options: SessionOptions,
    ) -> Self {
        Self::with_config(model, embedder, options, ServerConfig::default())
    }

    pub fn with_config(
        model: Arc<dyn LanguageModel>,
        embedder: Arc<dyn Embedder>,
        options: SessionOptions,
        config: ServerConfig,
    ) -> Self {
        Self {
            state: AppState {
                model,
                embedder,
                sessions: SessionRegistry::new(),
                options,
                config,
            },
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Build the Axum router with all routes and middleware.
    pub fn build_router(&self) -> Router {
        let state = self.state.clone();
        let config = state.config.clone();

        let mut router = Router::new()
            .route("/health", get(health_handler))
            .route("/sessions", post(create_session_handler))
            .route("/sessions/{id}", delete(delete_session_handler))
            .route("/sessions/{id}/history", get(history_handler))
            .route("/sessions/{id}/messages", post(message_handler))
            .route("/sessions/{id}/document", post(document_handler))
            .route("/sessions/{id}/question", post(question_handler))
            // CORS preflight
            .route("/sessions", options(|| async { StatusCode::OK }))
            .route("/sessions/{id}/messages", options(|| async { StatusCode::OK }))
            .route("/sessions/{id}/document", options(|| async { StatusCode::OK }))
            .route("/sessions/{id}/question", options(|| async { StatusCode::OK }))
            .layer(DefaultBodyLimit::max(config.max_body_size))
            .with_state(state);

        if config.enable_logging {
            router = router.layer(middleware::from_fn(
                |request: axum::http::Request<axum::body::Body>,
                 next: axum::middleware::Next| async {
                    let request_id = Uuid::new_v4().to_string();
                    let method = request.method().clone();
                    let uri = request.uri().clone();
                    log::info!("Request {} {} {}", request_id, method, uri);

                    let start = std::time::Instant::now();
                    let response = next.run(request).await;
                    log::info!(
                        "Response {} {} in {:?}",
                        request_id,
                        response.status(),
                        start.elapsed()
                    );

                    response
                },
            ));
        }

        router = router.layer(TraceLayer::new_for_http());

        if config.enable_cors {
            let cors_layer = if let Some(ref origins) = config.cors_origins {
                let origins: std::result::Result<Vec<_>, _> =
                    origins.iter().map(|s| s.parse()).collect();
                match origins {
                    Ok(origins) => CorsLayer::new()
                        .allow_origin(origins)
                        .allow_methods(Any)
                        .allow_headers(Any),
                    Err(_) => CorsLayer::permissive(),
                }
            } else {
                CorsLayer::permissive()
            };
            router = router.layer(cors_layer);
        }

        router
    }

    /// Start the server and listen for connections.
    ///
    /// This method will block until the server is shut down.
    pub async fn serve(self) -> Result<()> {
        let bind_addr = self.state.config.bind_addr;
        let router = self.build_router();
        let listener = TcpListener::bind(bind_addr).await.map_err(|e| {
            ServerError::config_error(format!("Failed to bind to {}: {}", bind_addr, e))
        })?;

        log::info!("chat server starting on {}", bind_addr);
        log::info!("Health check: http://{}/health", bind_addr);
        log::info!("Sessions endpoint: http://{}/sessions", bind_addr);

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Start the server with graceful shutdown support.
    pub async fn serve_with_shutdown<F>(self, shutdown_signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.state.config.bind_addr;
        let router = self.build_router();
        let listener = TcpListener::bind(bind_addr).await.map_err(|e| {
            ServerError::config_error(format!("Failed to bind to {}: {}", bind_addr, e))
        })?;

        log::info!("chat server starting on {}", bind_addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// Resolves when the process receives ctrl-c or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("shutdown signal received");
}
