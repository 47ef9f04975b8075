//! Web server implementation

use axum::{
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use mcpbench_common::{Database, SqliteSubmissionStore, SubmissionStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{Credentials, HarnessConfig};
use crate::latency::Latency;
use crate::{downloads, echo, mock_auth, pages, submissions};

/// State shared by every handler.
pub struct AppState {
    pub store: Arc<dyn SubmissionStore>,
    pub latency: Latency,
    pub credentials: Credentials,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(store: Arc<dyn SubmissionStore>, latency: Latency, credentials: Credentials) -> Self {
        Self {
            store,
            latency,
            credentials,
        }
    }

    /// Open the configured database and wrap it in a SQLite store.
    pub fn from_config(config: &HarnessConfig) -> anyhow::Result<Self> {
        let db = Database::open(&config.db_path)?;
        Ok(Self::new(
            Arc::new(SqliteSubmissionStore::new(db)),
            Latency::new(config.simulate_latency),
            config.credentials.clone(),
        ))
    }

    /// Private in-memory store, no simulated latency.
    pub fn in_memory() -> mcpbench_common::Result<Self> {
        let db = Database::open_memory()?;
        Ok(Self::new(
            Arc::new(SqliteSubmissionStore::new(db)),
            Latency::disabled(),
            Credentials::default(),
        ))
    }
}

/// Web server
pub struct WebServer {
    state: SharedState,
}

impl WebServer {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Create router
    pub fn router(&self) -> Router {
        let api = Router::new()
            .route("/submissions", post(submissions::create_submission_handler))
            .route("/submissions/:id", get(submissions::get_submission_handler))
            .route("/test/get", get(echo::get_echo_handler))
            .route("/test/forms", post(echo::form_echo_handler))
            .route(
                "/test/auth",
                get(mock_auth::session_status_handler).post(mock_auth::login_handler),
            )
            .route(
                "/test/auth-turnstile",
                get(mock_auth::turnstile_config_handler).post(mock_auth::turnstile_login_handler),
            )
            .route("/test/downloads/:file_id", get(downloads::download_handler));

        Router::new()
            .route("/", get(pages::index_handler))
            .route("/health", get(health_handler))
            // Customer form flow
            .route(
                "/forms",
                get(pages::forms::form_page_handler).post(pages::forms::form_submit_handler),
            )
            .route("/forms/", get(pages::forms::form_page_handler))
            .route("/forms/result/:id", get(pages::forms::form_result_handler))
            // Demo pages
            .route("/extraction", get(pages::extraction::extraction_page_handler))
            .route("/navigation", get(pages::navigation::navigation_page_handler))
            .route("/downloads", get(pages::downloads::downloads_page_handler))
            .route("/auth/basic", get(pages::auth::basic_page_handler))
            .route("/auth/form", get(pages::auth::form_page_handler))
            .route("/auth/challenge", get(pages::auth::challenge_page_handler))
            .route("/auth/turnstile", get(pages::auth::turnstile_page_handler))
            .nest("/api", api)
            .fallback(pages::not_found_handler)
            .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the web server
    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        info!("MCPBench test environment listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Web server stopped");
        Ok(())
    }
}

pub async fn serve(config: HarnessConfig) -> anyhow::Result<()> {
    let addr = config.listen_addr()?;
    let server = WebServer::new(AppState::from_config(&config)?);
    server.serve(addr).await
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Received shutdown signal");
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "mcpbench-web"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health() {
        let server = WebServer::new(AppState::in_memory().unwrap());
        let response = server
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "mcpbench-web");
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let server = WebServer::new(AppState::in_memory().unwrap());
        let response = server
            .router()
            .oneshot(Request::get("/no/such/page").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_from_config_memory_db() {
        let config = HarnessConfig {
            db_path: ":memory:".into(),
            simulate_latency: false,
            ..Default::default()
        };
        let state = AppState::from_config(&config).unwrap();
        assert!(!state.latency.is_enabled());
        assert_eq!(state.credentials, Credentials::default());
    }
}
