//! HTTP host for the widget.
//!
//! Serves the rendered page, the static bundle, and relays `POST /ask` to the
//! configured answering service.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::ui::render_page;
use crate::widget::exchange::{ASK_ROUTE, AskRequest, AskResponse};
use crate::widget::i18n::detect_from_accept_language;

/// Largest `/ask` body accepted.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Global configuration.
    pub config: Arc<AppConfig>,
    /// Client used for the upstream relay.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.widget.request_timeout_secs))
            .build()?;
        Ok(Self { config, http })
    }
}

/// Build the router. Split from [`start_server`] so tests can drive it directly.
pub fn build_router(state: AppState) -> Router {
    // Leave headroom over the upstream timeout so the relay can report a 502.
    let timeout = Duration::from_secs(state.config.widget.request_timeout_secs + 5);
    let static_dir = state.config.widget.static_dir.clone();

    Router::new()
        .route("/", get(index_handler))
        .route(ASK_ROUTE, post(ask_relay))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                match tokio::time::timeout(timeout, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
                }
            },
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    match config.widget.ask_upstream.as_deref() {
        Some(upstream) => info!(name: "ask.upstream.configured", upstream = %upstream, "Relaying /ask"),
        None => warn!(
            name: "ask.upstream.missing",
            "No ask upstream configured; /ask will answer 503"
        ),
    }

    let address = config.bind_address();
    let app = build_router(AppState::new(config)?);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        name: "server.started",
        address = %format!("http://{address}"),
        "Server started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// GET / - Render the widget page in the visitor's preferred language.
async fn index_handler(headers: HeaderMap) -> impl IntoResponse {
    let accept = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());
    Html(render_page(detect_from_accept_language(accept)))
}

/// POST /ask - Forward the question and pass the upstream answer through.
async fn ask_relay(State(state): State<AppState>, Json(req): Json<AskRequest>) -> Response {
    let Some(upstream) = state.config.widget.ask_upstream.as_deref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(AskResponse::failure("No answering service is configured")),
        )
            .into_response();
    };

    tracing::debug!(
        name: "ask.relay.started",
        chars = req.message.chars().count(),
        "Relaying question"
    );

    let upstream_response = match state.http.post(upstream).json(&req).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(name: "ask.relay.failed", error = %e, "Upstream unreachable");
            return bad_gateway();
        }
    };

    let status = upstream_response.status();
    match upstream_response.bytes().await {
        Ok(body) => {
            info!(name: "ask.relay.completed", status = status.as_u16(), "Upstream answered");
            (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(e) => {
            warn!(name: "ask.relay.failed", error = %e, "Upstream body unreadable");
            bad_gateway()
        }
    }
}

fn bad_gateway() -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(AskResponse::failure("Answering service unavailable")),
    )
        .into_response()
}
