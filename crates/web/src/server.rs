//! HTTP surface: the lookup page, form submission and JSON endpoints.

use crate::page::render_page;
use crate::sessions::{session_cookie, session_id, SessionStore, DEFAULT_SESSION_IDLE};
use anyhow::{Context, Result};
use axum::{
    extract::{Form, Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use enslookup_core::{
    render, resolve_once, EnsBackend, LookupForm, LookupSession, ResolutionSnapshot, View,
};
use enslookup_types::LookupMode;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared by every handler: the per-client page sessions and the backend
/// for one-shot API lookups.
#[derive(Clone)]
pub struct AppState {
    sessions: Arc<SessionStore>,
    backend: Arc<dyn EnsBackend>,
}

impl AppState {
    pub fn new(backend: Arc<dyn EnsBackend>) -> Self {
        Self::with_session_idle(backend, DEFAULT_SESSION_IDLE)
    }

    pub fn with_session_idle(backend: Arc<dyn EnsBackend>, idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new(backend.clone(), idle_timeout)),
            backend,
        }
    }

    /// The page session of the client holding session id `id`.
    pub fn session(&self, id: &str) -> Option<LookupSession> {
        self.sessions.get(id)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

type SharedState = Arc<AppState>;

#[derive(Debug, Deserialize)]
struct DraftParams {
    mode: Option<LookupMode>,
}

#[derive(Debug, Deserialize)]
struct LookupParams {
    #[serde(default)]
    mode: LookupMode,
    #[serde(default)]
    value: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/lookup", post(submit_lookup))
        .route("/api/lookup", get(api_lookup))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

pub async fn start_server(state: AppState, addr: &str) -> Result<()> {
    let app = build_router(state);
    let listener = bind_listener(addr).await?;
    info!("ENS lookup listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("lookup server terminated unexpectedly")
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
}

async fn bind_listener(addr: &str) -> Result<tokio::net::TcpListener> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        tokio::net::TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("failed to bind lookup listener on {socket_addr}"))
    } else {
        tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind lookup listener on {addr}"))
    }
}

/// The page shows the client's last submitted query; `?mode=` only changes
/// the draft.
async fn index(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(draft): Query<DraftParams>,
) -> Html<String> {
    let snapshot = session_id(&headers)
        .and_then(|id| state.sessions.get(id))
        .map(|session| session.snapshot())
        .unwrap_or_else(ResolutionSnapshot::default);
    let mut form = match &snapshot.query {
        Some(query) => LookupForm::new(query.mode).with_input(query.value.clone()),
        None => LookupForm::default(),
    };
    if let Some(mode) = draft.mode {
        form.set_mode(mode);
    }

    let view = render(&snapshot);
    Html(render_page(&form, &view, !snapshot.is_settled()))
}

async fn submit_lookup(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Form(params): Form<LookupParams>,
) -> Response {
    let query = LookupForm::new(params.mode)
        .with_input(params.value)
        .submit();
    let (id, session, created) = state.sessions.get_or_create(session_id(&headers));
    session.submit(query);

    let mut response = Redirect::to("/").into_response();
    if created {
        match HeaderValue::from_str(&session_cookie(&id)) {
            Ok(cookie) => {
                response.headers_mut().insert(header::SET_COOKIE, cookie);
            }
            Err(err) => error!(session = %id, %err, "unable to encode session cookie"),
        }
    }
    response
}

async fn api_lookup(
    State(state): State<SharedState>,
    Query(params): Query<LookupParams>,
) -> Json<View> {
    let query = LookupForm::new(params.mode)
        .with_input(params.value)
        .submit();
    let snapshot = resolve_once(state.backend.clone(), query).await;
    Json(render(&snapshot))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "enslookup"
    }))
}
