//! HTTP endpoints for the invitation site.
//!
//! `/api/*` is JSON; everything else is the static single-page site, with
//! unknown paths falling back to `index.html` so client-side routes work.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use guestbook::{Message, Submission, WishStore};
use guestconf::EventConfig;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::quote::QuoteProvider;
use crate::share;

/// Shared state for web handlers
#[derive(Clone)]
pub struct WebState {
    pub store: Arc<WishStore>,
    pub quotes: Arc<dyn QuoteProvider>,
    pub event: Arc<EventConfig>,
    pub start_time: Instant,
}

impl WebState {
    pub fn new(store: Arc<WishStore>, quotes: Arc<dyn QuoteProvider>, event: EventConfig) -> Self {
        Self {
            store,
            quotes,
            event: Arc::new(event),
            start_time: Instant::now(),
        }
    }
}

pub fn router(state: WebState, static_dir: &Path) -> Router {
    let site = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/api/wishes", get(list_wishes).post(append_wish))
        .route("/api/quote", get(quote))
        .route("/api/share", get(share_link))
        .route("/api/{*rest}", any(api_not_found))
        .route("/health", get(health))
        .with_state(state)
        .fallback_service(site)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, Json(body)).into_response()
}

fn invalid_input(missing: &[&'static str]) -> Response {
    let body = serde_json::json!({
        "error": format!("missing required field(s): {}", missing.join(", ")),
        "missing": missing,
    });
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

/// Map store errors onto HTTP: bad input is the client's, the rest is ours.
fn wish_error(err: guestbook::Error) -> Response {
    if err.is_storage() {
        tracing::error!(error = %err, "failed to save wish");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "guestbook storage unavailable")
    } else {
        invalid_input(err.missing_fields())
    }
}

/// GET /api/wishes - never fails; a broken store reads as an empty guestbook.
async fn list_wishes(State(state): State<WebState>) -> Json<Vec<Message>> {
    let store = Arc::clone(&state.store);
    let wishes = tokio::task::spawn_blocking(move || store.list_all())
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "guestbook read task failed");
            Vec::new()
        });
    Json(wishes)
}

#[derive(Debug, Deserialize)]
struct WishRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// POST /api/wishes - append and return the whole guestbook.
async fn append_wish(
    State(state): State<WebState>,
    payload: Result<Json<WishRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            let body = serde_json::json!({ "error": rejection.body_text(), "missing": [] });
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let name = request.name.unwrap_or_default();
    let message = request.message.unwrap_or_default();

    let store = Arc::clone(&state.store);
    match tokio::task::spawn_blocking(move || store.append(&name, &message)).await {
        Ok(Ok(wishes)) => {
            tracing::info!(id = %wishes[0].id, count = wishes.len(), "wish saved");
            (StatusCode::OK, Json(wishes)).into_response()
        }
        Ok(Err(e)) => wish_error(e),
        Err(e) => {
            tracing::error!(error = %e, "guestbook write task failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "guestbook storage unavailable")
        }
    }
}

/// GET /api/quote - always 200, falls back to a fixed quote.
async fn quote(State(state): State<WebState>) -> impl IntoResponse {
    let quote = state.quotes.quote(&state.event.groom, &state.event.bride).await;
    Json(serde_json::json!({ "quote": quote }))
}

#[derive(Debug, Deserialize)]
struct ShareQuery {
    name: Option<String>,
    message: Option<String>,
}

/// GET /api/share - WhatsApp link carrying the guest's greeting.
async fn share_link(State(state): State<WebState>, Query(query): Query<ShareQuery>) -> Response {
    let submission = match Submission::new(
        query.name.as_deref().unwrap_or_default(),
        query.message.as_deref().unwrap_or_default(),
    ) {
        Ok(submission) => submission,
        Err(e) => return invalid_input(e.missing_fields()),
    };

    let text = share::compose_greeting(
        &state.event.groom,
        &state.event.bride,
        &submission.name,
        &submission.text,
    );

    match share::whatsapp_link(&state.event.phone, &text) {
        Ok(url) => Json(serde_json::json!({ "url": url.as_str() })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "share link misconfigured");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /health
async fn health(State(state): State<WebState>) -> Json<serde_json::Value> {
    let store = Arc::clone(&state.store);
    let loaded = tokio::task::spawn_blocking(move || store.load()).await;

    let (storage, wishes) = match loaded {
        Ok(Ok(wishes)) => ("ok", wishes.len()),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "health check: guestbook degraded");
            ("degraded", 0)
        }
        Err(_) => ("degraded", 0),
    };

    Json(serde_json::json!({
        "status": "healthy",
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
        "wishes": wishes,
        "storage": storage,
    }))
}

async fn api_not_found() -> Response {
    api_error(StatusCode::NOT_FOUND, "not found")
}
