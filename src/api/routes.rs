use axum::{
    routing::{get, post},
    Router,
    extract::{
        rejection::JsonRejection,
        ws::{Message, WebSocket, WebSocketUpgrade},
        Json, Path, State,
    },
    http::header,
    response::{Html, IntoResponse, Response},
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, instrument};

use crate::api::models::{FeedItem, ScanRequest, ScanStarted};
use crate::api::pages;
use crate::db;
use crate::error::{AppError, Result};
use crate::scanner::Scanner;
use crate::AppState;

const APP_JS: &str = include_str!("../../static/app.js");

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/static/app.js", get(app_js))
        .route("/scan", post(start_scan))
        .route("/results/:scan_id", get(results_page))
        .route("/ws/:scan_id", get(results_feed))
        .route("/api/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn home() -> Html<String> {
    Html(pages::home())
}

async fn app_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript; charset=utf-8")], APP_JS)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[instrument(skip(state, payload))]
async fn start_scan(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanStarted>> {
    let Json(req) = payload.map_err(|rejection| {
        let message = match &rejection {
            JsonRejection::MissingJsonContentType(_) => "Expected 'Content-Type: application/json' header",
            JsonRejection::JsonSyntaxError(_) => "JSON syntax error",
            JsonRejection::JsonDataError(_) => "JSON data structure mismatch",
            _ => "Unknown JSON parsing error",
        };
        error!(error = ?rejection, "JSON parsing error");
        AppError::BadRequest(message.to_string())
    })?;

    let scanner = Scanner::start(state.db.clone(), &req.url, state.config.scan_step_delay).await?;
    let scan_id = scanner.scan_id().to_string();
    tokio::spawn(scanner.run());

    info!(scan_id = %scan_id, url = %req.url, "Scan started");
    Ok(Json(ScanStarted { scan_id }))
}

async fn results_page(Path(scan_id): Path<String>) -> Html<String> {
    Html(pages::results(&scan_id))
}

async fn results_feed(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(scan_id): Path<String>,
) -> Response {
    ws.on_upgrade(move |socket| stream_findings(socket, state, scan_id))
}

/// Pushes the scan's findings every feed interval until the client goes away.
async fn stream_findings(mut socket: WebSocket, state: AppState, scan_id: String) {
    loop {
        let payload = match feed_payload(&state.db, &scan_id).await {
            Ok(payload) => payload,
            Err(e) => {
                error!(scan_id = %scan_id, error = %e, "Failed to load findings");
                break;
            }
        };

        if socket.send(Message::Text(payload)).await.is_err() {
            debug!(scan_id = %scan_id, "Results feed closed");
            break;
        }

        tokio::time::sleep(state.config.feed_interval).await;
    }
}

/// JSON array of the findings recorded so far for `scan_id`.
pub async fn feed_payload(pool: &SqlitePool, scan_id: &str) -> Result<String> {
    let items: Vec<FeedItem> = db::vulnerabilities_for(pool, scan_id)
        .await?
        .into_iter()
        .map(FeedItem::from)
        .collect();
    Ok(serde_json::to_string(&items)?)
}
