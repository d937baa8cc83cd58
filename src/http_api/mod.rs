use std::{fmt, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
    routing::get,
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use crate::{
    ChartConfig, ScheduleError, VectorDocument,
    cache::ResponseCache,
    pipeline::Pipeline,
    render::{append_error, render_error},
};

const SVG_CONTENT_TYPE: &str = "image/svg+xml; charset=utf-8";

#[derive(Clone)]
pub struct AppState {
    config: Arc<ChartConfig>,
    cache: Arc<ResponseCache<VectorDocument>>,
}

impl AppState {
    pub fn new(config: ChartConfig, cache_ttl: Duration) -> Self {
        Self {
            config: Arc::new(config),
            cache: Arc::new(ResponseCache::new(cache_ttl)),
        }
    }

    pub fn with_shared(config: Arc<ChartConfig>, cache: Arc<ResponseCache<VectorDocument>>) -> Self {
        Self { config, cache }
    }

    pub fn cache(&self) -> Arc<ResponseCache<VectorDocument>> {
        self.cache.clone()
    }

    fn pipeline(&self) -> Pipeline<'_> {
        Pipeline::new(&self.config)
    }

    /// Answer with the chart, or with the error drawn as SVG.
    ///
    /// A failed request from a known client gets its last good chart back with
    /// the error appended underneath.
    fn respond(&self, result: Result<VectorDocument, ApiError>, client_id: Option<&str>) -> Response {
        let doc = match result {
            Ok(doc) => {
                if let Some(client_id) = client_id {
                    self.cache.insert(client_id, doc.clone());
                }
                doc
            }
            Err(err) => {
                error!(
                    error = %err,
                    client_id = client_id.unwrap_or("-"),
                    "failed to render schedule"
                );
                let message = err.to_string();
                match client_id.and_then(|id| self.cache.get(id)) {
                    Some(mut cached) => {
                        append_error(&mut cached, &message);
                        cached
                    }
                    None => render_error(&message),
                }
            }
        };
        svg_response(doc.to_svg())
    }
}

#[derive(Debug)]
enum ApiError {
    InvalidPayload(String),
    Schedule(ScheduleError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidPayload(message) => write!(f, "invalid payload: {message}"),
            ApiError::Schedule(err) => write!(f, "{err}"),
        }
    }
}

impl From<ScheduleError> for ApiError {
    fn from(value: ScheduleError) -> Self {
        ApiError::Schedule(value)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RenderQuery {
    client_id: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sch/svg/:payload", get(notation_to_svg))
        .route("/json/svg/:payload", get(json_to_svg))
        .route("/yaml/svg/:payload", get(yaml_to_svg))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn notation_to_svg(
    State(state): State<AppState>,
    Path(payload): Path<String>,
    Query(query): Query<RenderQuery>,
) -> Response {
    let result = decode_payload(&payload).and_then(|notation| {
        debug!(bytes = notation.len(), "rendering notation");
        Ok(state.pipeline().render_notation(&notation)?)
    });
    state.respond(result, query.client_id.as_deref())
}

async fn json_to_svg(
    State(state): State<AppState>,
    Path(payload): Path<String>,
    Query(query): Query<RenderQuery>,
) -> Response {
    let result = decode_payload(&payload).and_then(|document| {
        debug!(bytes = document.len(), "rendering json document");
        Ok(state.pipeline().render_json(&document)?)
    });
    state.respond(result, query.client_id.as_deref())
}

async fn yaml_to_svg(
    State(state): State<AppState>,
    Path(payload): Path<String>,
    Query(query): Query<RenderQuery>,
) -> Response {
    let result = decode_payload(&payload).and_then(|document| {
        debug!(bytes = document.len(), "rendering yaml document");
        Ok(state.pipeline().render_yaml(&document)?)
    });
    state.respond(result, query.client_id.as_deref())
}

/// base64url, padding optional.
fn decode_payload(payload: &str) -> Result<String, ApiError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|err| ApiError::InvalidPayload(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| ApiError::InvalidPayload(err.to_string()))
}

fn svg_response(svg: String) -> Response {
    let mut response = svg.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(SVG_CONTENT_TYPE),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
