#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode, header},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use gantt_tool::{ChartConfig, cache::DEFAULT_TTL, http_api};
use serde_json::json;
use tower::util::ServiceExt;

const NOTATION: &str = "\
project lasts 2020/4/1 to 2020/4/30
today is 2020/4/10
design: Design work
  >2020/4/1
  =5 days
";

fn new_router() -> axum::Router {
    let state = http_api::AppState::new(ChartConfig::default(), DEFAULT_TTL);
    http_api::router(state)
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

fn encode(input: &str) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = new_router();
    let (status, _, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn notation_payload_renders_svg() {
    let app = new_router();
    let (status, headers, body) = get(&app, &format!("/sch/svg/{}", encode(NOTATION))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_TYPE],
        "image/svg+xml; charset=utf-8"
    );
    assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    assert!(body.starts_with("<?xml"));
    assert!(body.contains(">Design work</text>"));
}

#[tokio::test]
async fn padded_payloads_are_accepted() {
    let app = new_router();
    let padded = base64::engine::general_purpose::URL_SAFE.encode(NOTATION);
    let (status, _, body) = get(&app, &format!("/sch/svg/{padded}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(">Design work</text>"));
}

#[tokio::test]
async fn json_payload_renders_svg() {
    let app = new_router();
    let document = json!({
        "project": {"start": "2020/4/1", "end": "2020/4/30", "today": "2020/4/10"},
        "task": [{"name": "A", "text": "From JSON", "plan": {"start": "2020/4/1", "period": 2}}]
    });
    let (status, _, body) = get(&app, &format!("/json/svg/{}", encode(&document.to_string()))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(">From JSON</text>"));
}

#[tokio::test]
async fn yaml_payload_renders_svg() {
    let app = new_router();
    let document = "\
project:
  start: 2020/4/1
  end: 2020/4/30
  today: 2020/4/10
task:
  - name: A
    text: From YAML
    plan:
      start: 2020/4/1
      period: 2 days
";
    let (status, headers, body) = get(&app, &format!("/yaml/svg/{}", encode(document))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_TYPE],
        "image/svg+xml; charset=utf-8"
    );
    assert!(body.contains(">From YAML</text>"));

    let (_, _, body) = get(&app, &format!("/yaml/svg/{}", encode("task: [unclosed"))).await;
    assert!(body.contains("invalid document"));
}

#[tokio::test]
async fn errors_are_drawn_as_svg() {
    let app = new_router();
    let (status, headers, body) = get(&app, "/sch/svg/not*base64").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_TYPE],
        "image/svg+xml; charset=utf-8"
    );
    assert!(body.contains("invalid payload"));
    assert!(body.contains("width=\"640px\""));

    let missing_today = encode("project lasts 2020/4/1 to 2020/4/30\n");
    let (_, _, body) = get(&app, &format!("/sch/svg/{missing_today}")).await;
    assert!(body.contains("missing required field project.today"));
}

#[tokio::test]
async fn failures_fall_back_to_the_clients_last_chart() {
    let app = new_router();
    let (_, _, good) = get(&app, &format!("/sch/svg/{}?client_id=c1", encode(NOTATION))).await;
    assert!(good.contains("width=\"480px\" height=\"112px\""));

    let broken = encode(&NOTATION.replace(">2020/4/1", ">ghost's end"));
    let (status, _, body) = get(&app, &format!("/sch/svg/{broken}?client_id=c1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(">Design work</text>"));
    assert!(body.contains("refers to &apos;ghost&apos;"));
    assert!(body.contains("height=\"132px\""));

    // Another client has nothing cached and gets the bare error document.
    let (_, _, body) = get(&app, &format!("/sch/svg/{broken}?client_id=c2")).await;
    assert!(!body.contains(">Design work</text>"));
    assert!(body.contains("width=\"640px\""));
}

#[tokio::test]
async fn charts_are_cached_per_client_only() {
    let state = http_api::AppState::new(ChartConfig::default(), DEFAULT_TTL);
    let cache = state.cache();
    let app = http_api::router(state);

    get(&app, &format!("/sch/svg/{}", encode(NOTATION))).await;
    assert!(cache.is_empty());

    get(&app, &format!("/sch/svg/{}?client_id=c1", encode(NOTATION))).await;
    assert_eq!(cache.len(), 1);
    assert!(cache.get("c1").is_some());
}
