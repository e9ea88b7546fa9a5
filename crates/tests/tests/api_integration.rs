use std::io::Write as _;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use boussole_api::{build_app, build_app_with_config, ApiConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    build_app(None).expect("app should build")
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn health_metrics(app: &Router) -> Value {
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    body_json(response).await["metrics"].clone()
}

fn resolve_request(payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/search/resolve")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_builtin_lexicon() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = body_json(response).await;
    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["lexicon"]["source"], "builtin");
    assert_eq!(parsed["metrics"]["requests_total"], 0);
}

#[tokio::test]
async fn resolve_returns_route_and_display() {
    let response = app()
        .oneshot(resolve_request(json!({
            "query": "Hotels in Oran",
            "locale": "fr"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let parsed = body_json(response).await;

    assert_eq!(parsed["classification"]["intent"], "sector");
    assert_eq!(parsed["classification"]["normalized_query"], "hotels in oran");
    assert_eq!(parsed["classification"]["matched_sector"], "tourism");
    assert_eq!(parsed["classification"]["location_code"], "02");
    assert_eq!(parsed["rule"], "sector_keyword");
    assert_eq!(parsed["locale"], "fr");
    assert_eq!(
        parsed["route"],
        "/fr/explore?q=hotels+in+oran&sector=tourism&location=02"
    );
    assert_eq!(parsed["display"]["icon"], "factory");
}

#[tokio::test]
async fn resolve_detects_locale_when_missing() {
    let response = app()
        .oneshot(resolve_request(json!({ "query": "شراء سيارة مستعملة" })))
        .await
        .unwrap();

    let parsed = body_json(response).await;
    assert_eq!(parsed["classification"]["intent"], "market");
    assert_eq!(parsed["locale"], "ar");
    assert!(parsed["route"]
        .as_str()
        .unwrap()
        .starts_with("/ar/marketplace/search?q="));
}

#[tokio::test]
async fn resolve_via_query_string() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/v1/search/resolve?q=wilaya%20statistics&locale=en")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = body_json(response).await;
    assert_eq!(parsed["classification"]["location_code"], "all");
    assert_eq!(parsed["route"], "/en/explore?q=wilaya+statistics");
}

#[tokio::test]
async fn empty_query_still_resolves() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/v1/search/resolve")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = body_json(response).await;
    assert_eq!(parsed["classification"]["intent"], "fallback");
    assert_eq!(parsed["rule"], "empty_query");
    assert_eq!(parsed["route"], "/en/explore?q=");
}

#[tokio::test]
async fn unsupported_locale_is_rejected() {
    let response = app()
        .oneshot(resolve_request(json!({ "query": "oran", "locale": "de" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let parsed = body_json(response).await;
    assert_eq!(parsed["error"], "unsupported_locale");
}

#[tokio::test]
async fn oversized_query_is_rejected_before_classification() {
    let app = app();
    let response = app
        .clone()
        .oneshot(resolve_request(json!({ "query": "oran ".repeat(120) })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let parsed = body_json(response).await;
    assert_eq!(parsed["error"], "query_too_long");

    let metrics = health_metrics(&app).await;
    assert_eq!(metrics["requests_total"], 0);
    assert_eq!(metrics["rejected_total"], 1);
    assert_eq!(metrics["intents"]["data"], 0);
}

#[tokio::test]
async fn oversized_body_is_refused() {
    let payload = json!({ "query": "x".repeat(17 * 1024) }).to_string();
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/search/resolve")
                .header("content-type", "application/json")
                .header("content-length", payload.len().to_string())
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn rate_limit_applies_per_client() {
    let app = build_app_with_config(ApiConfig {
        rate_limit_window: Duration::from_secs(60),
        rate_limit_max: 2,
        ..ApiConfig::from_env()
    })
    .expect("app should build");

    let request = |client: &str| {
        Request::builder()
            .uri("/v1/search/resolve?q=oran")
            .header("x-forwarded-for", format!("{client}, 10.0.0.1"))
            .body(Body::empty())
            .unwrap()
    };

    for expected_remaining in ["1", "0"] {
        let response = app.clone().oneshot(request("203.0.113.7")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-remaining"], expected_remaining);
    }

    let response = app.clone().oneshot(request("203.0.113.7")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response.headers()["retry-after"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));
    assert_eq!(body_json(response).await["error"], "rate_limited");

    let response = app.clone().oneshot(request("198.51.100.4")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let metrics = health_metrics(&app).await;
    assert_eq!(metrics["requests_total"], 3);
    assert_eq!(metrics["rejected_total"], 1);
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
}

#[tokio::test]
async fn display_endpoint_covers_every_intent() {
    let app = app();
    for intent in ["market", "data", "sector", "ai", "fallback"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/v1/search/display/{intent}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let parsed = body_json(response).await;
        assert_eq!(parsed["intent"], intent);
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/search/display/weather")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let metrics = health_metrics(&app).await;
    assert_eq!(metrics["rejected_total"], 0);
    assert_eq!(metrics["requests_total"], 0);
}

#[tokio::test]
async fn metrics_count_resolutions() {
    let app = app();
    for query in ["used iphone", "oran", "zzz"] {
        let response = app
            .clone()
            .oneshot(resolve_request(json!({ "query": query })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(resolve_request(json!({ "query": "oran", "locale": "de" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let metrics = health_metrics(&app).await;
    assert_eq!(metrics["requests_total"], 3);
    assert_eq!(metrics["rejected_total"], 1);
    assert_eq!(metrics["intents"]["market"], 1);
    assert_eq!(metrics["intents"]["data"], 1);
    assert_eq!(metrics["intents"]["fallback"], 1);
    assert_eq!(metrics["located_total"], 1);
}

#[tokio::test]
async fn custom_lexicon_file_is_served() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "{}",
        json!({
            "market_keywords": ["bazaar"],
            "data_keywords": ["figures"],
            "sectors": [{ "id": "fishing", "keywords": ["sardine"] }],
            "ai_starters": ["why"],
            "locations": [{ "name": "Annaba", "code": "23" }]
        })
    )
    .unwrap();

    let app = build_app(Some(file.path())).expect("app should build");

    let response = app
        .clone()
        .oneshot(resolve_request(json!({ "query": "sardine annaba", "locale": "en" })))
        .await
        .unwrap();
    let parsed = body_json(response).await;
    assert_eq!(parsed["route"], "/en/explore?q=sardine+annaba&sector=fishing&location=23");

    let response = app
        .oneshot(Request::builder().uri("/v1/lexicon").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let parsed = body_json(response).await;
    assert_eq!(parsed["summary"]["sectors"], json!(["fishing"]));
}

#[test]
fn broken_lexicon_file_fails_startup() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();
    assert!(build_app(Some(file.path())).is_err());
}
