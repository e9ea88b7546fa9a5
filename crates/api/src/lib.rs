mod rate_limit;

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::extract::{Json, Path as AxumPath, Query, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{body::Body, Router};
use boussole_core::{Intent, Lexicon, LexiconSummary, Locale, SearchRouter};
use boussole_observability::AppMetrics;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use crate::rate_limit::{RateDecision, SlidingWindowLimiter};

const MAX_BODY_BYTES: usize = 16 * 1024;
const MAX_QUERY_CHARS: usize = 512;

#[derive(Clone)]
pub struct ApiState {
    pub router: Arc<SearchRouter>,
    pub metrics: Arc<AppMetrics>,
    pub limiter: SlidingWindowLimiter,
    pub allowed_origins: Arc<Vec<HeaderValue>>,
    pub lexicon_source: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: boussole_observability::MetricsSnapshot,
    lexicon: LexiconResponse,
}

#[derive(Debug, Serialize)]
struct LexiconResponse {
    source: String,
    default_locale: Locale,
    summary: LexiconSummary,
}

#[derive(Debug, Clone, Deserialize)]
struct ResolveRequest {
    query: String,
    locale: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResolveQuery {
    q: Option<String>,
    locale: Option<String>,
}

#[derive(Debug, Serialize)]
struct DisplayResponse {
    intent: Intent,
    icon: &'static str,
    label_key: &'static str,
    color_class: &'static str,
}

/// Runtime settings, read from `BOUSSOLE_*` environment variables.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub lexicon_path: Option<PathBuf>,
    pub default_locale: Locale,
    pub rate_limit_window: Duration,
    pub rate_limit_max: usize,
    pub allowed_origins: Vec<HeaderValue>,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            lexicon_path: env::var("BOUSSOLE_LEXICON_PATH").ok().map(PathBuf::from),
            default_locale: env::var("BOUSSOLE_DEFAULT_LOCALE")
                .ok()
                .and_then(|value| Locale::parse(&value))
                .unwrap_or(Locale::En),
            rate_limit_window: Duration::from_secs(
                env::var("BOUSSOLE_RATE_LIMIT_WINDOW_SECONDS")
                    .ok()
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(60),
            ),
            rate_limit_max: env::var("BOUSSOLE_RATE_LIMIT_MAX")
                .ok()
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(120),
            allowed_origins: parse_allowed_origins(),
        }
    }
}

/// Builds the HTTP app from the environment. Without a lexicon path the
/// built-in tables are used.
pub fn build_app(lexicon_path: Option<&Path>) -> Result<Router> {
    let config = ApiConfig {
        lexicon_path: lexicon_path.map(Path::to_path_buf),
        ..ApiConfig::from_env()
    };
    build_app_with_config(config)
}

pub fn build_app_with_config(config: ApiConfig) -> Result<Router> {
    let (lexicon, lexicon_source) = match config.lexicon_path.as_deref() {
        Some(path) => (
            Arc::new(
                Lexicon::from_json_file(path)
                    .with_context(|| format!("failed loading lexicon from {}", path.display()))?,
            ),
            path.display().to_string(),
        ),
        None => (Lexicon::builtin(), "builtin".to_string()),
    };

    let state = ApiState {
        router: Arc::new(SearchRouter::new(lexicon, config.default_locale)),
        metrics: AppMetrics::shared(),
        limiter: SlidingWindowLimiter::new(config.rate_limit_window, config.rate_limit_max),
        allowed_origins: Arc::new(config.allowed_origins),
        lexicon_source,
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/search/resolve", get(resolve_get).post(resolve_post))
        .route("/v1/search/display/:intent", get(display))
        .route("/v1/lexicon", get(lexicon_summary))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
        lexicon: lexicon_response(&state),
    };
    (StatusCode::OK, Json(payload))
}

async fn lexicon_summary(State(state): State<ApiState>) -> impl IntoResponse {
    (StatusCode::OK, Json(lexicon_response(&state)))
}

async fn resolve_post(
    State(state): State<ApiState>,
    Json(input): Json<ResolveRequest>,
) -> Response {
    resolve_response(&state, &input.query, input.locale.as_deref())
}

async fn resolve_get(State(state): State<ApiState>, Query(input): Query<ResolveQuery>) -> Response {
    resolve_response(
        &state,
        input.q.as_deref().unwrap_or_default(),
        input.locale.as_deref(),
    )
}

async fn display(AxumPath(intent): AxumPath<String>) -> Response {
    let Some(intent) = Intent::parse(&intent) else {
        return error_response(
            StatusCode::NOT_FOUND,
            "unknown_intent",
            &format!("`{intent}` is not one of market, data, sector, ai, fallback"),
        );
    };

    let display = boussole_core::display_for(intent);
    (
        StatusCode::OK,
        Json(DisplayResponse {
            intent,
            icon: display.icon,
            label_key: display.label_key,
            color_class: display.color_class,
        }),
    )
        .into_response()
}

fn resolve_response(state: &ApiState, query: &str, locale: Option<&str>) -> Response {
    let started = Instant::now();

    let locale = match requested_locale(locale) {
        Ok(locale) => locale,
        Err(value) => {
            state.metrics.inc_rejected();
            return error_response(
                StatusCode::BAD_REQUEST,
                "unsupported_locale",
                &format!("locale `{value}` is not one of en, fr, ar"),
            );
        }
    };

    if query.chars().count() > MAX_QUERY_CHARS {
        state.metrics.inc_rejected();
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "query_too_long",
            &format!("query must be at most {MAX_QUERY_CHARS} characters"),
        );
    }

    state.metrics.inc_request();
    let resolution = state.router.resolve(query, locale);
    state.metrics.record_classification(
        resolution.classification.intent,
        resolution.classification.location_code.is_some(),
    );
    state.metrics.observe_latency(started.elapsed());

    info!(
        intent = resolution.classification.intent.as_str(),
        rule = ?resolution.rule,
        locale = resolution.locale.as_code(),
        sector = resolution.classification.matched_sector.as_deref(),
        location = resolution.classification.location_code.as_deref(),
        "search resolved"
    );

    (StatusCode::OK, Json(resolution)).into_response()
}

/// Blank or missing means "detect from the query"; anything else must be a
/// supported locale.
fn requested_locale(value: Option<&str>) -> std::result::Result<Option<Locale>, String> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => Locale::parse(value)
            .map(Some)
            .ok_or_else(|| value.to_string()),
    }
}

fn lexicon_response(state: &ApiState) -> LexiconResponse {
    LexiconResponse {
        source: state.lexicon_source.clone(),
        default_locale: state.router.default_locale(),
        summary: state.router.lexicon().summary(),
    }
}

fn error_response(status: StatusCode, error: &str, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": error,
            "message": message,
        })),
    )
        .into_response()
}

const DEV_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:5173"];

/// `BOUSSOLE_ALLOWED_ORIGINS` is a comma separated list; unparseable entries
/// are dropped.
fn parse_allowed_origins() -> Vec<HeaderValue> {
    let configured = env::var("BOUSSOLE_ALLOWED_ORIGINS").unwrap_or_default();
    let origins = configured
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    if origins.is_empty() {
        DEV_ORIGINS.iter().copied().map(HeaderValue::from_static).collect()
    } else {
        origins
    }
}

fn build_cors_layer(allowed_origins: &[HeaderValue]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins.iter().cloned()))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || request.uri().path() == "/health" {
        return next.run(request).await;
    }

    match state.limiter.check(&client_key(&request)) {
        RateDecision::Allowed { remaining } => {
            let mut response = next.run(request).await;
            if let Ok(value) = HeaderValue::from_str(&remaining.to_string()) {
                response
                    .headers_mut()
                    .insert(header::HeaderName::from_static("x-ratelimit-remaining"), value);
            }
            response
        }
        RateDecision::Limited { retry_after } => {
            state.metrics.inc_rejected();
            let mut response = error_response(
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "rate limit exceeded for this IP",
            );
            let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
    }
}

/// Rate limit key: first hop of `x-forwarded-for`, else a shared local bucket.
fn client_key(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').map(str::trim).find(|hop| !hop.is_empty()))
        .unwrap_or("local")
        .to_string()
}

const SECURITY_HEADERS: [(&str, &str); 3] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
];

async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            header::HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    response
}
