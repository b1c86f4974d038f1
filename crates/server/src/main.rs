//! Hemline storefront API server.
//!
//! One binary serves the public catalog, the shopper cart / checkout /
//! account surface and the admin management routes. Product images live on
//! local disk behind `/uploads`. Auth is stateless bearer tokens with an
//! optional Google sign-in flow; `PostgreSQL` sits behind sqlx
//! repositories and Sentry picks up server errors.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request, Response, StatusCode};
use axum::{Router, routing::get};
use sentry::integrations::tracing as sentry_tracing;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hemline_server::config::ServerConfig;
use hemline_server::state::AppState;
use hemline_server::{db, routes};

#[tokio::main]
async fn main() {
    let config = ServerConfig::from_env().expect("failed to load configuration");

    // The guard lives for the whole process; dropping it flushes pending
    // Sentry events.
    let _sentry = config
        .sentry_dsn
        .clone()
        .map(|dsn| init_sentry(&dsn, &config));
    init_tracing();

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("failed to create database pool");
    tracing::info!("Database pool created");

    // Migrations are applied out of band: `hemline migrate`.

    let google_enabled = config.google.is_some();
    let upload_dir = config.upload_dir.clone();
    let addr = config.socket_addr();

    let app = app_router(AppState::new(config, pool), google_enabled, upload_dir);

    tracing::info!("hemline listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

/// Sentry error tracking stays alive as long as the returned guard does.
fn init_sentry(dsn: &str, config: &ServerConfig) -> sentry::ClientInitGuard {
    sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config.sentry_environment.clone().map(Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ))
}

/// Logs go to stdout, as text or as JSON when `HEMLINE_JSON_LOGS` is set,
/// and to Sentry. ERROR and WARN become Sentry events, INFO and DEBUG
/// become breadcrumbs on the next event.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hemline_server=info,tower_http=debug".into());

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(sentry_tracing::layer().event_filter(sentry_filter));

    if std::env::var("HEMLINE_JSON_LOGS").is_ok() {
        registry
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn sentry_filter(meta: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *meta.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// The full middleware stack around the API routes. The Sentry layers sit
/// outermost so every request gets a hub and a transaction.
fn app_router(state: AppState, google_enabled: bool, upload_dir: PathBuf) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(request_span)
        .on_response(finish_span);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes(google_enabled))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(cors_layer())
        .layer(trace)
        .with_state(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// The storefront SPA and the admin UI are served from other origins.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    )
}

fn finish_span(response: &Response<Body>, latency: Duration, span: &Span) {
    span.record("status", response.status().as_u16());
    span.record(
        "latency_ms",
        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
    );
    DefaultOnResponse::default().on_response(response, latency, span);
}

/// Liveness probe; says nothing about dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness probe: 503 until the database answers.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Resolves on Ctrl+C or SIGTERM so in-flight requests can drain.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");

    tracing::info!("Shutdown signal received, draining connections");
}
