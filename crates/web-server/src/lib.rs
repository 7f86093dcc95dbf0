use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use configuration::Config;
use engine::ReportEngine;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod export;
pub mod form;
pub mod handlers;
pub mod html;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub engine: ReportEngine,
    /// Where `POST /calculate` writes the HTML export.
    pub report_path: PathBuf,
    pub default_start: NaiveDate,
    /// Risk-free rate (percent) of the last successful submission. Display only.
    pub last_risk_free_rate: RwLock<Option<Decimal>>,
}

impl AppState {
    pub fn new(engine: ReportEngine, report_path: PathBuf, default_start: NaiveDate) -> Self {
        Self {
            engine,
            report_path,
            default_start,
            last_risk_free_rate: RwLock::new(None),
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/", get(handlers::index))
        .route("/calculate", post(handlers::calculate))
        .route("/api/health", get(handlers::health))
        .route("/api/report", post(handlers::api_report))
        .with_state(state)
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(64 * 1024))
}

/// The main function to configure and run the web server.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    // Tracing is initialized by the caller.
    let engine = ReportEngine::from_config(config)?;
    let state = Arc::new(AppState::new(
        engine,
        config.report.output_path.clone(),
        config.report.default_start_date,
    ));
    let app = build_router(state);

    let addr = config.server.bind_addr;
    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
