use crate::{
    error::AppError,
    export::write_report,
    form::parse_submission,
    html::{render_form, render_page, Outcome},
    AppState,
};
use analytics::PortfolioReport;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use chrono::{NaiveDate, Utc};
use core_types::PairSpec;
use engine::{ReportRequest, MAX_PAIRS};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct FormQuery {
    #[serde(default = "default_pairs")]
    pub pairs: usize,
}
fn default_pairs() -> usize { 1 }

#[derive(Debug, Deserialize)]
pub struct PairBody {
    pub long: String,
    pub short: String,
}

/// Body of `POST /api/report`.
#[derive(Debug, Deserialize)]
pub struct ReportBody {
    pub pairs: Vec<PairBody>,
    pub start_date: Option<NaiveDate>,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// # GET /
/// Renders the input form with `?pairs=N` ticker rows, plus the risk-free rate of
/// the last successful submission once there is one.
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FormQuery>,
) -> Html<String> {
    let rows = query.pairs.clamp(1, MAX_PAIRS);
    let last_rate = *state.last_risk_free_rate.read().await;
    Html(render_page(
        &render_form(rows, state.default_start),
        last_rate.map(Outcome::LastRiskFreeRate),
    ))
}

/// # POST /calculate
/// Runs the submitted form, writes the export file and renders the results page.
pub async fn calculate(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let rows = fields
        .iter()
        .filter(|(name, _)| name.starts_with("long_"))
        .count()
        .clamp(1, MAX_PAIRS);

    let (form, result) = match parse_submission(&fields, state.default_start, today()) {
        Ok(request) => (
            render_form(rows, request.start_date),
            run_and_export(&state, &request).await,
        ),
        Err(err) => (render_form(rows, state.default_start), Err(err)),
    };

    match result {
        Ok(report) => {
            let saved_to = state.report_path.display().to_string();
            Html(render_page(
                &form,
                Some(Outcome::Success {
                    report: &report,
                    saved_to: &saved_to,
                }),
            ))
            .into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "Form submission failed.");
            let page = render_page(&form, Some(Outcome::Failure(&err.public_message())));
            (err.status(), Html(page)).into_response()
        }
    }
}

async fn run_and_export(
    state: &AppState,
    request: &ReportRequest,
) -> Result<PortfolioReport, AppError> {
    let report = state.engine.run(request).await?;
    *state.last_risk_free_rate.write().await = Some(report.risk_free_rate_pct);
    write_report(&state.report_path, &report).await?;
    Ok(report)
}

/// # POST /api/report
/// Returns the `PortfolioReport` as JSON. Nothing is written to disk.
pub async fn api_report(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReportBody>,
) -> Result<Json<PortfolioReport>, AppError> {
    let pairs = body
        .pairs
        .iter()
        .map(|p| PairSpec::new(&p.long, &p.short))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let request = ReportRequest {
        pairs,
        start_date: body.start_date.unwrap_or(state.default_start),
        as_of: today(),
    };
    let report = state.engine.run(&request).await?;
    *state.last_risk_free_rate.write().await = Some(report.risk_free_rate_pct);
    Ok(Json(report))
}

/// # GET /api/health
pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
