use crate::html::render_table;
use analytics::PortfolioReport;
use std::path::Path;

/// Writes the results table to `path`, replacing any previous report.
pub async fn write_report(path: &Path, report: &PortfolioReport) -> std::io::Result<()> {
    tokio::fs::write(path, render_table(report)).await?;
    tracing::info!(path = %path.display(), rows = report.rows.len(), "Report exported.");
    Ok(())
}
