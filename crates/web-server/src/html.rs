use analytics::{PortfolioReport, COLUMNS};
use chrono::NaiveDate;
use rust_decimal::Decimal;

const TITLE: &str = "Stock Pair Returns";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// The results table, pair rows then the "Total Portfolio" row.
///
/// This is also the exact content of the exported report file.
pub fn render_table(report: &PortfolioReport) -> String {
    let mut html = String::from("<table border=\"1\" class=\"dataframe\">\n");
    html.push_str("  <thead>\n    <tr style=\"text-align: right;\">\n");
    for column in COLUMNS {
        html.push_str(&format!("      <th>{}</th>\n", escape(column)));
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");
    for row in report.all_rows() {
        html.push_str("    <tr>\n");
        for cell in row.cells() {
            html.push_str(&format!("      <td>{}</td>\n", escape(&cell)));
        }
        html.push_str("    </tr>\n");
    }
    html.push_str("  </tbody>\n</table>");
    html
}

/// The input form with `rows` (long, short) ticker rows.
pub fn render_form(rows: usize, start_date: NaiveDate) -> String {
    let mut html = format!(
        "<form method=\"get\" action=\"/\">\n  <label>Number of Pairs <input type=\"number\" name=\"pairs\" min=\"1\" value=\"{}\"></label>\n  <button type=\"submit\">Update</button>\n</form>\n",
        rows
    );
    html.push_str("<form method=\"post\" action=\"/calculate\">\n");
    for i in 1..=rows {
        html.push_str(&format!(
            "  <div class=\"pair\">\n    <label>Long Ticker {i} <input type=\"text\" name=\"long_{i}\"></label>\n    <label>Short Ticker {i} <input type=\"text\" name=\"short_{i}\"></label>\n  </div>\n"
        ));
    }
    html.push_str(&format!(
        "  <label>Start Date <input type=\"date\" name=\"start_date\" value=\"{}\"></label>\n  <button type=\"submit\">Calculate Returns</button>\n</form>\n",
        start_date.format("%Y-%m-%d")
    ));
    html
}

/// What the page shows below the form.
pub enum Outcome<'a> {
    Success {
        report: &'a PortfolioReport,
        saved_to: &'a str,
    },
    Failure(&'a str),
    /// No submission on this request; the rate (percent) from the last one.
    LastRiskFreeRate(Decimal),
}

fn advanced_details(line: &str) -> String {
    format!(
        "<details>\n  <summary>Advanced Details</summary>\n  <p>{}</p>\n</details>\n",
        line
    )
}

pub fn render_page(form: &str, outcome: Option<Outcome<'_>>) -> String {
    let mut body = format!("<h1>{}</h1>\n", TITLE);
    body.push_str(form);

    match outcome {
        Some(Outcome::Success { report, saved_to }) => {
            body.push_str(&format!(
                "<p class=\"success\">Results saved to {}</p>\n",
                escape(saved_to)
            ));
            body.push_str(&render_table(report));
            body.push('\n');
            body.push_str(&advanced_details(&format!(
                "Calculated Risk-Free Rate: {:.2}%",
                report.risk_free_rate_pct
            )));
        }
        Some(Outcome::Failure(message)) => {
            body.push_str(&format!("<p class=\"error\">{}</p>\n", escape(message)));
        }
        Some(Outcome::LastRiskFreeRate(rate)) => {
            body.push_str(&advanced_details(&format!(
                "Last Calculated Risk-Free Rate: {:.2}%",
                rate
            )));
        }
        None => {}
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        TITLE, body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::ReportRow;
    use core_types::PriceField;

    fn row(long: &str, short: &str) -> ReportRow {
        ReportRow {
            long_ticker: long.to_string(),
            short_ticker: short.to_string(),
            one_month: Decimal::new(1000, 2),
            three_months: Decimal::new(-250, 2),
            one_year: Decimal::new(3, 0),
            cagr: Decimal::new(312, 2),
            volatility: Decimal::new(1875, 2),
            max_drawdown: Decimal::new(-742, 2),
            sharpe_ratio: Decimal::new(-5, 1),
        }
    }

    fn report() -> PortfolioReport {
        let d = NaiveDate::from_ymd_opt(2023, 7, 17).unwrap();
        PortfolioReport {
            start_date: d,
            as_of: d,
            price_field: PriceField::AdjustedClose,
            risk_free_rate_pct: Decimal::new(4213, 3),
            rows: vec![row("AAPL", "MSFT")],
            total: row("Total Portfolio", ""),
        }
    }

    #[test]
    fn table_has_headers_rows_and_total() {
        let html = render_table(&report());
        assert!(html.starts_with("<table border=\"1\" class=\"dataframe\">"));
        assert_eq!(html.matches("<th>").count(), 9);
        assert!(html.contains("<th>Difference (CAGR)</th>"));
        assert!(html.contains("<td>10.00%</td>"));
        assert!(html.contains("<td>3.00%</td>"));
        assert!(html.contains("<td>-0.50</td>"));
        assert!(html.contains("<td>Total Portfolio</td>"));
        assert_eq!(html.matches("<tr>").count(), 2);
    }

    #[test]
    fn page_shows_success_and_risk_free_rate() {
        let report = report();
        let page = render_page(
            &render_form(1, report.start_date),
            Some(Outcome::Success {
                report: &report,
                saved_to: "stock_returns.html",
            }),
        );
        assert!(page.contains("Results saved to stock_returns.html"));
        assert!(page.contains("Calculated Risk-Free Rate: 4.21%"));
    }

    #[test]
    fn idle_page_shows_last_risk_free_rate() {
        let form = render_form(1, NaiveDate::from_ymd_opt(2023, 7, 17).unwrap());
        let page = render_page(&form, Some(Outcome::LastRiskFreeRate(Decimal::new(4213, 3))));
        assert!(page.contains("Last Calculated Risk-Free Rate: 4.21%"));
        assert!(!page.contains("Results saved to"));
        assert!(!render_page(&form, None).contains("Advanced Details"));
    }

    #[test]
    fn form_renders_requested_rows() {
        let form = render_form(3, NaiveDate::from_ymd_opt(2023, 7, 17).unwrap());
        assert!(form.contains("name=\"long_3\""));
        assert!(!form.contains("name=\"long_4\""));
        assert!(form.contains("value=\"2023-07-17\""));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b>&\"'"), "&lt;b&gt;&amp;&quot;&#39;");
    }
}
