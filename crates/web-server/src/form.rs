use crate::error::AppError;
use chrono::NaiveDate;
use core_types::PairSpec;
use engine::ReportRequest;
use std::collections::BTreeMap;

/// Parses a submitted form into a report request.
///
/// Expects `long_<n>` / `short_<n>` fields (1-based) and an optional `start_date`.
/// Rows left completely blank are skipped; a half-filled row is an error. The pair
/// count is checked by `ReportRequest::validate`.
pub fn parse_submission(
    fields: &[(String, String)],
    default_start: NaiveDate,
    as_of: NaiveDate,
) -> Result<ReportRequest, AppError> {
    let mut rows: BTreeMap<usize, (String, String)> = BTreeMap::new();
    let mut start_date = default_start;

    for (name, value) in fields {
        let value = value.trim();
        if name == "start_date" {
            if !value.is_empty() {
                start_date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                    AppError::BadRequest(format!("'{}' is not a YYYY-MM-DD date", value))
                })?;
            }
            continue;
        }

        let (side, index) = match name.split_once('_') {
            Some((side @ ("long" | "short"), index)) => (side, index),
            _ => continue,
        };
        let index: usize = index
            .parse()
            .map_err(|_| AppError::BadRequest(format!("unexpected field '{}'", name)))?;

        let row = rows.entry(index).or_default();
        if side == "long" {
            row.0 = value.to_string();
        } else {
            row.1 = value.to_string();
        }
    }

    let mut pairs = Vec::new();
    for (index, (long, short)) in rows {
        if long.is_empty() && short.is_empty() {
            continue;
        }
        let pair = PairSpec::new(&long, &short)
            .map_err(|e| AppError::BadRequest(format!("pair {}: {}", index, e)))?;
        pairs.push(pair);
    }

    if pairs.is_empty() {
        return Err(AppError::BadRequest("enter at least one pair".to_string()));
    }

    Ok(ReportRequest {
        pairs,
        start_date,
        as_of,
    })
}
