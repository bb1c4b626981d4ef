use std::collections::BTreeMap;

use serde::Serialize;

use crate::credentials::TokenState;
use crate::error::{Error, Result};

/// One data row, keyed by lower-cased column name.
pub type Record = BTreeMap<String, String>;

/// The token state a result was fetched with, so callers can persist it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSnapshot {
    pub access_token: Option<String>,
    pub token_expires: Option<u64>,
}

impl From<&TokenState> for AuthSnapshot {
    fn from(token: &TokenState) -> Self {
        Self {
            access_token: token.access_token.clone(),
            token_expires: token.token_expires,
        }
    }
}

/// A downloaded report. Values are kept as the text the API sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportResult {
    #[serde(rename = "report")]
    pub report_name: String,
    pub timeframe: String,
    /// Second field of the totals line.
    pub total: String,
    #[serde(rename = "columns")]
    pub column_names: Vec<String>,
    #[serde(rename = "data")]
    pub records: Vec<Record>,
    pub auth: AuthSnapshot,
}

/// Parses a TSV report body.
///
/// The layout is positional: a quoted title line `"NAME (timeframe)"`, a
/// tab separated header, data rows, and a totals line whose second field is
/// the total. A body with fewer than those three lines, or a row whose width
/// differs from the header, is rejected.
pub fn parse_report(body: &str, token: &TokenState) -> Result<ReportResult> {
    let mut lines: Vec<&str> = body.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    if lines.len() < 3 {
        return Err(Error::Parse(format!(
            "expected title, header and totals lines, got {} line(s)",
            lines.len()
        )));
    }

    let title = lines[0].replace('"', "");
    let report_name = title
        .split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or_else(|| Error::Parse("empty title line".to_string()))?;
    let timeframe = title
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(inner, _)| inner.to_string())
        .ok_or_else(|| Error::Parse(format!("title line has no (timeframe): {}", title)))?;

    let totals = lines[lines.len() - 1];
    let total = totals
        .split('\t')
        .nth(1)
        .map(str::to_string)
        .ok_or_else(|| Error::Parse(format!("totals line has no count field: {}", totals)))?;

    let column_names: Vec<String> = lines[1].split('\t').map(str::to_string).collect();
    let keys: Vec<String> = column_names.iter().map(|c| c.to_lowercase()).collect();

    let rows = &lines[2..lines.len() - 1];
    let mut records = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let values: Vec<&str> = row.split('\t').collect();
        if values.len() != keys.len() {
            return Err(Error::Parse(format!(
                "row {} has {} field(s), header has {}",
                idx + 1,
                values.len(),
                keys.len()
            )));
        }
        records.push(
            keys.iter()
                .cloned()
                .zip(values.into_iter().map(str::to_string))
                .collect::<Record>(),
        );
    }

    tracing::debug!(report = %report_name, rows = records.len(), "parsed report");

    Ok(ReportResult {
        report_name,
        timeframe,
        total,
        column_names,
        records,
        auth: AuthSnapshot::from(token),
    })
}
