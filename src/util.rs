use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Turns a hand-written AWQL string into its wire form:
/// `"SELECT Date, Clicks FROM R"` -> `"SELECT+Date,Clicks+FROM+R"`.
pub(crate) fn normalize_literal_query(query: &str) -> String {
    query
        .trim()
        .replace(", ", ",")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("+")
}

/// Form body sent to the report endpoint. The output format is always TSV.
pub(crate) fn frame_body(query: &str) -> String {
    format!("__rdquery={}&__fmt=TSV", query)
}

pub(crate) fn join_fields<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| f.as_ref().trim())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_queries_use_plus_separators() {
        assert_eq!(
            normalize_literal_query(
                "SELECT Date, Clicks FROM ACCOUNT_PERFORMANCE_REPORT DURING 20120101, 20150125"
            ),
            "SELECT+Date,Clicks+FROM+ACCOUNT_PERFORMANCE_REPORT+DURING+20120101,20150125"
        );
    }

    #[test]
    fn literal_queries_collapse_runs_of_spaces() {
        assert_eq!(
            normalize_literal_query("  SELECT  Date FROM\tR  "),
            "SELECT+Date+FROM+R"
        );
    }

    #[test]
    fn frames_as_tsv() {
        assert_eq!(frame_body("SELECT+A+FROM+B"), "__rdquery=SELECT+A+FROM+B&__fmt=TSV");
    }
}
