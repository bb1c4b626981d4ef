//! AWQL query construction.
//!
//! A query is built either from a [`QueryOptions`] value, from a literal AWQL
//! string, or through the staged [`AwqlBuilder`]. Each builder stage only
//! offers the calls that may legally follow it:
//!
//! ```text
//! init --select--> selected --from--> sourced --where_--> filtered --during--> timeframed
//!                                        |                  |  ^                   |
//!                                        |                  +--+ and               |
//!                                        +--during-------------------------------->+
//!                                        +--send                                 send
//! ```

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::{Error, Result};
use crate::report::ReportResult;
use crate::util::{join_fields, normalize_literal_query};

/// Anything usable as one clause value: a single string or a list of strings.
pub trait IntoFields {
    fn into_fields(self) -> Vec<String>;
}

impl IntoFields for &str {
    fn into_fields(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoFields for String {
    fn into_fields(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoFields for &String {
    fn into_fields(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl IntoFields for Vec<String> {
    fn into_fields(self) -> Vec<String> {
        self
    }
}

impl IntoFields for Vec<&str> {
    fn into_fields(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoFields for &[&str] {
    fn into_fields(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoFields for &[String] {
    fn into_fields(self) -> Vec<String> {
        self.to_vec()
    }
}

impl<const N: usize> IntoFields for [&str; N] {
    fn into_fields(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoFields for DateRange {
    fn into_fields(self) -> Vec<String> {
        vec![self.as_str().to_string()]
    }
}

/// Predefined DURING keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateRange {
    Today,
    Yesterday,
    Last7Days,
    Last14Days,
    Last30Days,
    LastWeek,
    LastBusinessWeek,
    LastWeekSunSat,
    ThisWeekSunToday,
    ThisWeekMonToday,
    ThisMonth,
    LastMonth,
    AllTime,
}

impl DateRange {
    pub fn as_str(self) -> &'static str {
        match self {
            DateRange::Today => "TODAY",
            DateRange::Yesterday => "YESTERDAY",
            DateRange::Last7Days => "LAST_7_DAYS",
            DateRange::Last14Days => "LAST_14_DAYS",
            DateRange::Last30Days => "LAST_30_DAYS",
            DateRange::LastWeek => "LAST_WEEK",
            DateRange::LastBusinessWeek => "LAST_BUSINESS_WEEK",
            DateRange::LastWeekSunSat => "LAST_WEEK_SUN_SAT",
            DateRange::ThisWeekSunToday => "THIS_WEEK_SUN_TODAY",
            DateRange::ThisWeekMonToday => "THIS_WEEK_MON_TODAY",
            DateRange::ThisMonth => "THIS_MONTH",
            DateRange::LastMonth => "LAST_MONTH",
            DateRange::AllTime => "ALL_TIME",
        }
    }
}

/// One clause value as given by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct Fields(pub Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Fields {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(s) => Fields(vec![s]),
            OneOrMany::Many(v) => Fields(v),
        }
    }
}

impl<T: IntoFields> From<T> for Fields {
    fn from(value: T) -> Self {
        Fields(value.into_fields())
    }
}

/// A query described as data, e.g. loaded from JSON:
///
/// ```json
/// { "select": ["Date", "Clicks"], "from": "ACCOUNT_PERFORMANCE_REPORT",
///   "where": "Clicks>100", "and": ["Clicks<150"], "during": "LAST_7_DAYS" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default)]
    pub select: Option<Fields>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default, rename = "where")]
    pub where_clause: Option<String>,
    #[serde(default)]
    pub and: Option<Fields>,
    #[serde(default)]
    pub during: Option<Fields>,
}

/// Normalized clauses: list-valued `select`/`during` are already comma joined,
/// `and` stays a list until rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AwqlQuery {
    select: Option<String>,
    from: Option<String>,
    where_clause: Option<String>,
    and: Vec<String>,
    during: Option<String>,
}

impl AwqlQuery {
    pub(crate) fn from_options(options: &QueryOptions) -> Self {
        let options = options.clone();
        Self {
            select: options.select.map(|f| join_fields(&f.0)),
            from: options.from,
            where_clause: options.where_clause,
            and: options.and.map(|f| f.0).unwrap_or_default(),
            during: options.during.map(|f| join_fields(&f.0)),
        }
    }

    /// Renders the wire form
    /// `SELECT+<select>+FROM+<from>[+WHERE+<where>][+AND+<a>...][+DURING+<during>]`.
    pub(crate) fn to_awql(&self) -> Result<String> {
        let select = self
            .select
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Configuration("query has no SELECT clause".to_string()))?;
        let from = self
            .from
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Configuration("query has no FROM clause".to_string()))?;

        let mut awql = format!("SELECT+{}+FROM+{}", select, from);
        if let Some(where_clause) = self.where_clause.as_deref().filter(|s| !s.is_empty()) {
            awql.push_str("+WHERE+");
            awql.push_str(where_clause);
        }
        if !self.and.is_empty() {
            awql.push_str("+AND+");
            awql.push_str(&self.and.join("+AND+"));
        }
        if let Some(during) = self.during.as_deref().filter(|s| !s.is_empty()) {
            awql.push_str("+DURING+");
            awql.push_str(during);
        }
        Ok(awql)
    }
}

/// A complete query, ready to render once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Query {
    Structured(AwqlQuery),
    Literal(String),
}

impl Query {
    pub(crate) fn render(&self) -> Result<String> {
        match self {
            Query::Structured(q) => q.to_awql(),
            Query::Literal(raw) => {
                let awql = normalize_literal_query(raw);
                if awql.is_empty() {
                    return Err(Error::Configuration("empty AWQL query".to_string()));
                }
                Ok(awql)
            }
        }
    }
}

pub mod stage {
    //! Builder states. They carry no data; they only decide which methods
    //! [`AwqlBuilder`](super::AwqlBuilder) offers.

    #[derive(Debug)]
    pub enum Init {}
    #[derive(Debug)]
    pub enum Selected {}
    #[derive(Debug)]
    pub enum Sourced {}
    /// After `where_`, and after any number of `and`s.
    #[derive(Debug)]
    pub enum Filtered {}
    #[derive(Debug)]
    pub enum Timeframed {}
}

/// A query under construction against one client.
///
/// The builder borrows the client mutably, so only one query can be in
/// flight per client.
#[derive(Debug)]
pub struct AwqlBuilder<'c, S> {
    client: &'c mut Client,
    query: AwqlQuery,
    _stage: PhantomData<S>,
}

impl<'c, S> AwqlBuilder<'c, S> {
    fn advance<T>(self) -> AwqlBuilder<'c, T> {
        AwqlBuilder {
            client: self.client,
            query: self.query,
            _stage: PhantomData,
        }
    }

    /// The wire form this builder would send right now.
    pub fn to_awql(&self) -> Result<String> {
        self.query.to_awql()
    }
}

impl<'c> AwqlBuilder<'c, stage::Init> {
    pub(crate) fn new(client: &'c mut Client) -> Self {
        Self {
            client,
            query: AwqlQuery::default(),
            _stage: PhantomData,
        }
    }

    pub fn select(mut self, rows: impl IntoFields) -> AwqlBuilder<'c, stage::Selected> {
        self.query.select = Some(join_fields(&rows.into_fields()));
        self.advance()
    }
}

impl<'c> AwqlBuilder<'c, stage::Selected> {
    pub fn from(mut self, report: impl Into<String>) -> AwqlBuilder<'c, stage::Sourced> {
        self.query.from = Some(report.into());
        self.advance()
    }
}

impl<'c> AwqlBuilder<'c, stage::Sourced> {
    pub fn where_(mut self, expr: impl Into<String>) -> AwqlBuilder<'c, stage::Filtered> {
        self.query.where_clause = Some(expr.into());
        self.advance()
    }

    pub fn during(mut self, timeframe: impl IntoFields) -> AwqlBuilder<'c, stage::Timeframed> {
        self.query.during = Some(join_fields(&timeframe.into_fields()));
        self.advance()
    }

    pub fn send(self) -> Result<ReportResult> {
        self.client.execute(Query::Structured(self.query))
    }
}

impl<'c> AwqlBuilder<'c, stage::Filtered> {
    /// Appends one or more predicates; earlier `and`s are kept.
    pub fn and(mut self, expr: impl IntoFields) -> Self {
        self.query.and.extend(expr.into_fields());
        self
    }

    pub fn during(mut self, timeframe: impl IntoFields) -> AwqlBuilder<'c, stage::Timeframed> {
        self.query.during = Some(join_fields(&timeframe.into_fields()));
        self.advance()
    }
}

impl<'c> AwqlBuilder<'c, stage::Timeframed> {
    pub fn send(self) -> Result<ReportResult> {
        self.client.execute(Query::Structured(self.query))
    }
}

/// A query given whole, as options or as a literal AWQL string.
#[derive(Debug)]
pub struct PreparedQuery<'c> {
    client: &'c mut Client,
    query: Query,
}

impl<'c> PreparedQuery<'c> {
    pub(crate) fn from_options(client: &'c mut Client, options: &QueryOptions) -> Self {
        Self {
            client,
            query: Query::Structured(AwqlQuery::from_options(options)),
        }
    }

    pub(crate) fn from_literal(client: &'c mut Client, awql: &str) -> Self {
        Self {
            client,
            query: Query::Literal(awql.to_string()),
        }
    }

    pub fn to_awql(&self) -> Result<String> {
        self.query.render()
    }

    pub fn send(self) -> Result<ReportResult> {
        self.client.execute(self.query)
    }
}
