//! A small Rust client for the AdWords report download API.
//!
//! The flow is: configure credentials, build an AWQL query, send it. On send
//! the client refreshes the OAuth2 access token if it has none or it has
//! expired, posts the query, and parses the TSV body into a [`ReportResult`].
//!
//! ## Quick start
//! - Configure credentials via `ADWORDS_*` environment variables or an
//!   `.adwordsrc` file (current directory or home directory), or set them on
//!   the client directly.
//! - Build a query with [`Client::awql`], [`Client::awql_options`] or
//!   [`Client::awql_str`] and call `send()`.
//!
//! ```no_run
//! use awql_report::{Client, DateRange};
//!
//! fn main() -> awql_report::Result<()> {
//!     let mut client = Client::from_env()?;
//!     let report = client
//!         .awql()
//!         .select(["Date", "Clicks"])
//!         .from("ACCOUNT_PERFORMANCE_REPORT")
//!         .where_("Clicks>100")
//!         .and("Clicks<150")
//!         .during(DateRange::Last30Days)
//!         .send()?;
//!     for row in &report.records {
//!         println!("{} {}", row["date"], row["clicks"]);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The builder stages only expose the calls that may follow them, so
//! `client.awql().from(..)` or `.where_(..)` before `.from(..)` does not
//! compile.

#![forbid(unsafe_code)]

pub mod catalog;
mod client;
mod config;
mod credentials;
mod error;
pub mod query;
mod report;
mod token;
mod transport;
mod util;

pub use catalog::ReportDefinition;
pub use client::{Client, ClientConfig, DEFAULT_REPORT_URL};
pub use config::ConfigOverrides;
pub use credentials::{AppCredentials, CredentialStore, Credentials, TokenState, UserCredentials};
pub use error::{Error, Result};
pub use query::{AwqlBuilder, DateRange, Fields, IntoFields, PreparedQuery, QueryOptions};
pub use report::{AuthSnapshot, Record, ReportResult, parse_report};
pub use token::{DEFAULT_TOKEN_URL, OAuthRefresher, RefreshedToken, TokenRefresher};
pub use transport::{HttpTransport, RawResponse, ReportRequest, Transport};
