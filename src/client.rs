use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

use crate::catalog;
use crate::config::{ConfigOverrides, load_config};
use crate::credentials::{AppCredentials, CredentialStore, Credentials, TokenState, UserCredentials};
use crate::error::{
    Error, ReportDownloadError, Result, classify_failure, format_report_error,
    is_report_download_error,
};
use crate::query::{AwqlBuilder, Fields, IntoFields, PreparedQuery, Query, QueryOptions, stage};
use crate::report::{ReportResult, parse_report};
use crate::token::{DEFAULT_TOKEN_URL, OAuthRefresher, TokenRefresher, ensure_valid_token};
use crate::transport::{HttpTransport, ReportRequest, Transport};
use crate::util::{frame_body, now_unix};

pub const DEFAULT_REPORT_URL: &str =
    "https://adwords.google.com/api/adwords/reportdownload/v201409";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Report download endpoint.
    pub url: String,
    /// OAuth2 token endpoint used for refreshes.
    pub token_url: String,
    /// Whether to verify TLS certificates.
    pub verify: bool,
    /// Applies to every request; there is no other deadline.
    pub timeout: Duration,
    /// Value of the `includeZeroImpressions` header.
    pub include_zero_impressions: bool,
    /// Show a spinner while a report downloads.
    pub progress: bool,
    pub app: Option<AppCredentials>,
    pub user: Option<UserCredentials>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REPORT_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            verify: true,
            timeout: Duration::from_secs(60),
            include_zero_impressions: true,
            progress: false,
            app: None,
            user: None,
        }
    }
}

/// A report API client. Owns its credentials and token state; give each
/// caller its own client.
pub struct Client {
    url: String,
    include_zero_impressions: bool,
    store: CredentialStore,
    refresher: Box<dyn TokenRefresher>,
    transport: Box<dyn Transport>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.url)
            .field("include_zero_impressions", &self.include_zero_impressions)
            .field("has_app_credentials", &self.store.app().is_some())
            .field("has_user_credentials", &self.store.user().is_some())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client from environment variables and/or `.adwordsrc`.
    pub fn from_env() -> Result<Self> {
        Self::from_overrides(ConfigOverrides::default())
    }

    /// Creates a client using (in order of precedence):
    /// - explicit values in `overrides`
    /// - `ADWORDS_*` environment variables
    /// - config file from `ADWORDS_RC` or `.adwordsrc`
    pub fn from_overrides(overrides: ConfigOverrides) -> Result<Self> {
        let cfg = load_config(overrides).map_err(|e| Error::Configuration(format!("{:#}", e)))?;
        Self::new(cfg)
    }

    pub fn new(cfg: ClientConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("awql-report/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("awql-report")),
        );

        let mut builder = HttpClient::builder()
            .default_headers(default_headers)
            .timeout(cfg.timeout);

        if !cfg.verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder.build()?;

        let mut client = Self {
            url: cfg.url,
            include_zero_impressions: cfg.include_zero_impressions,
            store: CredentialStore::new(),
            refresher: Box::new(OAuthRefresher::new(cfg.token_url, http.clone())),
            transport: Box::new(HttpTransport::new(http).with_progress(cfg.progress)),
        };
        if let Some(app) = cfg.app {
            client.store.set_app_credentials(app)?;
        }
        if let Some(user) = cfg.user {
            client.store.set_user_credentials(user)?;
        }
        Ok(client)
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Box::new(transport);
        self
    }

    pub fn with_refresher(mut self, refresher: impl TokenRefresher + 'static) -> Self {
        self.refresher = Box::new(refresher);
        self
    }

    pub fn set_app_credentials(&mut self, creds: AppCredentials) -> Result<()> {
        self.store.set_app_credentials(creds)
    }

    pub fn set_user_credentials(&mut self, creds: UserCredentials) -> Result<()> {
        self.store.set_user_credentials(creds)
    }

    /// Accepts either credential shape.
    pub fn use_credentials(&mut self, creds: Credentials) -> Result<()> {
        self.store.set(creds)
    }

    /// Accepts either credential shape as a JSON object; anything else is a
    /// configuration error.
    pub fn use_json(&mut self, value: &Value) -> Result<()> {
        self.store.set_json(value)
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.store
    }

    pub fn token(&self) -> &TokenState {
        self.store.token()
    }

    /// Starts a staged query: `client.awql().select(..).from(..)...send()`.
    pub fn awql(&mut self) -> AwqlBuilder<'_, stage::Init> {
        AwqlBuilder::new(self)
    }

    /// A query from options. The options are copied; the caller keeps theirs.
    pub fn awql_options(&mut self, options: &QueryOptions) -> PreparedQuery<'_> {
        PreparedQuery::from_options(self, options)
    }

    /// A literal query such as `SELECT Date, Clicks FROM ACCOUNT_PERFORMANCE_REPORT DURING LAST_7_DAYS`.
    pub fn awql_str(&mut self, awql: &str) -> PreparedQuery<'_> {
        PreparedQuery::from_literal(self, awql)
    }

    /// Runs a catalog report, selecting `fields` or the report's defaults.
    pub fn run_report(
        &mut self,
        name: &str,
        fields: Option<Fields>,
        during: impl IntoFields,
    ) -> Result<ReportResult> {
        let report = catalog::find(name)
            .ok_or_else(|| Error::Configuration(format!("unknown report: {}", name)))?;
        let fields = match fields {
            Some(fields) if !fields.0.is_empty() => fields.0,
            _ if !report.default_fields.is_empty() => report.default_fields.into_fields(),
            _ => {
                return Err(Error::Configuration(format!(
                    "{} has no default fields; pass the fields to select",
                    report.name
                )));
            }
        };

        self.awql()
            .select(fields)
            .from(report.name)
            .during(during)
            .send()
    }

    pub(crate) fn execute(&mut self, query: Query) -> Result<ReportResult> {
        let awql = query.render()?;
        tracing::debug!(awql = %awql, "serialized query");

        ensure_valid_token(&mut self.store, self.refresher.as_ref(), now_unix())?;

        let request = self.frame(&awql)?;
        tracing::info!(url = %request.url, "requesting report");
        let resp = self.transport.post(&request)?;
        tracing::debug!(status = %resp.status, bytes = resp.body.len(), "report response");

        if !resp.status.is_success() {
            let err = format_report_error(resp.status, resp.body);
            tracing::warn!(error = %err, "report request failed");
            return Err(err);
        }

        if is_report_download_error(&resp.body) {
            let kind = ReportDownloadError::from_body(&resp.body)
                .kind
                .filter(|k| !k.is_empty());
            let err = match (classify_failure(&resp.body), kind) {
                (Some(message), _) => Error::Request(message),
                (None, Some(kind)) => Error::Request(kind),
                (None, None) => Error::Http {
                    status: resp.status,
                    body: resp.body,
                },
            };
            tracing::warn!(error = %err, "report request failed");
            return Err(err);
        }

        parse_report(&resp.body, self.store.token())
    }

    fn frame(&self, awql: &str) -> Result<ReportRequest> {
        let missing = |what: &str| Error::Configuration(format!("{} credentials are not set", what));
        let app = self.store.app().ok_or_else(|| missing("app"))?;
        let user = self.store.user().ok_or_else(|| missing("user"))?;
        let access_token = self
            .store
            .token()
            .access_token
            .clone()
            .ok_or_else(|| Error::Authentication("no access token after refresh".to_string()))?;

        Ok(ReportRequest {
            url: self.url.clone(),
            access_token,
            developer_token: app.developer_token.clone(),
            client_customer_id: user.account_id.clone(),
            include_zero_impressions: self.include_zero_impressions,
            body: frame_body(awql),
        })
    }
}
