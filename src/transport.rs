use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{Error, Result};

/// A fully framed report download request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub url: String,
    pub access_token: String,
    pub developer_token: String,
    pub client_customer_id: String,
    pub include_zero_impressions: bool,
    /// `__rdquery=<awql>&__fmt=TSV`
    pub body: String,
}

impl ReportRequest {
    /// Header set sent with the request, in wire order.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Authorization", format!("Bearer {}", self.access_token)),
            ("Content-Type", "application/x-www-form-urlencoded".to_string()),
            ("developerToken", self.developer_token.clone()),
            ("clientCustomerId", self.client_customer_id.clone()),
            ("includeZeroImpressions", self.include_zero_impressions.to_string()),
            ("Content-Length", self.body.len().to_string()),
        ]
    }
}

/// What came back, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Performs one POST. No retries; an `Err` is a transport failure, any HTTP
/// status is an `Ok`.
pub trait Transport {
    fn post(&self, request: &ReportRequest) -> Result<RawResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
    progress: bool,
}

impl HttpTransport {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            progress: false,
        }
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }
}

impl Transport for HttpTransport {
    fn post(&self, request: &ReportRequest) -> Result<RawResponse> {
        let mut headers = HeaderMap::new();
        for (name, value) in request.headers() {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                Error::Configuration(format!("invalid header name {}: {}", name, e))
            })?;
            let value = HeaderValue::from_str(&value).map_err(|e| {
                Error::Configuration(format!("invalid value for header {}: {}", name, e))
            })?;
            headers.insert(name, value);
        }

        let spinner = if self.progress {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg} {elapsed}") {
                pb.set_style(style);
            }
            pb.set_message("downloading report");
            pb.enable_steady_tick(Duration::from_millis(120));
            Some(pb)
        } else {
            None
        };

        let result = self
            .http
            .post(&request.url)
            .headers(headers)
            .body(request.body.clone())
            .send()
            .and_then(|resp| {
                let status = resp.status();
                resp.text().map(|body| RawResponse { status, body })
            });

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        Ok(result?)
    }
}
