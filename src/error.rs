use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything a report call can fail with.
///
/// None of these are retried by the client; the caller decides.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed credentials, options or configuration. Raised before any
    /// network call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The OAuth token endpoint refused to issue an access token.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The report endpoint rejected the request with a recognized error.
    #[error("{0}")]
    Request(String),

    /// The report endpoint rejected the request with an error we don't know.
    #[error("report request failed: HTTP {status}\n{body}")]
    Http { status: StatusCode, body: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The response body is not a title/header/rows/totals document.
    #[error("malformed report: {0}")]
    Parse(String),
}

pub(crate) const INVALID_FIELD_NAME: &str = "ReportDefinitionError.INVALID_FIELD_NAME_FOR_REPORT";
pub(crate) const MCC_MISMATCH: &str = "ReportDefinitionError.CUSTOMER_SERVING_TYPE_REPORT_MISMATCH";
pub(crate) const PERMISSION_DENIED: &str = "AuthorizationError.USER_PERMISSION_DENIED";
pub(crate) const OAUTH_TOKEN_INVALID: &str = "AuthenticationError.OAUTH_TOKEN_INVALID";

/// The pieces of a `<reportDownloadError>` document we care about.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ReportDownloadError {
    pub(crate) kind: Option<String>,
    pub(crate) trigger: Option<String>,
    pub(crate) field_path: Option<String>,
}

impl ReportDownloadError {
    /// Reads the first `<type>`, `<trigger>` and `<fieldPath>` texts. A
    /// malformed document yields whatever was read before the fault.
    pub(crate) fn from_body(body: &str) -> Self {
        let mut reader = Reader::from_str(body);
        reader.config_mut().trim_text(true);

        let mut out = Self::default();
        let mut current_element = String::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    current_element = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                }
                Ok(Event::Text(e)) => {
                    let slot = match current_element.as_str() {
                        "type" => &mut out.kind,
                        "trigger" => &mut out.trigger,
                        "fieldPath" => &mut out.field_path,
                        _ => continue,
                    };
                    if slot.is_none() {
                        *slot = Some(e.unescape().unwrap_or_default().to_string());
                    }
                }
                Ok(Event::End(_)) => current_element.clear(),
                Ok(Event::Eof) => break,
                Err(e) => {
                    tracing::debug!(error = %e, "unreadable reportDownloadError document");
                    break;
                }
                _ => {}
            }
        }
        out
    }
}

/// Whether a body that came back with a success status is really an error document.
pub(crate) fn is_report_download_error(body: &str) -> bool {
    let head = body.trim_start();
    head.starts_with('<') && head.contains("reportDownloadError")
}

/// Maps a failure body onto a human readable message, or `None` when the body
/// matches none of the known error types.
pub(crate) fn classify_failure(body: &str) -> Option<String> {
    if body.contains(INVALID_FIELD_NAME) {
        let detail = ReportDownloadError::from_body(body);
        return Some(match detail.trigger.filter(|t| !t.is_empty()) {
            Some(field) => format!("Error: invalid field name for report: {}", field),
            None => match detail.field_path.filter(|p| !p.is_empty()) {
                Some(path) => format!("Error: invalid field name for report ({})", path),
                None => "Error: invalid field name for report".to_string(),
            },
        });
    }

    if body.contains(MCC_MISMATCH) {
        return Some(
            "Error: Please use your Google Adwords credentials other than MCC Account."
                .to_string(),
        );
    }

    if body.contains(PERMISSION_DENIED) {
        return Some(PERMISSION_DENIED.to_string());
    }

    if body.contains(OAUTH_TOKEN_INVALID) {
        return Some("Authentication Error. OAUTH_TOKEN_INVALID".to_string());
    }

    None
}

/// Builds the error for a failed report response.
pub(crate) fn format_report_error(status: StatusCode, body: String) -> Error {
    match classify_failure(&body) {
        Some(message) => Error::Request(message),
        None => Error::Http { status, body },
    }
}
