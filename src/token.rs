use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;

use crate::credentials::{AppCredentials, CredentialStore};
use crate::error::{Error, Result};
use crate::util::now_unix;

pub const DEFAULT_TOKEN_URL: &str = "https://accounts.google.com/o/oauth2/token";

/// A freshly issued access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedToken {
    pub access_token: String,
    /// Unix timestamp (seconds).
    pub expires: u64,
}

/// Exchanges a refresh token for an access token.
///
/// Failures are reported as the provider's own error text; the caller wraps
/// them in [`Error::Authentication`].
pub trait TokenRefresher {
    fn refresh(
        &self,
        app: &AppCredentials,
        refresh_token: &str,
    ) -> std::result::Result<RefreshedToken, String>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    /// Absolute expiry, as some token proxies return it.
    #[serde(default)]
    expires: Option<u64>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Refreshes against an OAuth2 token endpoint with the `refresh_token` grant.
#[derive(Debug, Clone)]
pub struct OAuthRefresher {
    token_url: String,
    http: HttpClient,
}

impl OAuthRefresher {
    pub fn new(token_url: impl Into<String>, http: HttpClient) -> Self {
        Self {
            token_url: token_url.into(),
            http,
        }
    }
}

impl TokenRefresher for OAuthRefresher {
    fn refresh(
        &self,
        app: &AppCredentials,
        refresh_token: &str,
    ) -> std::result::Result<RefreshedToken, String> {
        let resp = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", app.client_id.as_str()),
                ("client_secret", app.client_secret.as_str()),
                ("refresh_token", refresh_token),
            ])
            .send()
            .map_err(|e| format!("could not reach token endpoint: {}", e))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| format!("failed to read token response: {}", e))?;

        token_from_response(status.is_success(), &text, now_unix())
            .map_err(|e| if status.is_success() { e } else { format!("HTTP {}: {}", status, e) })
    }
}

fn token_from_response(
    success: bool,
    text: &str,
    now: u64,
) -> std::result::Result<RefreshedToken, String> {
    let parsed: TokenResponse = match serde_json::from_str(text) {
        Ok(parsed) => parsed,
        Err(_) if !success => return Err(text.to_string()),
        Err(e) => return Err(format!("failed to parse token response: {}", e)),
    };

    if let Some(error) = parsed.error {
        return Err(match parsed.error_description {
            Some(desc) if !desc.is_empty() => format!("{}: {}", error, desc),
            _ => error,
        });
    }
    if !success {
        return Err(text.to_string());
    }

    let access_token = parsed
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| "token response carried no access_token".to_string())?;
    let expires = parsed
        .expires
        .or_else(|| parsed.expires_in.map(|secs| now.saturating_add(secs)))
        .ok_or_else(|| "token response carried no expiry".to_string())?;

    Ok(RefreshedToken {
        access_token,
        expires,
    })
}

/// Makes sure `store` holds an access token that is still good at `now`,
/// refreshing at most once. Returns whether a refresh happened.
pub(crate) fn ensure_valid_token(
    store: &mut CredentialStore,
    refresher: &dyn TokenRefresher,
    now: u64,
) -> Result<bool> {
    if store.token().is_valid_at(now) {
        return Ok(false);
    }

    let app = store.app().ok_or_else(|| {
        Error::Configuration("app credentials are required before sending a query".to_string())
    })?;
    let user = store.user().ok_or_else(|| {
        Error::Configuration("user credentials are required before sending a query".to_string())
    })?;

    tracing::debug!(account_id = %user.account_id, "refreshing access token");
    match refresher.refresh(app, &user.refresh_token) {
        Ok(token) => {
            tracing::info!(expires = token.expires, "access token refreshed");
            store.store_token(token.access_token, token.expires);
            Ok(true)
        }
        Err(detail) => {
            tracing::warn!(error = %detail, "access token refresh failed");
            Err(Error::Authentication(detail))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::UserCredentials;
    use std::cell::Cell;

    struct Counting {
        calls: Cell<usize>,
        outcome: std::result::Result<RefreshedToken, String>,
    }

    impl TokenRefresher for Counting {
        fn refresh(
            &self,
            _app: &AppCredentials,
            _refresh_token: &str,
        ) -> std::result::Result<RefreshedToken, String> {
            self.calls.set(self.calls.get() + 1);
            self.outcome.clone()
        }
    }

    fn store() -> CredentialStore {
        let mut store = CredentialStore::new();
        store
            .set_app_credentials(AppCredentials {
                client_id: "id".into(),
                client_secret: "secret".into(),
                developer_token: "dev".into(),
            })
            .unwrap();
        store
            .set_user_credentials(UserCredentials::new("refresh", "123"))
            .unwrap();
        store
    }

    fn issuing(token: &str, expires: u64) -> Counting {
        Counting {
            calls: Cell::new(0),
            outcome: Ok(RefreshedToken {
                access_token: token.into(),
                expires,
            }),
        }
    }

    #[test]
    fn refreshes_when_no_token_is_held() {
        let mut store = store();
        let refresher = issuing("fresh", 2_000);

        assert!(ensure_valid_token(&mut store, &refresher, 1_000).unwrap());
        assert!(!ensure_valid_token(&mut store, &refresher, 1_500).unwrap());

        assert_eq!(refresher.calls.get(), 1);
        assert_eq!(store.token().access_token.as_deref(), Some("fresh"));
        assert_eq!(store.token().token_expires, Some(2_000));
    }

    #[test]
    fn refreshes_at_expiry() {
        let mut store = store();
        store
            .set_user_credentials(UserCredentials::new("refresh", "123").with_access_token("old", 1_000))
            .unwrap();
        let refresher = issuing("new", 5_000);

        assert!(ensure_valid_token(&mut store, &refresher, 1_000).unwrap());
        assert_eq!(refresher.calls.get(), 1);
        assert_eq!(store.token().access_token.as_deref(), Some("new"));
    }

    #[test]
    fn failure_becomes_authentication_error() {
        let mut store = store();
        let refresher = Counting {
            calls: Cell::new(0),
            outcome: Err("invalid_grant: Bad Request".into()),
        };

        match ensure_valid_token(&mut store, &refresher, 0) {
            Err(Error::Authentication(detail)) => assert_eq!(detail, "invalid_grant: Bad Request"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(store.token().access_token.is_none());
    }

    #[test]
    fn missing_app_credentials_is_a_configuration_error() {
        let mut store = CredentialStore::new();
        store
            .set_user_credentials(UserCredentials::new("refresh", "123"))
            .unwrap();
        let refresher = issuing("never", 1);

        assert!(matches!(
            ensure_valid_token(&mut store, &refresher, 0),
            Err(Error::Configuration(_))
        ));
        assert_eq!(refresher.calls.get(), 0);
    }

    #[test]
    fn parses_relative_and_absolute_expiry() {
        let rel = token_from_response(true, r#"{"access_token":"a","expires_in":3600}"#, 100).unwrap();
        assert_eq!(rel.expires, 3_700);

        let abs = token_from_response(true, r#"{"access_token":"a","expires":42}"#, 100).unwrap();
        assert_eq!(abs.expires, 42);
    }

    #[test]
    fn huge_lifetime_saturates() {
        let tok = token_from_response(
            true,
            r#"{"access_token":"a","expires_in":18446744073709551615}"#,
            1_700_000_000,
        )
        .unwrap();
        assert_eq!(tok.expires, u64::MAX);
    }

    #[test]
    fn surfaces_provider_error_payload() {
        let err = token_from_response(
            false,
            r#"{"error":"invalid_client","error_description":"The OAuth client was not found."}"#,
            0,
        )
        .unwrap_err();
        assert_eq!(err, "invalid_client: The OAuth client was not found.");

        assert_eq!(token_from_response(false, "denied", 0).unwrap_err(), "denied");
    }
}
