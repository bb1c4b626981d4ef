use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Application identity registered with the API console.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppCredentials {
    #[serde(alias = "clientId", alias = "clientID")]
    pub client_id: String,
    #[serde(alias = "clientSecret")]
    pub client_secret: String,
    #[serde(alias = "developerToken")]
    pub developer_token: String,
}

/// The account being reported on, and the tokens that act for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserCredentials {
    #[serde(alias = "refreshToken")]
    pub refresh_token: String,
    #[serde(
        alias = "accountId",
        alias = "clientCustomerId",
        alias = "clientCustomerID"
    )]
    pub account_id: String,
    /// A previously issued access token, to skip the first refresh.
    #[serde(default, alias = "accessToken")]
    pub access_token: Option<String>,
    /// Unix timestamp (seconds) after which `access_token` is stale.
    #[serde(default, alias = "tokenExpires")]
    pub token_expires: Option<u64>,
}

/// One of the two accepted credential shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    App(AppCredentials),
    User(UserCredentials),
}

impl Credentials {
    /// Recognizes a JSON object as user credentials (`refreshToken` +
    /// `accountId`) or app credentials (`clientId` + `clientSecret` +
    /// `developerToken`). Anything else is a configuration error.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Some(map) = value.as_object() else {
            return Err(Error::Configuration(
                "credentials must be an object".to_string(),
            ));
        };

        // IDs sometimes arrive as bare numbers; read them as their decimal text.
        let map: Map<String, Value> = map
            .iter()
            .map(|(k, v)| match v {
                Value::Number(n) if !matches!(k.as_str(), "tokenExpires" | "token_expires") => {
                    (k.clone(), Value::String(n.to_string()))
                }
                _ => (k.clone(), v.clone()),
            })
            .collect();

        let present = |keys: &[&str]| {
            keys.iter().any(|k| {
                map.get(*k)
                    .and_then(Value::as_str)
                    .is_some_and(|s| !s.trim().is_empty())
            })
        };

        let user = present(&["refreshToken", "refresh_token"])
            && present(&[
                "accountId",
                "account_id",
                "clientCustomerId",
                "clientCustomerID",
            ]);
        let app = present(&["clientId", "clientID", "client_id"])
            && present(&["clientSecret", "client_secret"])
            && present(&["developerToken", "developer_token"]);

        if user {
            let creds = UserCredentials::deserialize(&Value::Object(map))
                .map_err(|e| Error::Configuration(format!("invalid user credentials: {}", e)))?;
            return Ok(Credentials::User(creds));
        }
        if app {
            let creds = AppCredentials::deserialize(&Value::Object(map))
                .map_err(|e| Error::Configuration(format!("invalid app credentials: {}", e)))?;
            return Ok(Credentials::App(creds));
        }

        Err(Error::Configuration(
            "expected {clientId, clientSecret, developerToken} or {refreshToken, accountId}"
                .to_string(),
        ))
    }
}

impl AppCredentials {
    pub(crate) fn validate(&self) -> Result<()> {
        require("clientId", &self.client_id)?;
        require("clientSecret", &self.client_secret)?;
        require("developerToken", &self.developer_token)
    }
}

impl UserCredentials {
    pub fn new(refresh_token: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
            account_id: account_id.into(),
            access_token: None,
            token_expires: None,
        }
    }

    /// Seeds a cached access token so the first request can skip the refresh.
    pub fn with_access_token(mut self, access_token: impl Into<String>, expires: u64) -> Self {
        self.access_token = Some(access_token.into());
        self.token_expires = Some(expires);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require("refreshToken", &self.refresh_token)?;
        require("accountId", &self.account_id)
    }
}

fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Configuration(format!("missing {}", name)));
    }
    Ok(())
}

/// The current access token and when it stops working.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenState {
    pub access_token: Option<String>,
    pub token_expires: Option<u64>,
}

impl TokenState {
    /// True when there is a token and its expiry lies strictly after `now`.
    pub fn is_valid_at(&self, now: u64) -> bool {
        match (&self.access_token, self.token_expires) {
            (Some(token), Some(expires)) => !token.is_empty() && expires > now,
            _ => false,
        }
    }
}

/// Credential state owned by one client.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    app: Option<AppCredentials>,
    user: Option<UserCredentials>,
    token: TokenState,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the app identity. Any cached access token belonged to the old
    /// identity and is dropped.
    pub fn set_app_credentials(&mut self, creds: AppCredentials) -> Result<()> {
        creds.validate()?;
        tracing::debug!(client_id = %creds.client_id, "app credentials configured");
        self.app = Some(creds);
        self.token = TokenState::default();
        Ok(())
    }

    pub fn set_user_credentials(&mut self, creds: UserCredentials) -> Result<()> {
        creds.validate()?;
        tracing::debug!(
            account_id = %creds.account_id,
            seeded_token = creds.access_token.is_some(),
            "user credentials configured"
        );
        self.token = TokenState {
            access_token: creds.access_token.clone(),
            token_expires: creds.token_expires,
        };
        self.user = Some(creds);
        Ok(())
    }

    pub fn set(&mut self, creds: Credentials) -> Result<()> {
        match creds {
            Credentials::App(app) => self.set_app_credentials(app),
            Credentials::User(user) => self.set_user_credentials(user),
        }
    }

    pub fn set_json(&mut self, value: &Value) -> Result<()> {
        self.set(Credentials::from_json(value)?)
    }

    pub fn app(&self) -> Option<&AppCredentials> {
        self.app.as_ref()
    }

    pub fn user(&self) -> Option<&UserCredentials> {
        self.user.as_ref()
    }

    pub fn token(&self) -> &TokenState {
        &self.token
    }

    pub(crate) fn store_token(&mut self, access_token: String, expires: u64) {
        self.token = TokenState {
            access_token: Some(access_token),
            token_expires: Some(expires),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn app() -> AppCredentials {
        AppCredentials {
            client_id: "id".into(),
            client_secret: "secret".into(),
            developer_token: "dev".into(),
        }
    }

    #[test]
    fn recognizes_app_shape() {
        let creds = Credentials::from_json(&json!({
            "clientId": "id",
            "clientSecret": "secret",
            "developerToken": "dev"
        }))
        .unwrap();
        assert_eq!(creds, Credentials::App(app()));
    }

    #[test]
    fn numeric_account_id_is_read_as_text() {
        let creds = Credentials::from_json(&json!({
            "refreshToken": "r",
            "accountId": 1234567890u64,
            "tokenExpires": 1_900_000_000u64
        }))
        .unwrap();
        let Credentials::User(user) = creds else {
            panic!("expected user credentials");
        };
        assert_eq!(user.account_id, "1234567890");
        assert_eq!(user.token_expires, Some(1_900_000_000));
    }

    #[test]
    fn recognizes_user_shape_with_legacy_keys() {
        let creds = Credentials::from_json(&json!({
            "refreshToken": "refresh",
            "clientCustomerID": "123-456-7890",
            "accessToken": "cached",
            "tokenExpires": 1_900_000_000u64
        }))
        .unwrap();
        let Credentials::User(user) = creds else {
            panic!("expected user credentials");
        };
        assert_eq!(user.account_id, "123-456-7890");
        assert_eq!(user.access_token.as_deref(), Some("cached"));
        assert_eq!(user.token_expires, Some(1_900_000_000));
    }

    #[test]
    fn rejects_other_shapes() {
        let bad = [
            json!("clientId"),
            json!(42),
            json!(null),
            json!(["refreshToken", "accountId"]),
            json!({}),
            json!({ "clientId": "id", "clientSecret": "secret" }),
            json!({ "refreshToken": "refresh" }),
            json!({ "accountId": "1" , "developerToken": "dev" }),
            json!({ "clientId": "", "clientSecret": "secret", "developerToken": "dev" }),
        ];
        for value in bad {
            assert!(
                matches!(Credentials::from_json(&value), Err(Error::Configuration(_))),
                "accepted {value}"
            );
        }
    }

    #[test]
    fn typed_setters_validate() {
        let mut store = CredentialStore::new();
        let mut partial = app();
        partial.developer_token.clear();
        assert!(matches!(
            store.set_app_credentials(partial),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            store.set_user_credentials(UserCredentials::new("", "1")),
            Err(Error::Configuration(_))
        ));
        assert!(store.app().is_none());
        assert!(store.user().is_none());
    }

    #[test]
    fn app_change_drops_cached_token() {
        let mut store = CredentialStore::new();
        store
            .set_user_credentials(UserCredentials::new("refresh", "1").with_access_token("tok", 100))
            .unwrap();
        assert_eq!(store.token().access_token.as_deref(), Some("tok"));

        store.set_app_credentials(app()).unwrap();
        assert_eq!(store.token(), &TokenState::default());
        assert!(store.user().is_some());
    }

    #[test]
    fn token_validity_is_strict() {
        let token = TokenState {
            access_token: Some("tok".into()),
            token_expires: Some(100),
        };
        assert!(token.is_valid_at(99));
        assert!(!token.is_valid_at(100));
        assert!(!TokenState::default().is_valid_at(0));
    }
}
