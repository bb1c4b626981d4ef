use anyhow::{Context, Result, bail};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::client::{ClientConfig, DEFAULT_REPORT_URL};
use crate::credentials::{AppCredentials, UserCredentials};
use crate::token::DEFAULT_TOKEN_URL;

const KEYS: &[(&str, &str)] = &[
    ("url", "ADWORDS_URL"),
    ("token_url", "ADWORDS_TOKEN_URL"),
    ("client_id", "ADWORDS_CLIENT_ID"),
    ("client_secret", "ADWORDS_CLIENT_SECRET"),
    ("developer_token", "ADWORDS_DEVELOPER_TOKEN"),
    ("refresh_token", "ADWORDS_REFRESH_TOKEN"),
    ("client_customer_id", "ADWORDS_CLIENT_CUSTOMER_ID"),
];

/// Values given explicitly by the caller; they win over the environment and
/// the rc file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub url: Option<String>,
    pub token_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub developer_token: Option<String>,
    pub refresh_token: Option<String>,
    pub client_customer_id: Option<String>,
    pub verify: Option<bool>,
}

impl ConfigOverrides {
    fn get(&self, key: &str) -> Option<String> {
        match key {
            "url" => self.url.clone(),
            "token_url" => self.token_url.clone(),
            "client_id" => self.client_id.clone(),
            "client_secret" => self.client_secret.clone(),
            "developer_token" => self.developer_token.clone(),
            "refresh_token" => self.refresh_token.clone(),
            "client_customer_id" => self.client_customer_id.clone(),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct RcConfig {
    values: HashMap<String, String>,
    verify: Option<bool>,
}

pub(crate) fn load_config(overrides: ConfigOverrides) -> Result<ClientConfig> {
    load_config_from(overrides, |name| std::env::var(name).ok(), &rc_candidates())
}

pub(crate) fn load_config_from<E>(
    overrides: ConfigOverrides,
    env: E,
    rc_candidates: &[PathBuf],
) -> Result<ClientConfig>
where
    E: Fn(&str) -> Option<String>,
{
    let mut values: HashMap<&str, String> = HashMap::new();
    for &(key, var) in KEYS {
        if let Some(v) = overrides.get(key).or_else(|| env(var)) {
            values.insert(key, v);
        }
    }

    let mut file_verify: Option<bool> = None;
    if values.len() < KEYS.len() || overrides.verify.is_none() {
        for rc_path in rc_candidates {
            if rc_path.exists() {
                let cfg = read_rc(rc_path).with_context(|| {
                    format!("failed to read configuration file {}", rc_path.display())
                })?;
                for &(key, _) in KEYS {
                    if !values.contains_key(key) {
                        if let Some(v) = cfg.values.get(key) {
                            values.insert(key, v.clone());
                        }
                    }
                }
                file_verify = cfg.verify;
                tracing::debug!(path = %rc_path.display(), "loaded rc file");
                break;
            }
        }
    }

    let mut take = |key: &str| -> Result<String> {
        match values.remove(key).filter(|v| !v.trim().is_empty()) {
            Some(v) => Ok(v),
            None => {
                let var = KEYS
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, var)| *var)
                    .unwrap_or_default();
                if !rc_candidates.is_empty() {
                    bail!(
                        "Missing configuration: {} (set {} or put `{}:` in one of: {})",
                        key,
                        var,
                        key,
                        rc_candidates
                            .iter()
                            .map(|p| p.display().to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                }
                bail!("Missing configuration: {} (set {} or create .adwordsrc)", key, var);
            }
        }
    };

    let app = AppCredentials {
        client_id: take("client_id")?,
        client_secret: take("client_secret")?,
        developer_token: take("developer_token")?,
    };
    let user = UserCredentials::new(take("refresh_token")?, take("client_customer_id")?);

    let url = values
        .remove("url")
        .unwrap_or_else(|| DEFAULT_REPORT_URL.to_string());
    let token_url = values
        .remove("token_url")
        .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string());
    let verify = overrides.verify.or(file_verify).unwrap_or(true);

    Ok(ClientConfig {
        url,
        token_url,
        verify,
        app: Some(app),
        user: Some(user),
        ..ClientConfig::default()
    })
}

fn read_rc(path: &Path) -> Result<RcConfig> {
    let text = std::fs::read_to_string(path)?;
    let mut cfg = RcConfig::default();

    // A key may have its value on the following line.
    let mut pending_key: Option<&str> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(pk) = pending_key.take() {
            if !line.contains(':') || line.starts_with("http") {
                cfg.values.insert(pk.to_string(), strip_quotes(line).to_string());
                continue;
            }
        }

        if let Some((k, v)) = line.split_once(':') {
            let k = k.trim();
            let v = strip_quotes(v.trim());
            if k == "verify" {
                if !v.is_empty() {
                    cfg.verify = Some(v != "0" && !v.eq_ignore_ascii_case("false"));
                }
                continue;
            }
            if let Some(&(key, _)) = KEYS.iter().find(|(key, _)| *key == k) {
                if v.is_empty() {
                    pending_key = Some(key);
                } else {
                    cfg.values.insert(k.to_string(), v.to_string());
                }
            }
        }
    }

    Ok(cfg)
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    ['"', '\'']
        .iter()
        .find_map(|q| s.strip_prefix(*q)?.strip_suffix(*q))
        .unwrap_or(s)
}

/// Where to look for an rc file. `ADWORDS_RC` pins a single path; without it
/// the working directory is tried before the home directory.
fn rc_candidates() -> Vec<PathBuf> {
    match std::env::var_os("ADWORDS_RC") {
        Some(pinned) => vec![PathBuf::from(pinned)],
        None => [std::env::current_dir().ok(), dirs::home_dir()]
            .into_iter()
            .flatten()
            .map(|dir| dir.join(".adwordsrc"))
            .collect(),
    }
}
