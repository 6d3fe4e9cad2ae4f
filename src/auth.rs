// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bearer credentials for broker calls: a service-account key file or application default
//! credentials, exchanged for OAuth access tokens.

use std::env;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::constants::CLOUD_PLATFORM_SCOPE;
use crate::error::{BrokerCliError, Result};

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
/// Tokens are refreshed this long before the expiry announced by the token endpoint
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Supplies access tokens for the `Authorization: Bearer` header
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<String>;
}

/// A fixed access token, e.g. one printed by `gcloud auth print-access-token`
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Contents of a Google credentials JSON file
#[derive(Deserialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialsFile {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl CredentialsFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BrokerCliError::Auth(format!("error reading credentials {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            BrokerCliError::Auth(format!("error parsing credentials {}: {}", path.display(), e))
        })
    }

    fn token_uri(&self) -> &str {
        match self {
            CredentialsFile::ServiceAccount(key) => &key.token_uri,
            CredentialsFile::AuthorizedUser(_) => DEFAULT_TOKEN_URI,
        }
    }
}

/// Location of application default credentials: `GOOGLE_APPLICATION_CREDENTIALS`, then the
/// file written by `gcloud auth application-default login`
pub fn default_credentials_path(
    explicit: Option<String>,
    config_home: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    config_home.map(|home| home.join("gcloud").join("application_default_credentials.json"))
}

fn config_home() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
}

#[derive(Serialize, Debug, PartialEq)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Clone, Debug)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

impl CachedToken {
    fn new(value: String, expires_in: Option<u64>, now: Instant) -> Self {
        let lifetime = Duration::from_secs(expires_in.unwrap_or(ASSERTION_LIFETIME_SECS));
        Self {
            value,
            refresh_at: now + lifetime.saturating_sub(EXPIRY_MARGIN),
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        now < self.refresh_at
    }
}

/// Exchanges a credentials file for OAuth access tokens, caching each token until shortly
/// before it expires
pub struct OAuthTokenSource {
    http: reqwest::Client,
    credentials: CredentialsFile,
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl OAuthTokenSource {
    pub fn new(http: reqwest::Client, credentials: CredentialsFile) -> Self {
        Self {
            http,
            credentials,
            scope: CLOUD_PLATFORM_SCOPE.to_string(),
            cached: Mutex::new(None),
        }
    }

    /// Token source for a service-account JSON key file
    pub fn from_file(http: reqwest::Client, path: &Path) -> Result<Self> {
        info!("Using credentials from {}", path.display());
        Ok(Self::new(http, CredentialsFile::load(path)?))
    }

    /// Token source for the ambient application default credentials
    pub fn from_default_credentials(http: reqwest::Client) -> Result<Self> {
        let path = default_credentials_path(
            env::var("GOOGLE_APPLICATION_CREDENTIALS").ok(),
            config_home(),
        )
        .ok_or_else(|| {
            BrokerCliError::Auth(
                "no credentials file given and no application default credentials found"
                    .to_string(),
            )
        })?;
        Self::from_file(http, &path)
    }

    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<CachedToken> {
        let form: Vec<(&str, String)> = match &self.credentials {
            CredentialsFile::ServiceAccount(key) => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map_err(|e| BrokerCliError::Auth(e.to_string()))?
                    .as_secs();
                vec![
                    ("grant_type", JWT_BEARER_GRANT.to_string()),
                    ("assertion", sign_assertion(key, &self.scope, now)?),
                ]
            }
            CredentialsFile::AuthorizedUser(user) => vec![
                ("grant_type", "refresh_token".to_string()),
                ("client_id", user.client_id.clone()),
                ("client_secret", user.client_secret.clone()),
                ("refresh_token", user.refresh_token.clone()),
            ],
        };

        debug!("Requesting access token from {}", self.credentials.token_uri());
        let response = self
            .http
            .post(self.credentials.token_uri())
            .form(&form)
            .send()
            .await
            .map_err(|e| BrokerCliError::Auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| BrokerCliError::Auth(format!("error reading token response: {}", e)))?;
        if !status.is_success() {
            return Err(BrokerCliError::Auth(format!(
                "token endpoint returned {}: {}",
                status,
                String::from_utf8_lossy(&body)
            )));
        }

        let token: TokenResponse = serde_json::from_slice(&body).map_err(|e| {
            BrokerCliError::Auth(format!("error decoding token response: {}", e))
        })?;
        Ok(CachedToken::new(token.access_token, token.expires_in, Instant::now()))
    }
}

#[async_trait]
impl TokenSource for OAuthTokenSource {
    async fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(token.value.clone());
        }

        let token = self.fetch().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}

fn assertion_claims<'a>(key: &'a ServiceAccountKey, scope: &'a str, now: u64) -> AssertionClaims<'a> {
    AssertionClaims {
        iss: &key.client_email,
        scope,
        aud: &key.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    }
}

fn sign_assertion(key: &ServiceAccountKey, scope: &str, now: u64) -> Result<String> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| BrokerCliError::Auth(format!("invalid service account private key: {}", e)))?;

    jsonwebtoken::encode(&header, &assertion_claims(key, scope, now), &encoding_key)
        .map_err(|e| BrokerCliError::Auth(format!("error signing token assertion: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_service_account_key() {
        let file = write_temp(
            r#"{"type":"service_account","client_email":"sa@p.iam.gserviceaccount.com","private_key":"pem","private_key_id":"kid"}"#,
        );

        match CredentialsFile::load(file.path()).unwrap() {
            CredentialsFile::ServiceAccount(key) => {
                assert_eq!(key.client_email, "sa@p.iam.gserviceaccount.com");
                assert_eq!(key.private_key_id.as_deref(), Some("kid"));
                assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
            }
            other => panic!("unexpected credentials: {:?}", other),
        }
    }

    #[test]
    fn test_load_authorized_user() {
        let file = write_temp(
            r#"{"type":"authorized_user","client_id":"id","client_secret":"secret","refresh_token":"refresh"}"#,
        );

        let creds = CredentialsFile::load(file.path()).unwrap();
        assert!(matches!(creds, CredentialsFile::AuthorizedUser(ref u) if u.refresh_token == "refresh"));
        assert_eq!(creds.token_uri(), DEFAULT_TOKEN_URI);
    }

    #[test]
    fn test_load_rejects_unknown_type() {
        let file = write_temp(r#"{"type":"external_account"}"#);
        assert!(matches!(
            CredentialsFile::load(file.path()),
            Err(BrokerCliError::Auth(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = CredentialsFile::load(Path::new("/nonexistent/creds.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/creds.json"));
    }

    #[test]
    fn test_default_credentials_path_prefers_explicit() {
        let path = default_credentials_path(
            Some("/keys/sa.json".to_string()),
            Some(PathBuf::from("/home/u/.config")),
        );
        assert_eq!(path, Some(PathBuf::from("/keys/sa.json")));
    }

    #[test]
    fn test_default_credentials_path_falls_back_to_gcloud() {
        let path = default_credentials_path(Some(String::new()), Some(PathBuf::from("/home/u/.config")));
        assert_eq!(
            path,
            Some(PathBuf::from(
                "/home/u/.config/gcloud/application_default_credentials.json"
            ))
        );
        assert_eq!(default_credentials_path(None, None), None);
    }

    #[test]
    fn test_assertion_claims() {
        let key = ServiceAccountKey {
            client_email: "sa@p.iam.gserviceaccount.com".to_string(),
            private_key: String::new(),
            private_key_id: None,
            token_uri: DEFAULT_TOKEN_URI.to_string(),
        };

        let claims = assertion_claims(&key, CLOUD_PLATFORM_SCOPE, 1_000);

        assert_eq!(
            claims,
            AssertionClaims {
                iss: "sa@p.iam.gserviceaccount.com",
                scope: CLOUD_PLATFORM_SCOPE,
                aud: DEFAULT_TOKEN_URI,
                iat: 1_000,
                exp: 4_600,
            }
        );
    }

    #[test]
    fn test_sign_assertion_rejects_bad_key() {
        let key = ServiceAccountKey {
            client_email: "sa@p.iam.gserviceaccount.com".to_string(),
            private_key: "not a pem".to_string(),
            private_key_id: None,
            token_uri: DEFAULT_TOKEN_URI.to_string(),
        };

        assert!(matches!(
            sign_assertion(&key, CLOUD_PLATFORM_SCOPE, 0),
            Err(BrokerCliError::Auth(_))
        ));
    }

    #[test]
    fn test_cached_token_refreshes_before_expiry() {
        let now = Instant::now();
        let token = CachedToken::new("t".to_string(), Some(3600), now);

        assert!(token.is_fresh(now + Duration::from_secs(3000)));
        assert!(!token.is_fresh(now + Duration::from_secs(3541)));
    }

    #[tokio::test]
    async fn test_static_token() {
        let tokens = StaticToken("abc".to_string());
        assert_eq!(tokens.token().await.unwrap(), "abc");
    }
}
