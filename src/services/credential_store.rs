use anyhow::Context;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;

pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Access tokens this close to their expiry are treated as already expired,
/// so a token cannot lapse between the check and the remote call.
const EXPIRY_SKEW_SECONDS: i64 = 60;

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// Persisted OAuth2 bundle for read-only YouTube Data API access. Minted by
/// an external authorization flow; this service only loads and refreshes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl Credentials {
    pub fn is_expired(&self) -> bool {
        match self.expiry {
            Some(expiry) => expiry < Utc::now() + Duration::seconds(EXPIRY_SKEW_SECONDS),
            None => false,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired()
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no stored credentials at {0}; run the authorization flow first")]
    NotFound(String),
    #[error("stored credentials are invalid: {0}")]
    InvalidToken(String),
    #[error("stored credentials are expired and carry no refresh token")]
    Expired,
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),
}

#[derive(Debug, Deserialize)]
struct TokenRefreshResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Owns the token file plus an in-process cache of the loaded bundle. The
/// cache Mutex is held across the load-check-refresh sequence, so concurrent
/// requests that hit an expired token serialize on a single refresh.
pub struct CredentialStore {
    path: PathBuf,
    http: reqwest::Client,
    cached: Mutex<Option<Credentials>>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CredentialStore {
            path: path.into(),
            http: reqwest::Client::new(),
            cached: Mutex::new(None),
        }
    }

    /// Return the cached bundle while it stays valid; otherwise load it from
    /// disk, refreshing and re-persisting on the way if it has expired.
    pub async fn ensure_loaded(&self) -> Result<Credentials, CredentialError> {
        let mut cached = self.cached.lock().await;
        if let Some(credentials) = cached.as_ref() {
            if credentials.is_valid() {
                return Ok(credentials.clone());
            }
        }

        let credentials = self.load().await?;
        *cached = Some(credentials.clone());
        Ok(credentials)
    }

    async fn load(&self) -> Result<Credentials, CredentialError> {
        if !self.path.exists() {
            return Err(CredentialError::NotFound(self.path.display().to_string()));
        }

        let data = fs::read_to_string(&self.path)
            .map_err(|e| CredentialError::InvalidToken(e.to_string()))?;
        let mut credentials: Credentials =
            serde_json::from_str(&data).map_err(|e| CredentialError::InvalidToken(e.to_string()))?;

        if credentials.access_token.is_empty() {
            return Err(CredentialError::InvalidToken(
                "access token field is empty".to_string(),
            ));
        }

        if !credentials.is_expired() {
            return Ok(credentials);
        }

        let Some(refresh_token) = credentials.refresh_token.clone() else {
            return Err(CredentialError::Expired);
        };

        self.refresh(&mut credentials, &refresh_token).await?;
        self.persist(&credentials).map_err(|e| {
            CredentialError::RefreshFailed(format!("could not persist refreshed token: {e}"))
        })?;
        Ok(credentials)
    }

    /// Exchange the refresh token for a new access token. Single attempt;
    /// transient network failures surface as `RefreshFailed`.
    async fn refresh(
        &self,
        credentials: &mut Credentials,
        refresh_token: &str,
    ) -> Result<(), CredentialError> {
        info!("Access token expired, refreshing...");

        let response = self
            .http
            .post(&credentials.token_uri)
            .form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| CredentialError::RefreshFailed(e.to_string()))?;

        let body: TokenRefreshResponse = response
            .json()
            .await
            .map_err(|e| CredentialError::RefreshFailed(e.to_string()))?;

        if let Some(error) = body.error {
            let description = body.error_description.unwrap_or_default();
            return Err(CredentialError::RefreshFailed(format!(
                "{error} {description}"
            )));
        }

        let Some(access_token) = body.access_token else {
            return Err(CredentialError::RefreshFailed(
                "refresh response missing access_token".to_string(),
            ));
        };

        credentials.access_token = access_token;
        credentials.expiry =
            Some(Utc::now() + Duration::seconds(body.expires_in.unwrap_or(3600) as i64));
        info!("Token refreshed, expires at {:?}", credentials.expiry);
        Ok(())
    }

    fn persist(&self, credentials: &Credentials) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(credentials)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        info!("Saved refreshed credentials to {}", self.path.display());
        Ok(())
    }
}

/// Write a bootstrap token file when none exists yet, from a raw JSON blob
/// or a base64-encoded one. Lets deployments provision credentials through
/// the environment instead of a shell.
pub fn seed_token_file(
    path: &Path,
    raw: Option<String>,
    b64: Option<String>,
) -> anyhow::Result<()> {
    if path.exists() {
        return Ok(());
    }

    let blob = if let Some(raw) = raw {
        raw
    } else if let Some(b64) = b64 {
        let bytes = BASE64
            .decode(b64.trim())
            .context("token seed is not valid base64")?;
        String::from_utf8(bytes).context("token seed is not valid UTF-8")?
    } else {
        return Ok(());
    };

    serde_json::from_str::<Credentials>(&blob)
        .context("token seed does not parse as a credential bundle")?;
    fs::write(path, blob)?;
    info!("Seeded token file at {}", path.display());
    Ok(())
}

/// Bootstrap wrapper used at startup; a bad seed is logged and skipped so
/// the service still comes up and reports `NotFound` per request.
pub fn bootstrap_token_file(path: &Path, raw: Option<String>, b64: Option<String>) {
    if let Err(e) = seed_token_file(path, raw, b64) {
        warn!("Token bootstrap failed: {e:?}");
    }
}
