//! Service account authentication (OAuth2 JWT bearer grant)

use super::{SheetsError, api_error_message};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens this close to expiry are refreshed before use
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// The JSON key file downloaded for a service account
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, SheetsError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SheetsError::CredentialsNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(SheetsError::Io(e)),
        };
        Self::from_json(&content)
            .map_err(|e| SheetsError::InvalidCredentials(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(content: &str) -> Result<Self, String> {
        let key: ServiceAccountKey = serde_json::from_str(content).map_err(|e| e.to_string())?;
        match key.key_type.as_deref() {
            None | Some("service_account") => Ok(key),
            Some(other) => Err(format!("expected a service_account key, got '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Issues access tokens for one service account, caching until near expiry
#[derive(Debug)]
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    http: reqwest::Client,
    scopes: Vec<String>,
    cache: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey, http: reqwest::Client, scopes: &[&str]) -> Self {
        Self {
            key,
            http,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            cache: Mutex::new(None),
        }
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// RS256-signed assertion for the token endpoint
    pub(crate) fn assertion(&self, now: DateTime<Utc>) -> Result<String, SheetsError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let claims = Claims {
            iss: self.key.client_email.clone(),
            scope: self.scopes.join(" "),
            aud: self.key.token_uri.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        Ok(jsonwebtoken::encode(&header, &claims, &signing_key)?)
    }

    /// Current access token, exchanging a fresh assertion when needed
    pub async fn access_token(&self) -> Result<String, SheetsError> {
        let mut cache = self.cache.lock().await;
        let now = Utc::now();

        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > now + Duration::seconds(EXPIRY_MARGIN_SECS) {
                return Ok(cached.token.clone());
            }
        }

        debug!("Requesting access token for {}", self.key.client_email);
        let assertion = self.assertion(now)?;
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SheetsError::TokenExchange(format!(
                "HTTP {}: {}",
                status.as_u16(),
                api_error_message(&body)
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        info!(
            "Authorized service account {} (token valid {}s)",
            self.key.client_email, token.expires_in
        );

        *cache = Some(CachedToken {
            token: token.access_token.clone(),
            expires_at: now + Duration::seconds(token.expires_in),
        });
        Ok(token.access_token)
    }
}
