// =============================================================================
// GOOGLE OAUTH2 ACCESS TOKENS
// =============================================================================
//
// Every Google API client in this crate asks `GoogleAuth` for a bearer token.
// Two credential types are supported:
//
// 1. **Authorized user:** client id, client secret and a refresh token, as
//    produced by an installed-app OAuth flow. The refresh token is exchanged
//    for a short-lived access token.
//
// 2. **Service account:** a JSON key file. A signed JWT (RS256) is exchanged
//    for an access token. The spreadsheet must be shared with the service
//    account email, and the account must have access to the Ads manager.
//
// Tokens are cached and refreshed one minute before they expire.

use crate::core::config::CredentialSource;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::sync::RwLock;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

pub const SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/adwords",
    "https://www.googleapis.com/auth/drive.readonly",
    "https://www.googleapis.com/auth/pubsub",
];

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to read credentials: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid service account key: {0}")]
    Credentials(#[from] serde_json::Error),

    #[error("Failed to sign JWT: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Token exchange failed ({status}): {body}")]
    TokenExchange { status: u16, body: String },

    #[error("System clock is before the Unix epoch")]
    Clock,
}

/// Fields we need from a service account JSON key.
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
enum TokenSource {
    AuthorizedUser {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
    ServiceAccount(ServiceAccountKey),
}

struct CachedToken {
    token: String,
    expires_at: SystemTime,
}

impl CachedToken {
    fn is_fresh(&self, now: SystemTime) -> bool {
        self.expires_at > now + REFRESH_MARGIN
    }
}

/// Hands out OAuth2 access tokens for the configured credentials.
pub struct GoogleAuth {
    source: TokenSource,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl GoogleAuth {
    pub async fn from_source(source: &CredentialSource) -> Result<Self, AuthError> {
        let source = match source {
            CredentialSource::AuthorizedUser {
                client_id,
                client_secret,
                refresh_token,
            } => TokenSource::AuthorizedUser {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                refresh_token: refresh_token.clone(),
            },
            CredentialSource::ServiceAccountKeyFile(path) => {
                let content = tokio::fs::read_to_string(path).await?;
                TokenSource::ServiceAccount(serde_json::from_str(&content)?)
            }
            CredentialSource::ServiceAccountJson(json) => {
                TokenSource::ServiceAccount(serde_json::from_str(json)?)
            }
        };
        Ok(Self {
            source,
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Returns a valid access token, refreshing it when close to expiry.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.is_fresh(SystemTime::now()) {
                    return Ok(token.token.clone());
                }
            }
        }

        let response = self.fetch_new_token().await?;
        let mut cached = self.cached_token.write().await;
        *cached = Some(CachedToken {
            token: response.access_token.clone(),
            expires_at: SystemTime::now() + Duration::from_secs(response.expires_in),
        });
        tracing::debug!(expires_in = response.expires_in, "Fetched new Google access token");
        Ok(response.access_token)
    }

    async fn fetch_new_token(&self) -> Result<TokenResponse, AuthError> {
        let request = match &self.source {
            TokenSource::AuthorizedUser {
                client_id,
                client_secret,
                refresh_token,
            } => self.client.post(DEFAULT_TOKEN_URI).form(&[
                ("grant_type", "refresh_token"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
            ]),
            TokenSource::ServiceAccount(key) => {
                let jwt = signed_assertion(key, SystemTime::now())?;
                self.client.post(&key.token_uri).form(&[
                    ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                    ("assertion", jwt.as_str()),
                ])
            }
        };

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            return Err(AuthError::TokenExchange { status, body });
        }
        Ok(response.json().await?)
    }
}

fn jwt_claims(key: &ServiceAccountKey, now: SystemTime) -> Result<JwtClaims, AuthError> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| AuthError::Clock)?
        .as_secs();
    Ok(JwtClaims {
        iss: key.client_email.clone(),
        scope: SCOPES.join(" "),
        aud: key.token_uri.clone(),
        iat,
        exp: iat + 3600,
    })
}

fn signed_assertion(key: &ServiceAccountKey, now: SystemTime) -> Result<String, AuthError> {
    let claims = jwt_claims(key, now)?;
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ServiceAccountKey {
        serde_json::from_str(
            r#"{"client_email": "sync@project.iam.gserviceaccount.com", "private_key": "pem"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_service_account_key_defaults_token_uri() {
        assert_eq!(key().token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn test_jwt_claims_cover_all_scopes() {
        let now = UNIX_EPOCH + Duration::from_secs(1_000);
        let claims = jwt_claims(&key(), now).unwrap();

        assert_eq!(claims.iss, "sync@project.iam.gserviceaccount.com");
        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.exp, 4_600);
        assert_eq!(claims.scope.split(' ').count(), SCOPES.len());
    }

    #[test]
    fn test_cached_token_refreshes_inside_margin() {
        let now = SystemTime::now();
        let fresh = CachedToken {
            token: "a".to_string(),
            expires_at: now + Duration::from_secs(300),
        };
        let stale = CachedToken {
            token: "b".to_string(),
            expires_at: now + Duration::from_secs(30),
        };
        assert!(fresh.is_fresh(now));
        assert!(!stale.is_fresh(now));
    }

    #[tokio::test]
    async fn test_invalid_service_account_json() {
        let source = CredentialSource::ServiceAccountJson("{}".to_string());
        assert!(matches!(
            GoogleAuth::from_source(&source).await,
            Err(AuthError::Credentials(_))
        ));
    }
}
