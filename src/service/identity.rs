//! Identity Provider Integration
//!
//! Verifies bearer tokens issued by the external identity provider and pushes
//! display-name changes back to it.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::IdentityConfig;
use crate::utils::error::AppError;

/// Authorization scheme expected in the `Authorization` header
pub const BEARER_PREFIX: &str = "Bearer ";

/// Failures raised while talking to the identity provider
#[derive(Error, Debug)]
pub enum IdentityError {
    /// No usable bearer credential was presented
    #[error("Missing or malformed Authorization header")]
    Missing,

    /// A credential was presented but failed verification
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// The display-name sync call failed
    #[error("Identity provider sync failed: {0}")]
    Sync(String),

    /// The provider could not be set up from configuration
    #[error("Identity provider configuration error: {0}")]
    Configuration(String),
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Missing => {
                AppError::Authentication("Missing or malformed Authorization header".to_string())
            }
            IdentityError::Invalid(_) => AppError::Forbidden("Invalid or expired token".to_string()),
            IdentityError::Sync(msg) => AppError::Internal(msg),
            IdentityError::Configuration(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type for identity provider operations
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Extracts the token from a raw `Authorization` header value
pub fn bearer_token(header: Option<&str>) -> IdentityResult<&str> {
    let token = header
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .ok_or(IdentityError::Missing)?;

    if token.is_empty() {
        return Err(IdentityError::Missing);
    }

    Ok(token)
}

/// Seam between the service and the external identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies a bearer token and returns the subject id it was issued for
    fn verify(&self, token: &str) -> IdentityResult<String>;

    /// Pushes a new display name for the subject to the provider
    async fn update_display_name(&self, subject: &str, name: &str) -> IdentityResult<()>;
}

/// Claims read from provider-issued ID tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject - stable user id at the provider
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: Option<i64>,

    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DisplayNameUpdate<'a> {
    uid: &'a str,
    display_name: &'a str,
}

/// JWT-based identity provider
///
/// Tokens are checked for signature, expiry, and (when configured) issuer and
/// audience. Display-name updates are POSTed to `profile_sync_url` when set.
#[derive(Clone)]
pub struct JwtIdentityProvider {
    decoding_key: DecodingKey,
    validation: Validation,
    http_client: HttpClient,
    profile_sync_url: Option<String>,
    admin_token: Option<String>,
}

impl JwtIdentityProvider {
    /// Create a provider verifying HS256 tokens signed with a shared secret
    pub fn with_secret(secret: &str) -> Self {
        Self::new(
            DecodingKey::from_secret(secret.as_bytes()),
            Validation::new(Algorithm::HS256),
        )
    }

    /// Create a provider verifying RS256 tokens against a PEM public key
    pub fn with_rsa_pem(pem: &[u8]) -> IdentityResult<Self> {
        let key = DecodingKey::from_rsa_pem(pem)
            .map_err(|e| IdentityError::Configuration(format!("Invalid public key: {}", e)))?;
        Ok(Self::new(key, Validation::new(Algorithm::RS256)))
    }

    /// Build a provider from service configuration
    pub fn from_config(config: &IdentityConfig) -> IdentityResult<Self> {
        let provider = match (&config.jwt_secret, &config.public_key_path) {
            (_, Some(path)) => {
                let pem = std::fs::read(path).map_err(|e| {
                    IdentityError::Configuration(format!("Cannot read {}: {}", path, e))
                })?;
                Self::with_rsa_pem(&pem)?
            }
            (Some(secret), None) => Self::with_secret(secret),
            (None, None) => {
                return Err(IdentityError::Configuration(
                    "Either IDENTITY_JWT_SECRET or IDENTITY_JWT_PUBLIC_KEY_PATH must be set"
                        .to_string(),
                ))
            }
        };

        let mut provider = provider
            .with_issuer(config.issuer.as_deref())
            .with_audience(config.audience.as_deref());
        provider.profile_sync_url = config.profile_sync_url.clone();
        provider.admin_token = config.admin_token.clone();
        Ok(provider)
    }

    fn new(decoding_key: DecodingKey, mut validation: Validation) -> Self {
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key,
            validation,
            http_client: HttpClient::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            profile_sync_url: None,
            admin_token: None,
        }
    }

    /// Require the `iss` claim to be present and match
    pub fn with_issuer(mut self, issuer: Option<&str>) -> Self {
        if let Some(issuer) = issuer {
            self.validation.set_issuer(&[issuer]);
            self.validation
                .required_spec_claims
                .insert("iss".to_string());
        }
        self
    }

    /// Require the `aud` claim to be present and match
    pub fn with_audience(mut self, audience: Option<&str>) -> Self {
        if let Some(audience) = audience {
            self.validation.set_audience(&[audience]);
            self.validation.validate_aud = true;
            self.validation
                .required_spec_claims
                .insert("aud".to_string());
        }
        self
    }

    /// Decode and validate a token into its claims
    pub fn decode_claims(&self, token: &str) -> IdentityResult<IdentityClaims> {
        decode::<IdentityClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| IdentityError::Invalid(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    fn verify(&self, token: &str) -> IdentityResult<String> {
        let claims = self.decode_claims(token)?;
        if claims.sub.trim().is_empty() {
            return Err(IdentityError::Invalid("Empty subject".into()));
        }
        Ok(claims.sub)
    }

    async fn update_display_name(&self, subject: &str, name: &str) -> IdentityResult<()> {
        let Some(url) = &self.profile_sync_url else {
            log::debug!(
                "No profile sync endpoint configured, skipping display name update for {}",
                subject
            );
            return Ok(());
        };

        let mut request = self.http_client.post(url).json(&DisplayNameUpdate {
            uid: subject,
            display_name: name,
        });
        if let Some(token) = &self.admin_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| IdentityError::Sync(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(IdentityError::Sync(format!(
                "Identity provider returned {}",
                response.status()
            )));
        }

        log::info!("Synced display name for {} to identity provider", subject);
        Ok(())
    }
}
