// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HS256 JWT authentication adapter.
//!
//! Implements `AuthAdapter` by verifying bearer tokens signed with a shared
//! secret. The `sub` claim is the owner identifier for every scoped operation.

pub mod claims;

pub use claims::Claims;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use taskwright_config::model::AuthConfig;
use taskwright_core::{
    AdapterType, AuthAdapter, AuthIdentity, HealthStatus, PluginAdapter, TaskwrightError,
};

/// Environment variable consulted when `auth.jwt_secret` is unset.
pub const SECRET_ENV: &str = "TASKWRIGHT_JWT_SECRET";

/// Returns the configured secret, else the env var, else a config error.
pub fn resolve_secret(configured: Option<&str>) -> Result<String, TaskwrightError> {
    if let Some(secret) = configured
        && !secret.is_empty()
    {
        return Ok(secret.to_string());
    }
    match std::env::var(SECRET_ENV) {
        Ok(secret) if !secret.is_empty() => Ok(secret),
        _ => Err(TaskwrightError::Config(format!(
            "no JWT secret configured: set auth.jwt_secret or {SECRET_ENV}"
        ))),
    }
}

/// Shared-secret JWT issuer and verifier.
pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
}

impl JwtAuth {
    /// Create an adapter from a raw secret and token lifetime.
    pub fn new(secret: &str, ttl_hours: u64) -> Result<Self, TaskwrightError> {
        if secret.is_empty() {
            return Err(TaskwrightError::Config(
                "JWT secret must not be empty".to_string(),
            ));
        }
        let ttl = i64::try_from(ttl_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .ok_or_else(|| {
                TaskwrightError::Config(format!("token_ttl_hours {ttl_hours} is out of range"))
            })?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    /// Create an adapter from the `[auth]` section, falling back to [`SECRET_ENV`].
    pub fn from_config(config: &AuthConfig) -> Result<Self, TaskwrightError> {
        let secret = resolve_secret(config.jwt_secret.as_deref())?;
        Self::new(&secret, config.token_ttl_hours)
    }

    /// Mint a token for `user_id`, valid for the configured lifetime.
    pub fn issue(&self, user_id: &str, email: Option<&str>) -> Result<String, TaskwrightError> {
        if user_id.trim().is_empty() {
            return Err(TaskwrightError::Validation(
                "user id must not be empty".to_string(),
            ));
        }
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.map(str::to_string),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    /// Sign an arbitrary claim set.
    pub fn sign(&self, claims: &Claims) -> Result<String, TaskwrightError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TaskwrightError::Internal(format!("failed to sign token: {e}")))
    }

    /// Decode and validate a token, returning its claims.
    pub fn decode(&self, token: &str) -> Result<Claims, TaskwrightError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "bearer token rejected");
                TaskwrightError::Auth(format!("invalid token: {e}"))
            })?;
        if data.claims.sub.trim().is_empty() {
            return Err(TaskwrightError::Auth("token has an empty subject".to_string()));
        }
        Ok(data.claims)
    }
}

#[async_trait]
impl PluginAdapter for JwtAuth {
    fn name(&self) -> &str {
        "jwt-auth"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Auth
    }

    async fn health_check(&self) -> Result<HealthStatus, TaskwrightError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TaskwrightError> {
        Ok(())
    }
}

#[async_trait]
impl AuthAdapter for JwtAuth {
    async fn verify(&self, token: &str) -> Result<AuthIdentity, TaskwrightError> {
        let claims = self.decode(token)?;
        Ok(AuthIdentity {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn auth() -> JwtAuth {
        JwtAuth::new("test-secret", 168).unwrap()
    }

    #[tokio::test]
    async fn issued_token_verifies() {
        let auth = auth();
        let token = auth.issue("user-42", Some("u42@example.com")).unwrap();

        let identity = auth.verify(&token).await.unwrap();
        assert_eq!(identity.user_id, "user-42");
        assert_eq!(identity.email.as_deref(), Some("u42@example.com"));
    }

    #[test]
    fn expiry_follows_ttl() {
        let auth = JwtAuth::new("test-secret", 2).unwrap();
        let claims = auth.decode(&auth.issue("u1", None).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, 2 * 3600);
        assert!(claims.email.is_none());
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let token = JwtAuth::new("other-secret", 1).unwrap().issue("u1", None).unwrap();
        let err = auth().verify(&token).await.unwrap_err();
        assert!(matches!(err, TaskwrightError::Auth(_)));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let auth = auth();
        let now = chrono::Utc::now().timestamp();
        let token = auth
            .sign(&Claims {
                sub: "u1".to_string(),
                email: None,
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();
        assert!(matches!(
            auth.verify(&token).await.unwrap_err(),
            TaskwrightError::Auth(_)
        ));
    }

    #[tokio::test]
    async fn empty_subject_is_rejected() {
        let auth = auth();
        let now = chrono::Utc::now().timestamp();
        let token = auth
            .sign(&Claims {
                sub: "  ".to_string(),
                email: None,
                iat: now,
                exp: now + 3600,
            })
            .unwrap();
        assert!(matches!(
            auth.verify(&token).await.unwrap_err(),
            TaskwrightError::Auth(_)
        ));
    }

    #[tokio::test]
    async fn garbage_is_rejected() {
        assert!(auth().verify("not.a.jwt").await.is_err());
        assert!(auth().verify("").await.is_err());
    }

    #[test]
    fn empty_secret_and_user_are_refused() {
        assert!(matches!(JwtAuth::new("", 1), Err(TaskwrightError::Config(_))));
        assert!(matches!(
            auth().issue(" ", None),
            Err(TaskwrightError::Validation(_))
        ));
    }

    #[test]
    #[serial]
    fn secret_resolution_prefers_config_then_env() {
        // SAFETY: serialized with every other env-mutating test.
        unsafe { std::env::remove_var(SECRET_ENV) };
        assert!(matches!(resolve_secret(None), Err(TaskwrightError::Config(_))));
        assert_eq!(resolve_secret(Some("from-config")).unwrap(), "from-config");

        unsafe { std::env::set_var(SECRET_ENV, "from-env") };
        assert_eq!(resolve_secret(None).unwrap(), "from-env");
        assert_eq!(resolve_secret(Some("")).unwrap(), "from-env");
        assert_eq!(resolve_secret(Some("from-config")).unwrap(), "from-config");
        unsafe { std::env::remove_var(SECRET_ENV) };
    }

    #[test]
    #[serial]
    fn from_config_uses_ttl() {
        let config = AuthConfig {
            jwt_secret: Some("cfg-secret".to_string()),
            token_ttl_hours: 1,
        };
        let auth = JwtAuth::from_config(&config).unwrap();
        let claims = auth.decode(&auth.issue("u1", None).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn adapter_identity() {
        let auth = auth();
        assert_eq!(auth.name(), "jwt-auth");
        assert_eq!(auth.adapter_type(), AdapterType::Auth);
    }
}
