use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, EncodingKey, Header};
use tracing::debug;

use super::claims::Claims;
use super::registry::TokenRegistry;
use crate::state::security_config::SecurityConfig;
use crate::AppError;

/// Mints HS256 session tokens and records their subject in the registry.
#[derive(Clone)]
pub struct TokenIssuer {
    security: SecurityConfig,
    registry: Arc<TokenRegistry>,
    encoding_key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(security: SecurityConfig, registry: Arc<TokenRegistry>) -> Self {
        let encoding_key = EncodingKey::from_secret(&security.jwt_secret);
        Self {
            security,
            registry,
            encoding_key,
        }
    }

    pub fn security(&self) -> &SecurityConfig {
        &self.security
    }

    pub fn registry(&self) -> &Arc<TokenRegistry> {
        &self.registry
    }

    /// Issue a token for a user whose credentials were already checked.
    pub fn issue(&self, user_id: i64, rights: i64) -> Result<String, AppError> {
        self.issue_at(user_id, rights, SystemTime::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// Re-issuing for a registered user is harmless; the entry is overwritten.
    pub fn issue_at(&self, user_id: i64, rights: i64, now: SystemTime) -> Result<String, AppError> {
        let token = self.sign_at(user_id, rights, now)?;
        self.registry.add(user_id);
        debug!(user_id, rights, "session token issued");
        Ok(token)
    }

    /// Sign fresh claims without touching the registry.
    ///
    /// Used for transparent refresh, where the caller already checked that the
    /// user is registered; registering again here could revive a session that a
    /// concurrent logout just removed.
    pub(crate) fn sign_at(
        &self,
        user_id: i64,
        rights: i64,
        now: SystemTime,
    ) -> Result<String, AppError> {
        let iat = unix_seconds(now)?;
        let exp = iat.saturating_add(whole_seconds(self.security.soft_expiry));

        let claims = Claims {
            sub: user_id,
            rig: rights,
            iat,
            exp,
            iss: self.security.issuer.clone(),
        };

        encode(
            &Header::new(self.security.algorithm),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| AppError::token_signing(format!("Failed to encode JWT: {e}")))
    }
}

pub(crate) fn unix_seconds(now: SystemTime) -> Result<i64, AppError> {
    now.duration_since(UNIX_EPOCH)
        .map(whole_seconds)
        .map_err(|_| AppError::internal("Failed to get current time"))
}

/// Seconds in `d`, saturating at `i64::MAX`.
pub(crate) fn whole_seconds(d: Duration) -> i64 {
    i64::try_from(d.as_secs()).unwrap_or(i64::MAX)
}
