//! Bearer token validation with transparent refresh.
//!
//! A call walks through these steps and stops at the first failure:
//! 1. extract `Bearer <token>` from the header, else `UnauthorizedMissingBearer`
//! 2. verify signature, structure and issuer, then registry membership;
//!    any failure is `UnauthorizedInvalidJwt`
//! 3. hard expiry (`now > iat + hard_expiry`) is `UnauthorizedExpiredJwt`
//! 4. soft expiry (`now > exp`) re-signs the same subject and rights; the new
//!    token travels back in the response headers and the request goes on
//!
//! Expiry is decided here, not by `jsonwebtoken`, so library exp checks are off.

use std::time::SystemTime;

use jsonwebtoken::{decode, DecodingKey, Validation};
use tracing::{debug, info};

use super::claims::Claims;
use super::issuer::{unix_seconds, whole_seconds, TokenIssuer};
use crate::AppError;

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub claims: Claims,
    /// Replacement token when the presented one was past its soft expiry
    pub refreshed: Option<String>,
}

#[derive(Clone)]
pub struct TokenValidator {
    issuer: TokenIssuer,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(issuer: TokenIssuer) -> Self {
        let security = issuer.security();
        let decoding_key = DecodingKey::from_secret(&security.jwt_secret);

        // Pin algorithm and issuer; expiry is handled in validate_at.
        let mut validation = Validation::new(security.algorithm);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp", "iss"]);
        validation.set_issuer(&[security.issuer.as_str()]);

        Self {
            issuer,
            decoding_key,
            validation,
        }
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Validate the raw value of an `Authorization` header.
    pub fn validate(&self, header: Option<&str>) -> Result<Validated, AppError> {
        self.validate_at(header, SystemTime::now())
    }

    pub fn validate_at(&self, header: Option<&str>, now: SystemTime) -> Result<Validated, AppError> {
        let token = extract_bearer(header)?;
        let claims = self.verify(token)?;

        let now_secs = unix_seconds(now)?;
        let hard_expiry = whole_seconds(self.issuer.security().hard_expiry);
        if now_secs > claims.iat.saturating_add(hard_expiry) {
            debug!(user_id = claims.sub, iat = claims.iat, "token past hard expiry");
            return Err(AppError::unauthorized_expired_jwt());
        }

        if now_secs > claims.exp {
            let refreshed = self.issuer.sign_at(claims.sub, claims.rig, now)?;
            info!(user_id = claims.sub, "session token refreshed");
            return Ok(Validated {
                claims,
                refreshed: Some(refreshed),
            });
        }

        Ok(Validated {
            claims,
            refreshed: None,
        })
    }

    /// Signature, structure and registry membership.
    ///
    /// An unregistered subject is reported exactly like a forged token.
    fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "token rejected");
                AppError::unauthorized_invalid_jwt()
            })?;

        if !self.issuer.registry().contains(claims.sub) {
            debug!(user_id = claims.sub, "token subject not in registry");
            return Err(AppError::unauthorized_invalid_jwt());
        }

        Ok(claims)
    }
}

/// Parse `Bearer <token>`: two whitespace separated parts, exact scheme, non-empty token.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AppError> {
    let auth_str = header.ok_or_else(AppError::unauthorized_missing_bearer)?;

    let parts: Vec<&str> = auth_str.split_whitespace().collect();
    if parts.len() != 2 || parts[0] != "Bearer" || parts[1].is_empty() {
        return Err(AppError::unauthorized_missing_bearer());
    }

    Ok(parts[1])
}
