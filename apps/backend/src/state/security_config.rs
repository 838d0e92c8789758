use std::time::Duration;

use jsonwebtoken::Algorithm;

/// Issuer claim stamped into every token this backend signs.
pub const TOKEN_ISSUER: &str = "copro-backend";

/// Window after which a token is transparently re-issued.
pub const DEFAULT_SOFT_EXPIRY: Duration = Duration::from_secs(30);

/// Window after which the caller must log in again.
pub const DEFAULT_HARD_EXPIRY: Duration = Duration::from_secs(15 * 24 * 60 * 60);

/// Configuration for JWT security settings
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT secret key for signing and verifying tokens
    pub jwt_secret: Vec<u8>,
    /// JWT algorithm to use (defaults to HS256)
    pub algorithm: Algorithm,
    /// Value of the `iss` claim, checked on every validation
    pub issuer: String,
    /// Soft expiry: `exp = iat + soft_expiry`
    pub soft_expiry: Duration,
    /// Hard expiry, measured from `iat`
    pub hard_expiry: Duration,
}

impl SecurityConfig {
    /// Create a new SecurityConfig with the given JWT secret and default windows
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            issuer: TOKEN_ISSUER.to_string(),
            soft_expiry: DEFAULT_SOFT_EXPIRY,
            hard_expiry: DEFAULT_HARD_EXPIRY,
        }
    }

    pub fn with_soft_expiry(mut self, soft_expiry: Duration) -> Self {
        self.soft_expiry = soft_expiry;
        self
    }

    pub fn with_hard_expiry(mut self, hard_expiry: Duration) -> Self {
        self.hard_expiry = hard_expiry;
        self
    }

    /// Security config with a fixed secret for tests
    pub fn for_tests() -> Self {
        Self::new(b"test_secret_key_for_testing_purposes_only".to_vec())
    }
}
