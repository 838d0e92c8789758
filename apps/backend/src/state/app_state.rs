use std::sync::Arc;

use super::security_config::SecurityConfig;
use crate::auth::{TokenIssuer, TokenRegistry, TokenValidator};
use crate::services::credentials::{CredentialVerifier, StaticCredentials};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Users with live sessions; shared with issuer and validator
    pub registry: Arc<TokenRegistry>,
    pub issuer: TokenIssuer,
    pub validator: TokenValidator,
    /// Login collaborator
    pub credentials: Arc<dyn CredentialVerifier>,
}

impl AppState {
    /// Wire issuer and validator around an existing registry
    pub fn new(
        security: SecurityConfig,
        registry: Arc<TokenRegistry>,
        credentials: Arc<dyn CredentialVerifier>,
    ) -> Self {
        let issuer = TokenIssuer::new(security, Arc::clone(&registry));
        let validator = TokenValidator::new(issuer.clone());
        Self {
            registry,
            issuer,
            validator,
            credentials,
        }
    }

    /// Fresh registry and an empty credential directory
    pub fn for_tests() -> Self {
        Self::for_tests_with_security(SecurityConfig::for_tests())
    }

    pub fn for_tests_with_security(security: SecurityConfig) -> Self {
        Self::new(
            security,
            Arc::new(TokenRegistry::new()),
            Arc::new(StaticCredentials::default()),
        )
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialVerifier>) -> Self {
        self.credentials = credentials;
        self
    }
}
