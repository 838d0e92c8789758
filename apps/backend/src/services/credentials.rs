//! Login collaborator: turns a login/password pair into `(user_id, rights)`.
//!
//! Real deployments plug their user store in behind [`CredentialVerifier`].
//! [`StaticCredentials`] is the development directory, read from a JSON file:
//!
//! ```json
//! [{ "login": "admin@example.com", "password": "...", "user_id": 1, "rights": 5 }]
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;

/// Identity handed to the token issuer after a successful credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub rights: i64,
}

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// `Ok(None)` means the credentials were checked and rejected.
    async fn verify(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Option<AuthenticatedUser>, AppError>;
}

#[derive(Debug, Clone, Deserialize)]
struct StaticUser {
    login: String,
    password: String,
    user_id: i64,
    rights: i64,
}

/// In-memory credential directory.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, StaticUser>,
}

impl StaticCredentials {
    pub fn with_user(
        mut self,
        login: impl Into<String>,
        password: impl Into<String>,
        user_id: i64,
        rights: i64,
    ) -> Self {
        let login = login.into();
        self.users.insert(
            login.clone(),
            StaticUser {
                login,
                password: password.into(),
                user_id,
                rights,
            },
        );
        self
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let raw = fs::read(path).map_err(|e| {
            AppError::config(format!("cannot read credentials file {}: {e}", path.display()))
        })?;
        let entries: Vec<StaticUser> = serde_json::from_slice(&raw).map_err(|e| {
            AppError::config(format!("invalid credentials file {}: {e}", path.display()))
        })?;

        let users: HashMap<String, StaticUser> = entries
            .into_iter()
            .map(|user| (user.login.clone(), user))
            .collect();
        info!(path = %path.display(), users = users.len(), "credential directory loaded");
        Ok(Self { users })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialVerifier for StaticCredentials {
    async fn verify(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Option<AuthenticatedUser>, AppError> {
        Ok(self
            .users
            .get(login)
            .filter(|user| user.password == password)
            .map(|user| AuthenticatedUser {
                user_id: user.user_id,
                rights: user.rights,
            }))
    }
}
