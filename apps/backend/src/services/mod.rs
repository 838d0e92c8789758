pub mod credentials;

pub use credentials::{AuthenticatedUser, CredentialVerifier, StaticCredentials};
