//! Session tokens: issuance, validation, revocation and rights checks.

pub mod claims;
pub mod issuer;
pub mod registry;
pub mod rights;
pub mod validator;

pub use claims::Claims;
pub use issuer::TokenIssuer;
pub use registry::TokenRegistry;
pub use rights::RightHandler;
pub use validator::{extract_bearer, TokenValidator, Validated};
