use actix_web::error::ResponseError;
use actix_web::http::{header, StatusCode};
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::trace_ctx;

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("UnauthorizedMissingBearer")]
    UnauthorizedMissingBearer,
    #[error("UnauthorizedInvalidJwt")]
    UnauthorizedInvalidJwt,
    #[error("UnauthorizedExpiredJwt")]
    UnauthorizedExpiredJwt,
    #[error("Permission denied: {detail}")]
    PermissionDenied { detail: String },
    #[error("Token signing failed: {detail}")]
    TokenSigning { detail: String },
    #[error("BadCredentials")]
    BadCredentials,
    #[error("Bad request: {detail}")]
    BadRequest { code: &'static str, detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Persistence error: {detail}")]
    Persistence { detail: String },
}

impl AppError {
    /// Stable machine-readable code, used in logs
    pub fn code(&self) -> &'static str {
        match self {
            AppError::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            AppError::UnauthorizedInvalidJwt => "UNAUTHORIZED_INVALID_JWT",
            AppError::UnauthorizedExpiredJwt => "UNAUTHORIZED_EXPIRED_JWT",
            AppError::PermissionDenied { .. } => "PERMISSION_DENIED",
            AppError::TokenSigning { .. } => "TOKEN_SIGNING",
            AppError::BadCredentials => "BAD_CREDENTIALS",
            AppError::BadRequest { code, .. } => code,
            AppError::Internal { .. } => "INTERNAL",
            AppError::Config { .. } => "CONFIG_ERROR",
            AppError::Persistence { .. } => "PERSISTENCE_ERROR",
        }
    }

    /// Human-readable message sent to the client
    pub fn detail(&self) -> String {
        match self {
            AppError::UnauthorizedMissingBearer => "Missing or malformed Bearer token".to_string(),
            AppError::UnauthorizedInvalidJwt => "Invalid token".to_string(),
            AppError::UnauthorizedExpiredJwt => "Token expired, please log in again".to_string(),
            AppError::PermissionDenied { detail } => detail.clone(),
            AppError::TokenSigning { detail } => detail.clone(),
            AppError::BadCredentials => "Invalid login or password".to_string(),
            AppError::BadRequest { detail, .. } => detail.clone(),
            AppError::Internal { detail } => detail.clone(),
            AppError::Config { detail } => detail.clone(),
            AppError::Persistence { detail } => detail.clone(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UnauthorizedMissingBearer => StatusCode::UNAUTHORIZED,
            AppError::UnauthorizedInvalidJwt => StatusCode::UNAUTHORIZED,
            AppError::UnauthorizedExpiredJwt => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied { .. } => StatusCode::UNAUTHORIZED,
            AppError::TokenSigning { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadCredentials => StatusCode::UNAUTHORIZED,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn unauthorized_missing_bearer() -> Self {
        Self::UnauthorizedMissingBearer
    }

    pub fn unauthorized_invalid_jwt() -> Self {
        Self::UnauthorizedInvalidJwt
    }

    pub fn unauthorized_expired_jwt() -> Self {
        Self::UnauthorizedExpiredJwt
    }

    pub fn permission_denied(detail: impl Into<String>) -> Self {
        Self::PermissionDenied {
            detail: detail.into(),
        }
    }

    pub fn token_signing(detail: impl Into<String>) -> Self {
        Self::TokenSigning {
            detail: detail.into(),
        }
    }

    pub fn bad_credentials() -> Self {
        Self::BadCredentials
    }

    pub fn bad_request(code: &'static str, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn persistence(detail: impl Into<String>) -> Self {
        Self::Persistence {
            detail: detail.into(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let trace_id = trace_ctx::trace_id();

        let mut builder = HttpResponse::build(status);
        builder
            .content_type("application/json")
            .insert_header(("x-trace-id", trace_id));

        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }

        builder.json(ErrorBody {
            error: self.detail(),
        })
    }
}
