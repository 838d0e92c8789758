use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use serde::Serialize;

use crate::auth::claims::Claims;
use crate::error::AppError;

/// Caller identity taken from the claims `JwtExtract` stored in request extensions.
///
/// Only usable on routes wrapped by `JwtExtract`; elsewhere it fails with 401.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: i64,
    pub rights: i64,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<&Claims> for CurrentUser {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            rights: claims.rig,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Claims>()
                .map(CurrentUser::from)
                .ok_or_else(AppError::unauthorized_missing_bearer),
        )
    }
}
