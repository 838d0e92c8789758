//! JWT extraction middleware
//!
//! Validates the `Authorization: Bearer` header of every request in the
//! wrapped scope, stores the resulting `Claims` in request extensions and
//! short-circuits with 401 when validation fails. When the presented token
//! was past its soft expiry, the replacement token is written back in the
//! response as `Authorization: Bearer <new>` with
//! `Access-Control-Expose-Headers: Authorization`, so browser clients can
//! pick it up. The headers are attached whatever the inner service answers,
//! a denial from `RequireRights` included.

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::InternalError;
use actix_web::http::header::{self, HeaderMap, HeaderValue};
use actix_web::{web, Error, HttpMessage, ResponseError};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::debug;

use crate::error::AppError;
use crate::state::app_state::AppState;

pub struct JwtExtract;

impl<S, B> Transform<S, ServiceRequest> for JwtExtract
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtExtractMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtExtractMiddleware { service }))
    }
}

pub struct JwtExtractMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for JwtExtractMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Get AppState - must be available
        let app_state = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state.clone(),
            None => return reject(req, AppError::internal("AppState not available")),
        };

        // A header that is not valid ASCII is treated like a missing one.
        let auth_header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let validated = match app_state.validator.validate(auth_header) {
            Ok(validated) => validated,
            Err(e) => {
                debug!(path = %req.path(), code = e.code(), "request rejected by JwtExtract");
                return reject(req, e);
            }
        };

        let refresh_header = match validated.refreshed.as_deref().map(bearer_value).transpose() {
            Ok(value) => value,
            Err(e) => return reject(req, e),
        };

        // Store claims in request extensions BEFORE calling the service
        req.extensions_mut().insert(validated.claims);

        let fut = self.service.call(req);

        Box::pin(async move {
            match fut.await {
                Ok(mut res) => {
                    if let Some(value) = refresh_header {
                        attach_refresh(res.headers_mut(), value);
                    }
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    let Some(value) = refresh_header else {
                        return Err(err);
                    };
                    let mut rendered = err.error_response();
                    attach_refresh(rendered.headers_mut(), value);
                    Err(InternalError::from_response(err.to_string(), rendered).into())
                }
            }
        })
    }
}

/// Answer with the rendered error; rendering happens when polled so the
/// response carries the request's trace id.
fn reject<B>(
    req: ServiceRequest,
    err: AppError,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>>
where
    B: 'static,
{
    Box::pin(async move { Ok(req.into_response(err.error_response()).map_into_right_body()) })
}

fn bearer_value(token: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| AppError::internal(format!("invalid refreshed token header: {e}")))
}

fn attach_refresh(headers: &mut HeaderMap, value: HeaderValue) {
    headers.insert(header::AUTHORIZATION, value);
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("Authorization"),
    );
}
