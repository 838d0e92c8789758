//! Rights gate for a group of routes.
//!
//! Must run inside `JwtExtract`, which provides the claims. A denial is
//! answered here with the rendered 401; the wrapped service is never called.
//! In actix the last `.wrap()` is the outermost layer, so register this one
//! first:
//!
//! ```ignore
//! web::scope("/api/admin")
//!     .wrap(RequireRights::new(rights::admin_only()))
//!     .wrap(JwtExtract)
//! ```

use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage, ResponseError};
use futures_util::future::{ready, LocalBoxFuture, Ready};

use crate::auth::claims::Claims;
use crate::auth::rights::RightHandler;
use crate::error::AppError;

pub struct RequireRights {
    rule: Rc<RightHandler>,
}

impl RequireRights {
    pub fn new(rule: RightHandler) -> Self {
        Self {
            rule: Rc::new(rule),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRights
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRightsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRightsMiddleware {
            service,
            rule: Rc::clone(&self.rule),
        }))
    }
}

pub struct RequireRightsMiddleware<S> {
    service: S,
    rule: Rc<RightHandler>,
}

impl<S, B> Service<ServiceRequest> for RequireRightsMiddleware<S>
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
        let verdict = match req.extensions().get::<Claims>() {
            Some(claims) => self.rule.evaluate(claims),
            None => Err(AppError::unauthorized_missing_bearer()),
        };

        match verdict {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            // Rendered when polled so the response carries the request's trace id.
            Err(e) => Box::pin(async move {
                Ok(req.into_response(e.error_response()).map_into_right_body())
            }),
        }
    }
}
