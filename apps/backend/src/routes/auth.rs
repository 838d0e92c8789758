use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::middleware::jwt_extract::JwtExtract;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Check credentials with the collaborator and hand back a session token
async fn login(
    req: web::Json<LoginRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if req.login.trim().is_empty() {
        return Err(AppError::bad_request("INVALID_LOGIN", "Login cannot be empty"));
    }

    if req.password.is_empty() {
        return Err(AppError::bad_request(
            "INVALID_PASSWORD",
            "Password cannot be empty",
        ));
    }

    let user = app_state
        .credentials
        .verify(req.login.trim(), &req.password)
        .await?
        .ok_or_else(AppError::bad_credentials)?;

    let token = app_state.issuer.issue(user.user_id, user.rights)?;
    info!(user_id = user.user_id, "user logged in");

    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

/// Revoke every outstanding token of the caller
async fn logout(
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state.registry.remove(current_user.user_id);
    info!(user_id = current_user.user_id, "user logged out");

    Ok(HttpResponse::NoContent().finish())
}

async fn me(current_user: CurrentUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(current_user))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/login").route(web::post().to(login)))
        .service(
            web::resource("/logout")
                .wrap(JwtExtract)
                .route(web::post().to(logout)),
        )
        .service(web::resource("/me").wrap(JwtExtract).route(web::get().to(me)));
}
