use actix_web::{web, HttpResponse, Result};
use serde::Serialize;
use tracing::info;

use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct SessionsResponse {
    active_sessions: usize,
}

async fn sessions(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(SessionsResponse {
        active_sessions: app_state.registry.len(),
    }))
}

/// Force-logout another user
async fn revoke_session(
    path: web::Path<i64>,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let removed = app_state.registry.remove(user_id);
    info!(
        admin_id = current_user.user_id,
        user_id, removed, "session revoked by admin"
    );

    Ok(HttpResponse::NoContent().finish())
}

/// Mounted under `/api/admin`, behind `JwtExtract` and `RequireRights(admin_only)`
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/sessions", web::get().to(sessions))
        .route("/sessions/{user_id}", web::delete().to(revoke_session));
}
