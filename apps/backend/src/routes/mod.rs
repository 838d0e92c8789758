use actix_web::web;

use crate::auth::rights;
use crate::middleware::jwt_extract::JwtExtract;
use crate::middleware::require_rights::RequireRights;

pub mod admin;
pub mod auth;
pub mod health;

/// Configure application routes, guards included.
///
/// Shared by `main.rs` and the integration tests so both exercise the same
/// `JwtExtract` / `RequireRights` wiring. Domain route groups mount the same
/// way, each with the `RightHandler` of its tier.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Auth routes: /api/auth/** (login is public, the rest wraps JwtExtract)
    cfg.service(web::scope("/api/auth").configure(auth::configure_routes));

    // Admin routes: /api/admin/**
    cfg.service(
        web::scope("/api/admin")
            .wrap(RequireRights::new(rights::admin_only()))
            .wrap(JwtExtract)
            .configure(admin::configure_routes),
    );
}
