use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use copro_backend::config::app::AppConfig;
use copro_backend::middleware::cors::cors_middleware;
use copro_backend::middleware::request_trace::RequestTrace;
use copro_backend::middleware::structured_logger::StructuredLogger;
use copro_backend::middleware::trace_span::TraceSpan;
use copro_backend::routes;
use copro_backend::services::credentials::{CredentialVerifier, StaticCredentials};
use copro_backend::state::app_state::AppState;
use copro_backend::telemetry;
use copro_backend::TokenRegistry;
use tracing::{error, info, warn};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment
    // (docker env_file, or sourced manually for local development).
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let credentials: Arc<dyn CredentialVerifier> = match &config.credentials_file {
        Some(path) => match StaticCredentials::from_file(path) {
            Ok(credentials) => Arc::new(credentials),
            Err(e) => {
                error!(error = %e, "failed to load credentials");
                std::process::exit(1);
            }
        },
        None => {
            warn!("BACKEND_CREDENTIALS_FILE not set, every login will be rejected");
            Arc::new(StaticCredentials::default())
        }
    };

    // Sessions from the previous run stay valid unless the file is gone or corrupt.
    let registry = Arc::new(TokenRegistry::from_file(&config.registry_file));

    let app_state = AppState::new(config.security(), Arc::clone(&registry), credentials);
    let data = web::Data::new(app_state);

    info!(host = %config.host, port = config.port, "starting copro backend");

    // Middleware order (outermost last): RequestTrace sets the trace id that
    // TraceSpan and StructuredLogger read.
    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    // The server has drained in-flight requests; persist live sessions.
    if let Err(e) = registry.save_to_file(&config.registry_file) {
        error!(error = %e, "failed to persist token registry");
    }

    Ok(())
}
