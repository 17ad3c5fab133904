//! HTTP surface: a health check and the three pipeline endpoints.

pub mod handlers;

#[cfg(test)]
mod tests;

use actix_web::{middleware, web, App, HttpServer};

use crate::{config::Config, error::RelayError, pipeline::Pipeline};

/// Malformed JSON bodies answer with the same `{error}` shape as everything
/// else.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        RelayError::ValidationError(format!("Invalid request body: {}", err)).into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::health)).service(
        web::scope("/api")
            .route("/generate", web::post().to(handlers::generate))
            .route("/reframe", web::post().to(handlers::reframe))
            .route("/remix", web::post().to(handlers::remix)),
    );
}

pub async fn run(config: &Config, pipeline: Pipeline) -> std::io::Result<()> {
    let pipeline = web::Data::new(pipeline);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(pipeline.clone())
            .app_data(json_config())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", config.port))?;

    log::info!("✅ Server ready on port {}", config.port);
    server.run().await
}
