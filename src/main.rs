use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod leave;
mod model;
mod models;
mod routes;
mod store;
mod utils;

use config::{Config, StoreBackend};
use db::{ensure_schema, init_db};
use leave::{LeaveLifecycle, PassVerifier};
use store::{LeaveStore, MemoryLeaveStore, MySqlLeaveStore};

use crate::docs::ApiDoc;
use anyhow::Context;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "OK"
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn LeaveStore>> {
    match config.store_backend {
        StoreBackend::MySql => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            let pool = init_db(url).await?;
            ensure_schema(&pool).await?;
            Ok(Arc::new(MySqlLeaveStore::new(pool)))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory leave store; data is lost on restart");
            Ok(Arc::new(MemoryLeaveStore::default()))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let store = build_store(&config).await?;
    let lifecycle = Data::new(LeaveLifecycle::new(store.clone(), config.policy.clone()));
    let verifier = Data::new(PassVerifier::new(store));

    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config.clone());

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(config_data.clone())
            .app_data(lifecycle.clone())
            .app_data(verifier.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, config.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
