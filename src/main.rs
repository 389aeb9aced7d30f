use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpResponse, HttpServer, Responder, get};
use anyhow::Context;
use dotenvy::dotenv;
use serde_json::json;

mod api;
mod auth;
mod client;
mod config;
mod docs;
mod model;
mod models;
mod report;
mod routes;
mod state;
mod storage;
mod theme;
#[cfg(test)]
mod testing;

use config::Config;
use state::AppState;

use crate::docs::ApiDoc;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index(state: Data<AppState>) -> impl Responder {
    let session = state.session.current();
    HttpResponse::Ok().json(json!({
        "app": state.config.company_name,
        "signedIn": session.is_some(),
        "dashboard": session.map(|s| s.role.dashboard_path()),
        "activity": state.views.activity(),
    }))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "console.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Console starting...");

    let server_addr = config.server_addr.clone();
    // one state for all workers: the session and pending calls are process-wide
    let state = Data::new(AppState::from_config(config)?);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(state.clone())
            .service(index)
            .configure(routes::configure)
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {}", server_addr))?
    .run()
    .await?;

    Ok(())
}
