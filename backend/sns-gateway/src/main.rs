use actix_middleware::{JwtAuthMiddleware, MetricsMiddleware};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use db_pool::Database;
use sns_gateway::{rest_api, AppState, Settings};
use tracing::info;
use tracing_subscriber::prelude::*;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Local development convenience; real deployments set the environment
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true),
        )
        .init();

    info!("Starting SNS gateway...");

    let settings = Settings::from_env().context("Failed to load configuration")?;

    let db = Database::connect(&settings.database)
        .await
        .context("Failed to open database")?;
    info!("Database ready, migrations applied");

    let state = AppState::from_settings(db, &settings).context("Invalid JWT configuration")?;
    let tokens = state.tokens.clone();
    let state = web::Data::new(state);

    let (host, port) = settings.bind_address();
    info!(%host, port, "HTTP server listening");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(JwtAuthMiddleware::new(tokens.clone()))
            .wrap(MetricsMiddleware)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(rest_api::configure)
    })
    .bind((host, port))
    .context("Failed to bind HTTP listener")?
    .run()
    .await
    .context("HTTP server failed")?;

    info!("SNS gateway stopped");
    Ok(())
}
