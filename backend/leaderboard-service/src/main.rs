use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use leaderboard_service::handlers::{
    add_test_data, get_leaderboard, get_neighbors, health, update_score,
};
use leaderboard_service::{logging, metrics, AppState, Config, LeaderboardEngine};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_tracing();

    let config = Arc::new(Config::from_env().context("Failed to load configuration")?);

    info!("Starting leaderboard-service v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.env);

    let engine = Arc::new(LeaderboardEngine::new(&config.leaderboard));
    let state = AppState {
        engine,
        config: config.clone(),
    };

    let bind_addr = (config.app.host.clone(), config.app.port);
    info!(
        "HTTP server listening on {}:{}",
        config.app.host, config.app.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(TracingLogger::default())
            .service(
                web::scope("/customer")
                    .service(add_test_data)
                    .service(update_score),
            )
            .service(
                web::scope("/leaderboard")
                    .service(get_leaderboard)
                    .service(get_neighbors),
            )
            .service(health)
            .route("/metrics", web::get().to(metrics::metrics_handler))
    })
    .bind(bind_addr)
    .context("Failed to bind HTTP listener")?
    .run()
    .await
    .context("HTTP server failed")?;

    Ok(())
}
