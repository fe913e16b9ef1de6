use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::from_fn, web, App, HttpServer};
use dotenvy::dotenv;
use tracing::info;

use bbredirect::analytics::{retention::run_retention_sweeper, ClickManager, StoreSink};
use bbredirect::config::AppConfig;
use bbredirect::middleware::{ApiAuthMiddleware, HealthAuthMiddleware};
use bbredirect::services::{api_routes, health_routes, redirect_routes, AppStartTime};
use bbredirect::storage::{RetentionPolicy, StorageFactory};
use bbredirect::system::logging::init_logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env();
    let _log_guard = init_logging(&config);

    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let store = StorageFactory::create(&config)
        .await
        .expect("Failed to create storage");
    info!("Using storage backend: {}", store.backend_name().await);

    let clicks = ClickManager::new(
        Arc::new(StoreSink(store.clone())),
        config.click_queue_capacity,
        config.click_flush_interval,
    );
    tokio::spawn(clicks.clone().run());
    tokio::spawn(run_retention_sweeper(
        store.clone(),
        RetentionPolicy::default(),
        config.retention_sweep_interval,
    ));

    if config.api_token.is_empty() {
        info!("API is disabled (API_TOKEN not set)");
    } else {
        info!("API available at: /api");
    }

    let bind_address = config.bind_address();
    info!("Starting server at http://{}", bind_address);

    let clicks_for_shutdown = clicks.clone();
    let shared_config = config.clone();
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(clicks.clone()))
            .app_data(web::Data::new(shared_config.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .service(
                api_routes()
                    .wrap(from_fn(ApiAuthMiddleware::api_auth))
                    .wrap(cors),
            )
            .service(health_routes().wrap(from_fn(HealthAuthMiddleware::health_auth)))
            .service(redirect_routes())
    })
    .bind(bind_address)?
    .run()
    .await?;

    // One last drain so buffered clicks survive shutdown
    clicks_for_shutdown.flush().await;

    Ok(())
}
