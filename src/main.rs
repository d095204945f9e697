use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use anyhow::Context;
use showroom_finance::config::{Config, DatabaseConfig};
use showroom_finance::middleware::{
    json_config, path_config, query_config, ErrorLogger, RateLimiter, RequestId,
};
use showroom_finance::modules::configure_routes;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("showroom_finance={},actix_web=info", config.app.log_level).into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if config.app.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        env = %config.app.env,
        bind = %config.server.bind_address(),
        "Starting Showroom Finance"
    );

    // Create database connection pool
    let db_pool = config
        .database
        .create_pool()
        .await
        .context("Failed to create database pool")?;

    tracing::info!(
        min_connections = config.database.pool_size,
        max_connections = config.database.max_connections,
        "Database pool initialized"
    );

    if config.app.run_migrations {
        DatabaseConfig::run_migrations(&db_pool)
            .await
            .context("Failed to run migrations")?;
        tracing::info!("Database migrations applied");
    }

    let pool = web::Data::new(db_pool);
    let policy = web::Data::new(config.finance.clone());
    let rate_limiter = RateLimiter::new(config.http.rate_limit_per_minute);
    let cors_origin = config.http.cors_allowed_origin.clone();

    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        let cors = if cors_origin == "*" {
            Cors::default().allow_any_origin()
        } else {
            Cors::default().allowed_origin(&cors_origin)
        };
        let cors = cors
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .max_age(3600);

        App::new()
            .wrap(ErrorLogger)
            .wrap(rate_limiter.clone())
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(pool.clone())
            .app_data(policy.clone())
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .configure(configure_routes)
    })
    .workers(config.server.workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tracing::info!(workers = config.server.workers, "Server started at http://{}", bind_address);

    server.await?;
    Ok(())
}
