use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::{Parser, Subcommand};
use tracing::info;

mod api;
mod auth;
mod config;
mod db;
mod logging;
mod shutdown;

use crate::api::{
    greeting::{greeting_config, GreetingCounter},
    health::health_config,
    job::{job_config, MonitorJobService},
    validation,
};
use crate::auth::JwtIdentityResolver;
use crate::db::{JobRepository, TargetRepository};
use crate::shutdown::ShutdownCoordinator;

/// Spreadsheet-driven MAP monitoring job intake
#[derive(Parser)]
#[command(name = "map-monitor", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run migrations, then serve HTTP (default)
    Serve,
    /// Run database migrations and exit
    Migrate,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    let config::Config {
        database_url,
        jwt_secret,
        max_payload_size,
        max_db_connections,
        log_dir,
        bind_address,
        port,
    } = config::Config::from_env().map_err(std::io::Error::other)?;

    logging::init(&log_dir)?;

    let pool = db::connection::get_connection(&database_url, max_db_connections)
        .await
        .map_err(std::io::Error::other)?;
    info!("Database connection pool established (max {} connections)", max_db_connections);

    db::migrations::run_migrations(&pool)
        .await
        .map_err(std::io::Error::other)?;

    if let Some(Command::Migrate) = cli.command {
        pool.close().await;
        return Ok(());
    }

    info!("Starting map-monitor application");
    info!("  - Max payload size: {} bytes", max_payload_size);
    info!("  - Max database connections: {}", max_db_connections);

    // Built once so that every worker shares the same stores and counter
    let job_service = web::Data::new(MonitorJobService::new(
        Arc::new(JobRepository::new(pool.clone())),
        Arc::new(TargetRepository::new(pool.clone())),
        Arc::new(JwtIdentityResolver::new(&jwt_secret)),
    ));
    let greeting_counter = web::Data::new(GreetingCounter::default());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(job_service.clone())
            .app_data(greeting_counter.clone())
            .app_data(web::PayloadConfig::default().limit(max_payload_size))
            .app_data(validation::multipart_config(max_payload_size))
            .app_data(validation::text_config())
            .app_data(validation::query_config())
            .configure(health_config)
            .configure(greeting_config)
            .configure(job_config)
    });

    info!("Server starting on http://{}:{}", bind_address, port);

    let server = server.bind((bind_address.as_str(), port))?.run();
    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    ShutdownCoordinator::new(server_handle, server_task, pool)
        .wait_for_shutdown()
        .await
}
