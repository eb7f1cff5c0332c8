mod config;
mod db;
mod error;
mod services;

use crate::config::AppConfig;
use crate::db::Database;
use actix_web::{middleware, web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // A missing .env file is fine; real deployments set the environment.
    let _ = dotenvy::dotenv();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();

    // Schema creation happens here, once, before any request is served.
    let database = Database::open(config.database_path())
        .map_err(|e| io::Error::other(format!("Failed to open database: {}", e)))?;
    info!("Database tables created/verified at {}", config.database_path());

    let database = web::Data::new(database);
    let app_config = web::Data::new(config.clone());
    let (host, port) = config.bind_address();

    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(database.clone())
            .app_data(app_config.clone())
            .configure(services::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
