mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;

use actix_web::{App, HttpServer, web};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    tracing::info!("Connecting to database...");
    let db = db::establish_connection()
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    tracing::info!("Database connected");

    if let Err(e) = services::admin_service::AdminService::seed_default_admin(&db).await {
        tracing::error!("Failed to seed default admin: {}", e);
    }

    tracing::info!("Starting server on http://127.0.0.1:8080");

    // web::Data partage la connexion entre workers via un Arc
    let data = web::Data::new(db);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(routes::configure_routes)
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await
}
