use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use groupsplit::config::{Config, StorageKind};
use groupsplit::mongo::MongoRepository;
use groupsplit::repository::{GroupRepository, InMemoryRepository};
use groupsplit::routes;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::load().map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    let repository: Arc<dyn GroupRepository> = match config.storage {
        StorageKind::Mongo => {
            tracing::info!("Using the following URI: {}", config.mongodb.uri);
            let repository = MongoRepository::connect(&config.mongodb)
                .await
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            tracing::info!(database = %config.mongodb.database, "Connected");
            Arc::new(repository)
        }
        StorageKind::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            Arc::new(InMemoryRepository::new())
        }
    };
    let repository = web::Data::from(repository);

    tracing::info!(
        "{} listening on {}:{}",
        config.service_name,
        config.bind_addr,
        config.port
    );
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(repository.clone())
            .configure(routes::configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
