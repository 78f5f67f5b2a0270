use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::info;
use reqwest::Client;

use mealbot::config::Config;
use mealbot::{logging, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    if let Err(e) = logging::setup_logging() {
        eprintln!("Failed to set up logging: {}", e);
        return Ok(());
    }

    let config = Config::from_env();
    config.log_summary();

    let bind_address = config.bind_address.clone();
    let config = web::Data::new(config);
    let client = web::Data::new(Client::new());

    info!("Starting Mealbot server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(config.clone())
            .app_data(client.clone())
            .configure(routes::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
