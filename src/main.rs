use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use farmstand::config::Config;
use farmstand::routes::{self, health};
use farmstand::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env()?;
    let state = web::Data::new(AppState::init(&config).await?);

    log::info!(
        "Starting farmstand at {} with the {} store",
        config.server_url(),
        state.store.backend()
    );

    let server_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(server_state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(routes::config))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await?;

    log::info!("Server stopped, closing the {} store", state.store.backend());
    state.store.close().await;
    Ok(())
}
