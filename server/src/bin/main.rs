use actix_web::{middleware::Logger, web, App, HttpServer};
use pong_server::{chain::ChainRecorder, config::settings, db, http, metrics};
use redis::Client as RedisClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cfg = settings();

    // SQLite pool (migrations applied on connect)
    let db_pool = db::connect(&cfg.database_url, cfg.max_connections)
        .await
        .expect("Failed to open database");

    // Redis client (refresh tokens)
    let redis_client = RedisClient::open(cfg.redis_url.as_str()).expect("Invalid REDIS_URL");

    let recorder = ChainRecorder::from_settings(cfg).expect("Invalid chain relay configuration");
    if matches!(recorder, ChainRecorder::Disabled) {
        log::info!("CHAIN_RELAY_URL not set; tournament results stay off-chain");
    }

    log::info!("listening on {}", cfg.server_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(metrics::METRICS.clone())
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(redis_client.clone()))
            .app_data(web::Data::new(recorder.clone()))
            .configure(http::routes::init_routes)
    })
    .bind(&cfg.server_addr)?
    .run()
    .await
}
