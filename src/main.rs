use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;

use dongnebangne::config::Config;
use dongnebangne::routes::setup_routes;
use dongnebangne::state::{AppState, SESSION_PRUNE_INTERVAL};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = Config::new().map_err(|e| std::io::Error::other(e.to_string()))?;
    let address = config.server_address();
    let allowed_origin = config.cors_allowed_origin.clone();

    info!("🚀 동네방네 주변 친구 서버가 시작됩니다...");
    info!("📍 서버 주소: http://{}", address);
    info!("🌐 API 서버: {}", config.api_base_url);
    info!("⭕ 기본 반경: {}m", config.default_radius_meters);
    info!("⌛ 세션 만료: {}초", config.session_ttl_secs);

    let state = web::Data::new(AppState::new(config));
    spawn_session_pruner(state.clone());

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(setup_routes)
    })
    .bind(address)?
    .run()
    .await
}

/// 오래 쓰지 않은 세션을 주기적으로 정리
fn spawn_session_pruner(state: web::Data<AppState>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PRUNE_INTERVAL);
        loop {
            ticker.tick().await;
            if state.sessions.is_empty() {
                continue;
            }
            let pruned = state.sessions.prune_idle();
            if pruned > 0 {
                info!("🧹 만료 세션 {}개 정리, 남은 세션 {}개", pruned, state.sessions.len());
            }
        }
    });
}
