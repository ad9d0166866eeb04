use log::info;
use sharebox::{app::build_router, config::ShareConfig, state::AppState, storage, sweeper};
use std::env;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    info!("Starting share server...");

    let config = ShareConfig::from_env();
    storage::init_upload_dir(&config.upload_dir).expect("Failed to initialize upload directory");

    let state = AppState::new(config);
    tokio::spawn(sweeper::run(state.clone()));

    let app = build_router(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = format!("0.0.0.0:{}", port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
