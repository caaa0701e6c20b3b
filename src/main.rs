use axum::{extract::Request, ServiceExt};
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;

use uptime_api::store::FileStore;
use uptime_api::{app, config, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up PORT, DATA_DIR, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!(
        "starting uptime API in {:?} mode, data dir {:?}",
        config.environment,
        config.data_dir
    );

    let store = FileStore::new(&config.data_dir);
    let app = app(AppState { store });

    // Routing is defined over slash-trimmed paths
    let app = NormalizePathLayer::trim_trailing_slash().layer(app);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .await
        .expect("server");
}
