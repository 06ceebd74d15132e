use orbis_api::config;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up SECRET_KEY, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    if let Err(e) = config.validate() {
        tracing::error!("configuration error: {}", e);
        std::process::exit(1);
    }
    tracing::info!("starting orbis-api in {:?} mode", config.environment);

    let app = orbis_api::app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("ORBIS_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("orbis-api listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
