use bazaar_api_rust::{config, database, payment::PaymentGateway, routes, state::AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET,
    // and the gateway credentials
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Bazaar API in {:?} mode", config.environment);

    let pool = database::pool::connect()
        .unwrap_or_else(|e| panic!("database configuration: {}", e));
    database::pool::migrate(&pool).await;

    let gateway = PaymentGateway::from_config(&config.gateway);
    let app = routes::app(AppState::new(pool, gateway));

    // Allow tests or deployments to override port via env
    let port = std::env::var("BAZAAR_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Bazaar API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
