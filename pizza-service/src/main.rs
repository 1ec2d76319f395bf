use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use pizza_auth::{RevocationRegistry, TokenConfig, TokenService};
use pizza_service::config::load_service_config;
use pizza_service::store::MemoryStore;
use pizza_service::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = load_service_config()?;
    let token_config =
        TokenConfig::new(config.jwt_secret.as_str()).with_ttl(config.token_ttl_seconds);
    let tokens = TokenService::new(token_config, RevocationRegistry::new());

    let state = AppState {
        db: Arc::new(MemoryStore::new()),
        tokens: Arc::new(tokens),
        config: Arc::new(config),
    };
    let app = router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let ip: std::net::IpAddr = host.parse()?;
    let addr = SocketAddr::from((ip, port));

    info!(%addr, "starting pizza-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
