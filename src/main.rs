/// Session Service - Main entry point
///
/// Wires the session service together: Redis-backed refresh token store,
/// HTTP client for the user service, injected JWT secret, Axum router.
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use redis::aio::ConnectionManager;
use tokio::net::TcpListener;

use session_service::{
    clients::HttpUserDirectory,
    config::Config,
    routes,
    security::jwt::TokenCodec,
    services::SessionService,
    store::RedisRefreshTokenStore,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env().context("failed to load configuration from environment")?;

    tracing::info!(
        "starting session service on {}:{}",
        config.server_host,
        config.server_port
    );

    let redis_client =
        redis::Client::open(config.redis_url.clone()).context("invalid REDIS_URL")?;
    let redis_conn = ConnectionManager::new(redis_client)
        .await
        .context("failed to connect to Redis")?;

    // Fail at startup rather than on the first request if Redis is down.
    let mut ping_conn = redis_conn.clone();
    redis::cmd("PING")
        .query_async::<_, String>(&mut ping_conn)
        .await
        .context("Redis did not answer PING")?;
    tracing::info!("connected to Redis");

    let http_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .context("failed to build HTTP client")?;

    let sessions = SessionService::new(
        TokenCodec::new(&config.jwt_secret),
        Arc::new(RedisRefreshTokenStore::new(redis_conn)),
        Arc::new(HttpUserDirectory::new(
            http_client,
            config.user_service_url.clone(),
        )),
    );

    let state = AppState {
        sessions: Arc::new(sessions),
        cookie_secure: config.cookie_secure,
    };

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .context("invalid server address")?;

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, routes::router(state))
        .await
        .context("server failed")?;

    Ok(())
}
