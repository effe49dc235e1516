use std::net::{Ipv4Addr, SocketAddr};

use tracing_subscriber::EnvFilter;

use marketplace_server::config::AppConfig;
use marketplace_server::database::client::{Database, DbConfig};
use marketplace_server::init;
use marketplace_server::middleware::error::AppResult;
use marketplace_server::middleware::mw_ctx;

#[tokio::main]
async fn main() -> AppResult<()> {
    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db = Database::connect(DbConfig {
        url: &config.db_url,
        database: &config.db_database,
        namespace: &config.db_namespace,
        username: config.db_username.as_deref(),
        password: config.db_password.as_deref(),
    })
    .await;

    init::run_migrations(&db).await?;

    let ctx_state = mw_ctx::create_ctx_state(db, &config);
    init::create_admin_user(&ctx_state).await?;

    let routes_all = init::main_router(&ctx_state).await;

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    tracing::info!("->> LISTENING on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("tcp listener bind");
    axum::serve(listener, routes_all.into_make_service())
        .await
        .expect("server run");

    Ok(())
}
