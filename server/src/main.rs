use server::config::ServerConfig;
use server::state::AppState;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let state = AppState::new(&config).await?;
    let app = server::app(state, &config.public_dir);

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("server listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
