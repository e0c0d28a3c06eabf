use anyhow::Context;
use knightwire::config::Config;
use knightwire::{game_app, signaling_app};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    let game_addr = config.game_addr();
    let signaling_addr = config.signaling_addr();

    let game_listener = TcpListener::bind(&game_addr)
        .await
        .with_context(|| format!("failed to bind game server to {game_addr}"))?;
    let signaling_listener = TcpListener::bind(&signaling_addr)
        .await
        .with_context(|| format!("failed to bind signaling server to {signaling_addr}"))?;

    tracing::info!("Game server listening on {}", game_addr);
    tracing::info!("Signaling server listening on {}", signaling_addr);

    let game = axum::serve(game_listener, game_app(&config)).with_graceful_shutdown(shutdown_signal());
    let signaling = axum::serve(signaling_listener, signaling_app(&config))
        .with_graceful_shutdown(shutdown_signal());

    tokio::try_join!(
        async { game.await.context("game server failed") },
        async { signaling.await.context("signaling server failed") },
    )?;

    Ok(())
}
