use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use virtual_ta::config::Config;
use virtual_ta::corpus::{fallback_snapshot, load_corpus, FileSource};
use virtual_ta::server::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting virtual TA server");

    let config = Config::from_env()?;
    info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir.display(),
        policy = ?config.corpus_policy,
        max_links = config.max_links,
        "configuration loaded"
    );

    // Loaded once; handlers share it read-only for the life of the process.
    let corpus = load_corpus(
        config.corpus_policy,
        &FileSource::new(config.data_dir.clone()),
        &fallback_snapshot(),
    )?;

    let app = router(AppState::new(corpus, config.answer_config()));
    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!(listen_addr = %config.listen_addr, "HTTP server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
