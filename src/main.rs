use std::sync::Arc;

use docserver::config::Config;
use docserver::context::ServeContext;
use docserver::server::listener::Listener;
use docserver::server::tls;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    cfg.validate()?;

    let ctx = Arc::new(ServeContext::from_config(&cfg)?);
    let acceptor = tls::load_acceptor(&cfg.tls.cert_path, &cfg.tls.key_path)?;
    let listener = Listener::bind(cfg.listen_socket_addr()?, acceptor, ctx).await?;

    tokio::select! {
        res = listener.run() => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
