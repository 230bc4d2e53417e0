use clap::Parser;
use fallback_proxy::{ConfigError, ProxyConfig, ProxyServer};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fallback-proxy")]
#[command(
    version,
    about = "Reverse proxy for a single upstream API with a substitute-data fallback"
)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Upstream origin that /users is forwarded to
    #[arg(short, long, env = "UPSTREAM_URL")]
    upstream: Option<String>,

    /// Upstream timeout in milliseconds
    #[arg(short, long, env = "UPSTREAM_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Optional YAML configuration file; flags and environment take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match self.config {
            Some(ref path) => ProxyConfig::from_file(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(port) = self.port {
            config.listen.port = port;
        }
        if let Some(url) = self.upstream {
            config.upstream.url = url;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.upstream.timeout_ms = timeout_ms;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse().into_config()?;
    let server = ProxyServer::bind(config).await?;
    let port = server.local_addr()?.port();

    info!("Proxy server running on port {}", port);
    info!("Users endpoint: http://localhost:{}/users", port);
    info!("Health check: http://localhost:{}/health", port);
    info!("Diagnostics: http://localhost:{}/diagnose", port);

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
}
