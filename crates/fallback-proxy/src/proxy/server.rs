//! ProxyServer struct and main accept loop.

use super::context::ProxyContext;
use super::network::create_listener;
use crate::api::{route_request, USERS_PREFIX};
use crate::config::ProxyConfig;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Pause after a failed `accept` (e.g. fd exhaustion) before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// How long in-flight connections may keep running after shutdown starts.
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// The proxy server: a bound listener plus the shared request context.
pub struct ProxyServer {
    listener: TcpListener,
    ctx: Arc<ProxyContext>,
}

impl ProxyServer {
    /// Validate the configuration and bind the listening socket.
    pub async fn bind(config: ProxyConfig) -> Result<Self, anyhow::Error> {
        config.validate()?;

        let addr = config.listen_addr()?;
        let listener = create_listener(addr)
            .map_err(|e| anyhow::anyhow!("Failed to bind listener on {addr}: {e}"))?;
        let local_addr = listener.local_addr()?;

        let ctx = ProxyContext::new(config, local_addr.port())?;

        Ok(Self {
            listener,
            ctx: Arc::new(ctx),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run until the process exits.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves, then wait up to
    /// [`SHUTDOWN_GRACE_PERIOD`] for in-flight requests to finish. Idle
    /// keep-alive connections are closed straight away.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), anyhow::Error>
    where
        F: Future<Output = ()>,
    {
        self.run_with_grace(shutdown, SHUTDOWN_GRACE_PERIOD).await
    }

    /// [`run_until`](Self::run_until) with an explicit grace period.
    pub async fn run_with_grace<F>(
        self,
        shutdown: F,
        grace: Duration,
    ) -> Result<(), anyhow::Error>
    where
        F: Future<Output = ()>,
    {
        let addr = self.listener.local_addr()?;
        info!("Listening on http://{}", addr);
        info!(
            "Proxying {} to {} (timeout {}ms)",
            USERS_PREFIX,
            self.ctx.upstream_origin,
            self.ctx.upstream_timeout().as_millis()
        );

        let graceful = GracefulShutdown::new();
        tokio::pin!(shutdown);

        loop {
            let (stream, remote_addr) = tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                        continue;
                    }
                },
                _ = &mut shutdown => {
                    info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
            };

            if let Err(e) = stream.set_nodelay(true) {
                debug!("Failed to set TCP_NODELAY for {}: {}", remote_addr, e);
            }

            let ctx = Arc::clone(&self.ctx);
            let service = service_fn(move |req: Request<Incoming>| {
                let ctx = Arc::clone(&ctx);
                async move { Ok::<_, Infallible>(route_request(&ctx, req).await) }
            });
            let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
            let conn = graceful.watch(conn);

            tokio::spawn(async move {
                // Dropping the service future on disconnect also drops any
                // in-flight upstream request.
                if let Err(err) = conn.await {
                    debug!("Error serving connection from {}: {}", remote_addr, err);
                }
            });
        }

        drop(self.listener);

        let open = graceful.count();
        if open > 0 {
            info!("Waiting for {} open connection(s) to finish", open);
        }
        tokio::select! {
            _ = graceful.shutdown() => {
                info!("All connections closed");
            }
            _ = tokio::time::sleep(grace) => {
                warn!(
                    "Connections still open after {}ms, shutting down anyway",
                    grace.as_millis()
                );
            }
        }

        Ok(())
    }
}
