//! The HTTP server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use log::info;
use snowfinder_web::{router, Assets, ServiceConfig, SnowFinder, SqliteStore};

use crate::StorageArgs;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

pub struct ServeOptions {
    pub listen: String,
    pub storage: StorageArgs,
    pub assets_dir: PathBuf,
    pub query_timeout_secs: u64,
    pub lookup_timeout_secs: u64,
}

/// Resolve the bind address. A non-empty `port` (from `PORT`) replaces
/// the port of `listen`.
pub fn resolve_listen(listen: &str, port: Option<&str>) -> anyhow::Result<SocketAddr> {
    let mut addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("invalid listen address {:?}", listen))?;
    if let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) {
        let port: u16 = port
            .parse()
            .with_context(|| format!("invalid PORT {:?}", port))?;
        addr.set_port(port);
    }
    Ok(addr)
}

pub async fn run_serve(options: ServeOptions) -> anyhow::Result<()> {
    let port = std::env::var("PORT").ok();
    let addr = resolve_listen(&options.listen, port.as_deref())?;

    let db = options.storage.open()?;
    let assets = Assets::load(&options.assets_dir)
        .with_context(|| format!("loading assets from {}", options.assets_dir.display()))?;
    let config = ServiceConfig::from_secs(options.query_timeout_secs, options.lookup_timeout_secs);
    info!(
        "[snowfinder] bounded waits: query {:?}, lookup {:?}",
        config.query_timeout, config.lookup_timeout
    );

    let app = Arc::new(SnowFinder::new(
        Arc::new(SqliteStore::new(db)),
        assets,
        config,
    ));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("[snowfinder] server starting on {}", addr);

    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("[snowfinder] server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("[snowfinder] failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("[snowfinder] failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("[snowfinder] shutting down...");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_without_port_override() {
        let addr = resolve_listen(DEFAULT_LISTEN, None).unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:8080");
        let addr = resolve_listen("127.0.0.1:9000", Some("")).unwrap();
        assert_eq!(addr.port(), 9000);
    }

    #[test]
    fn test_port_overrides_listen_port() {
        let addr = resolve_listen(DEFAULT_LISTEN, Some("3000")).unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_bad_addresses() {
        assert!(resolve_listen("localhost", None).is_err());
        assert!(resolve_listen(DEFAULT_LISTEN, Some("http")).is_err());
    }
}
