use crate::config::Config;
use crate::kicks::KicksApi;
use crate::search::{QueryPolicy, ResponseStore, SearchCoalescer};
use crate::state::AppState;
use crate::utils::fmt_duration;
use crate::web::create_router;
use anyhow::Context;
use axum::Router;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{error, info, warn};

/// Main application struct containing all necessary components
pub struct App {
    config: Config,
    app_state: AppState,
}

impl App {
    /// Build the upstream client and the one search cache every handler shares.
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        let api = KicksApi::new(
            &config.kicksdb_base_url,
            config.kicksdb_key.clone(),
            config.upstream_timeout,
        )
        .context("Failed to create pricing API client")?;

        let upstream_configured = api.has_credential();
        if !upstream_configured {
            warn!("KICKSDB_KEY is not set; every search will fail until it is configured");
        }

        let policy = QueryPolicy {
            min_term_len: config.min_query_length,
            default_limit: config.default_limit,
            max_limit: config.max_limit,
        };
        let store = ResponseStore::new(config.cache_ttl);
        let search = SearchCoalescer::new(Arc::new(api), store, policy);

        info!(
            base_url = %config.kicksdb_base_url,
            cache_ttl = fmt_duration(config.cache_ttl),
            upstream_timeout = fmt_duration(config.upstream_timeout),
            min_query_length = policy.min_term_len,
            max_limit = policy.max_limit,
            "search cache configured"
        );

        Ok(App {
            app_state: AppState::new(search, upstream_configured),
            config,
        })
    }

    pub fn router(&self) -> Router {
        create_router(self.app_state.clone())
    }

    /// Serve until a shutdown signal arrives, then drain for at most `SHUTDOWN_TIMEOUT`.
    pub async fn run(self) -> ExitCode {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(%addr, error = %e, "failed to bind listener");
                return ExitCode::FAILURE;
            }
        };
        info!(%addr, "web server listening");

        let signalled = Arc::new(Notify::new());
        let notify = signalled.clone();
        let serve = axum::serve(listener, self.router()).with_graceful_shutdown(async move {
            shutdown_signal().await;
            notify.notify_one();
        });
        let mut server = tokio::spawn(async move { serve.await });

        tokio::select! {
            result = &mut server => return exit_code(result),
            _ = signalled.notified() => {}
        }

        let timeout = self.config.shutdown_timeout;
        info!(timeout = fmt_duration(timeout), "shutdown signal received, draining connections");
        match tokio::time::timeout(timeout, &mut server).await {
            Ok(result) => exit_code(result),
            Err(_) => {
                warn!(timeout = fmt_duration(timeout), "graceful shutdown timed out");
                server.abort();
                ExitCode::FAILURE
            }
        }
    }
}

fn exit_code(result: Result<std::io::Result<()>, tokio::task::JoinError>) -> ExitCode {
    match result {
        Ok(Ok(())) => {
            info!("web server stopped");
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            error!(error = %e, "web server failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "web server task panicked");
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(signal = "SIGINT", "received shutdown signal"),
        _ = terminate => info!(signal = "SIGTERM", "received shutdown signal"),
    }
}
