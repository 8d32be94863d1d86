#![forbid(unsafe_code)]

//! Distribution daemon: serves the distribution-creation API.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use distribution_core::ids::IdStrategy;
use distribution_core::{DistributionHandler, SystemClock, UnknownScopePolicy, ValidationMode};
use distribution_daemon::{router, AppState, DaemonConfig};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "distribution-daemon", version, about = "Distribution creation API")]
struct Args {
    /// TOML config file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:3000
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Log level (env-filter syntax).
    #[arg(long)]
    log: Option<String>,

    /// Require caseId, scope and attachments with the right types.
    #[arg(long)]
    strict: bool,

    /// Reject scopes other than "All States" and "Selected".
    #[arg(long)]
    reject_unknown_scope: bool,

    /// Identifier scheme: ulid or uuid.
    #[arg(long)]
    id_strategy: Option<IdStrategy>,

    /// Disable the permissive CORS layer.
    #[arg(long)]
    no_cors: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<DaemonConfig> {
        let mut cfg = match &self.config {
            Some(path) => DaemonConfig::load_from(path)?,
            None => DaemonConfig::default(),
        };

        if let Some(listen) = self.listen {
            cfg.listen = listen;
        }
        if let Some(log) = self.log {
            cfg.log = log;
        }
        if self.strict {
            cfg.validation.mode = ValidationMode::Strict;
        }
        if self.reject_unknown_scope {
            cfg.validation.unknown_scope = UnknownScopePolicy::Reject;
        }
        if let Some(strategy) = self.id_strategy {
            cfg.id_strategy = strategy;
        }
        if self.no_cors {
            cfg.cors = false;
        }
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Args::parse().into_config()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&cfg.log))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let handler = DistributionHandler::new(
        Arc::from(cfg.id_strategy.build()),
        Arc::new(SystemClock),
        cfg.validation,
    );
    info!(
        listen = %cfg.listen,
        mode = ?handler.policy().mode,
        unknown_scope = ?handler.policy().unknown_scope,
        id_strategy = ?cfg.id_strategy,
        "daemon starting"
    );

    let app = router(AppState::new(handler), cfg.cors);

    let listener = tokio::net::TcpListener::bind(cfg.listen)
        .await
        .with_context(|| format!("bind {}", cfg.listen))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot install SIGTERM handler");
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
    info!("shutdown requested");
}
