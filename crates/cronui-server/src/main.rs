use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use cronui_core::config::CronuiConfig;
use cronui_sync::{CrontabGateway, Reconciler};

mod app;
mod http;

/// Serve the current user's crontab over HTTP for editing.
#[derive(Parser)]
#[command(name = "cronui-server", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.cronui/cronui.toml, or CRONUI_CONFIG)
    #[arg(short, long, value_name = "PATH", env = "CRONUI_CONFIG")]
    config: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cronui_server=info,cronui_sync=info,tower_http=debug".into()
            }),
        )
        .init();

    // precedence: CLI flags > PORT/ERROR_EMAIL > CRONUI_* env > TOML file > defaults
    let mut config = CronuiConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        CronuiConfig::default()
    });
    apply_legacy_env(&mut config);
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    let gateway = CrontabGateway::from_config(&config.crontab);
    info!(
        program = %config.crontab.program,
        timeout_secs = config.crontab.timeout_secs,
        "using crontab tool"
    );

    let addr: SocketAddr = config.listen_addr().parse()?;
    let state = Arc::new(app::AppState::new(config, Reconciler::new(Arc::new(gateway))));
    let router = app::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Crontab UI is running at http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shut down");
    Ok(())
}

/// `PORT` and `ERROR_EMAIL` are accepted unprefixed for existing deployments.
fn apply_legacy_env(config: &mut CronuiConfig) {
    if let Ok(port) = std::env::var("PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => tracing::warn!(value = %port, "ignoring invalid PORT"),
        }
    }
    if let Ok(email) = std::env::var("ERROR_EMAIL") {
        if !email.is_empty() {
            config.server.error_email = Some(email);
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
