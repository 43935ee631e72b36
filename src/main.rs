use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;

use instabot_trigger::config::{config, TriggerConfig};
use instabot_trigger::device::ClientHints;
use instabot_trigger::observability::relay_metrics;
use instabot_trigger::server::TriggerServer;
use instabot_trigger::telemetry::{init_telemetry, shutdown_telemetry};
use instabot_trigger::trigger::{TriggerOutcome, TriggerService};

#[derive(Parser)]
#[command(name = "instabot-trigger")]
#[command(about = "HTTP relay that gates GitHub Actions workflow triggers")]
#[command(long_about = "instabot-trigger answers any inbound HTTP request by checking whether the \
                       configured workflow is already running, dispatching a new run when it is not, \
                       and confirming the run actually started before rendering a status page.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP relay server (also the default with no subcommand)
    Serve {
        /// Bind host, overriding server.host from configuration
        #[arg(long, help = "Bind host, overriding server.host")]
        host: Option<String>,
        /// Bind port, overriding server.port from configuration
        #[arg(long, help = "Bind port, overriding server.port")]
        port: Option<u16>,
    },
    /// One-shot status check: report whether the workflow is active or recent
    Check,
    /// Run the full trigger sequence once from the terminal
    Trigger {
        /// Dispatch unconditionally instead of checking first
        #[arg(long, help = "Skip the initial status check and dispatch unconditionally")]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default behavior: run the relay server with configured bind address
        None => tokio::runtime::Runtime::new()?.block_on(async { serve_command(None, None).await }),
        Some(Commands::Serve { host, port }) => {
            tokio::runtime::Runtime::new()?.block_on(async { serve_command(host, port).await })
        }
        Some(Commands::Check) => {
            tokio::runtime::Runtime::new()?.block_on(async { check_command().await })
        }
        Some(Commands::Trigger { force }) => {
            tokio::runtime::Runtime::new()?.block_on(async { trigger_command(force).await })
        }
    }
}

fn load_config_and_telemetry() -> Result<&'static TriggerConfig> {
    let config = config()?;
    init_telemetry(&config.observability.log_level)?;
    Ok(config)
}

async fn serve_command(host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = load_config_and_telemetry()?;
    let service = TriggerService::from_config(config)?;

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let bind_address: SocketAddr = format!("{host}:{port}").parse()?;

    let server = TriggerServer::new(bind_address, service).start().await?;

    wait_for_shutdown_signal().await;

    server.stop().await?;
    relay_metrics().log_stats();
    shutdown_telemetry();
    Ok(())
}

async fn check_command() -> Result<()> {
    let config = load_config_and_telemetry()?;
    let service = TriggerService::from_config(config)?;

    if service.workflow_active().await {
        println!(
            "Workflow '{}' is running or recently completed",
            config.github.workflow_name
        );
    } else {
        println!(
            "No active or recent '{}' runs found",
            config.github.workflow_name
        );
    }
    Ok(())
}

async fn trigger_command(force: bool) -> Result<()> {
    let config = load_config_and_telemetry()?;
    let service = TriggerService::from_config(config)?;

    let outcome = if force {
        service.run_forced(ClientHints::default()).await?
    } else {
        service.run(ClientHints::default()).await?
    };

    match outcome {
        TriggerOutcome::AlreadyActive => {
            println!("Workflow is already running or recently completed")
        }
        TriggerOutcome::Started => println!("Workflow dispatched and confirmed started"),
    }
    Ok(())
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(error = %error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
