//! BDR assistant entry point.
//!
//! Binary name: `bdr`
//!
//! Parses CLI arguments, loads configuration, then either starts the webhook
//! server or runs one of the offline commands.

mod cli;
mod http;
mod state;

use std::time::Duration;

use clap::Parser;

use bdr_core::dispatch::log_outcomes;
use bdr_infra::config::load_config;
use bdr_infra::secret::Credentials;
use bdr_observe::{TracingOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The server logs at info by default; offline commands stay quiet.
    let serving = matches!(cli.command, Commands::Serve { .. });
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 if serving => "info",
        0 => "warn",
        1 => "info,bdr_core=debug,bdr_infra=debug,bdr_api=debug,bdr::outcome=debug",
        _ => "trace",
    };
    let options = TracingOptions::new(filter)
        .json(cli.log_json)
        .otel(cli.otel);
    init_tracing(&options).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let mut config = load_config(&cli.config).await?;

    let result = match cli.command {
        Commands::Serve {
            port,
            host,
            dry_run,
        } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            config.dispatch.dry_run |= dry_run;
            serve(config, cli.quiet || cli.json).await
        }

        Commands::Route { file } => cli::route::route_file(&file, &config.rules, cli.json).await,

        Commands::Rules => cli::rules::print_rules(&config.rules, cli.json),
    };

    shutdown_tracing();
    result
}

async fn serve(config: bdr_types::config::AppConfig, quiet: bool) -> anyhow::Result<()> {
    let credentials = Credentials::from_env();
    tracing::debug!(?credentials, "resolved credentials");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::init(config, &credentials)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "webhook server listening");

    if !quiet {
        println!(
            "  {} BDR assistant listening on {}",
            console::style("⚡").bold(),
            console::style(format!("http://{addr}")).cyan()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }

    let outcome_log = tokio::spawn(log_outcomes(state.dispatcher.outcomes().subscribe()));
    let router = http::router::build_router(state.clone());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The listener is closed; let background workflows finish.
    let grace = state.shutdown_grace();
    let in_flight = state.dispatcher.in_flight();
    if in_flight > 0 && !quiet {
        println!("\n  Waiting up to {}s for {in_flight} workflow(s)...", grace.as_secs());
    }
    let drained = state.dispatcher.shutdown(grace).await;
    if !drained {
        tracing::warn!(
            abandoned = state.dispatcher.in_flight(),
            "workflows still running at exit"
        );
    }

    // Dropping the last dispatcher handle closes the outcome bus.
    drop(state);
    if drained {
        let _ = tokio::time::timeout(Duration::from_secs(1), outcome_log).await;
    }

    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
///
/// A signal handler that cannot be installed never fires; the other one
/// still can.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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

    tracing::info!("shutdown signal received");
}
