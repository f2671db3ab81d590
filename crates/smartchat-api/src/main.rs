//! Smart Chatbot relay server entry point.
//!
//! Binary name: `smartchat`
//!
//! Loads configuration, installs tracing, then either runs the environment
//! check or starts the websocket relay server.

mod cli;
mod http;
mod state;

use clap::Parser;

use cli::{Cli, Commands};
use smartchat_infra::config::load_config;
use smartchat_types::config::RelayConfig;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = load_config(cli.config.as_deref()).await;
    let mut config = loaded.config;

    if let Some(Commands::Serve { port, host }) = &cli.command {
        if let Some(port) = port {
            config.port = *port;
        }
        if let Some(host) = host {
            config.host = host.clone();
        }
    }

    let filter = match cli.verbosity_filter() {
        Some(filter) => filter.to_string(),
        None if config.debug => format!("{},smartchat=debug", config.log_level),
        None => config.log_level.clone(),
    };
    smartchat_observe::tracing_setup::init_tracing(&filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    for warning in &loaded.warnings {
        tracing::warn!("{warning}");
    }

    let result = run(cli.command, config).await;
    smartchat_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(command: Option<Commands>, config: RelayConfig) -> anyhow::Result<()> {
    match command.unwrap_or(Commands::Serve {
        port: None,
        host: None,
    }) {
        Commands::Check => {
            let state = AppState::init(config)?;
            if !cli::check::run_check(&state).await? {
                anyhow::bail!("environment check failed");
            }
        }

        Commands::Serve { .. } => {
            let problems = config.validate();
            if !problems.is_empty() {
                for problem in &problems {
                    eprintln!("  {} {problem}", console::style("✗").red().bold());
                }
                anyhow::bail!("invalid configuration");
            }

            let addr = config.bind_address();
            let state = AppState::init(config)?;
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!();
            println!(
                "  {} Smart Chatbot listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!(
                "  {} {}",
                console::style("Ollama:").dim(),
                state.ollama.base_url()
            );
            println!(
                "  {} {}",
                console::style("GitHub:").dim(),
                if state.config.is_github_enabled() {
                    "configurado"
                } else {
                    "no configurado"
                }
            );
            println!();
            println!(
                "  {}",
                console::style("Press Ctrl+C to stop").dim()
            );

            tracing::info!(%addr, "Relay server started");
            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
