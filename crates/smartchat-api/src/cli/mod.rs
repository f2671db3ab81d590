//! CLI definitions for the `smartchat` binary.

pub mod check;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Websocket chat relay for a local Ollama server, with optional GitHub context.
#[derive(Parser)]
#[command(name = "smartchat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ./smartchat.toml when present).
    #[arg(long, global = true, env = "SMARTCHAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the relay server (default).
    Serve {
        /// Port to listen on.
        #[arg(long, short)]
        port: Option<u16>,

        /// Host to bind to.
        #[arg(long)]
        host: Option<String>,
    },

    /// Check configuration and connectivity to Ollama and GitHub.
    Check,
}

impl Cli {
    /// Tracing filter implied by `-v` / `--quiet`, if either was given.
    pub fn verbosity_filter(&self) -> Option<&'static str> {
        match self.verbose {
            0 if self.quiet => Some("error"),
            0 => None,
            1 => Some("info,smartchat=debug"),
            _ => Some("trace"),
        }
    }
}
