//! CLI entry point for agentwire.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// agentwire CLI
#[derive(Parser, Debug)]
#[command(
    name = "agentwire",
    version,
    about = "Translate agent messages, UI turns, and UI streams"
)]
pub struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands. Input is read from stdin.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fold a JSON array of canonical messages into UI messages
    Fold,
    /// Expand a JSON array of UI messages into canonical messages
    Expand,
    /// Encode a JSON array of canonical messages as a chat-completions request
    Encode(EncodeArgs),
    /// Decode a chat-completions response into a canonical message
    Decode,
    /// Aggregate JSON-lines updates into an SSE UI stream
    Aggregate(AggregateArgs),
    /// Replay an SSE UI stream as JSON-lines agent updates
    Replay(ReplayArgs),
}

/// Arguments for `agentwire encode`.
#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// Model id (overrides config)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Temperature (overrides config)
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// JSON file with an array of tool definitions
    #[arg(long)]
    pub tools: Option<PathBuf>,
}

/// Arguments for `agentwire aggregate`.
#[derive(Parser, Debug)]
pub struct AggregateArgs {
    /// Treat input lines as workflow events instead of agent updates
    #[arg(long)]
    pub workflow: bool,
}

/// Arguments for `agentwire replay`.
#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// Author name stamped on every update
    #[arg(long)]
    pub author: Option<String>,

    /// Model id stamped on every update
    #[arg(long)]
    pub model: Option<String>,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
