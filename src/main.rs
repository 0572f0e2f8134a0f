//! agentwire CLI binary entry point.

use agentwire::cli::{commands, Cli};
use agentwire::config::AgentwireConfig;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> agentwire::error::Result<()> {
    let config = match &cli.config {
        Some(path) => AgentwireConfig::load(path)?.apply_env()?,
        None => AgentwireConfig::from_env()?,
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    commands::run(cli.command, &config, stdin, &mut stdout, cancel).await
}
