//! `shipval` binary entry point.

use clap::Parser;
use shipval_cli::{execute, Cli, EXIT_CONFIG_ERROR};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match execute(cli) {
        Ok((output, code)) => {
            println!("{output}");
            std::process::exit(code);
        }
        Err(e) => {
            tracing::error!(error = %e, "shipval failed");
            eprintln!("Error: {e}");
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    }
}
