//! Alertcfg - Transactional configuration manager for notification routing.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use alertcfg::cli::output;
use alertcfg::cli::{execute, Cli};
use alertcfg::core::constants;

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(constants::LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("alertcfg=debug")
        } else {
            EnvFilter::new("alertcfg=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    if let Err(e) = execute(cli.command, &cli.settings) {
        output::error(&e.to_string());
        if let Some(hint) = output::suggestion(&e) {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
