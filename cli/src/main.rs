mod cli;
mod commands;

use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Log to stderr; `-v` raises the default level, `RUST_LOG` replaces it.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match &cli.command {
        Commands::Run(args) => commands::run::run(&cli, args),
        Commands::Summary(args) => commands::summary::run(&cli, args),
        Commands::Render(args) => commands::render::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
