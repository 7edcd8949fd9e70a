use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use stint_cli::{Cli, Config, app, prompt};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    if !cli.has_operation() {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    let config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.ledger_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create ledger directory")?;
    }

    let mut stdout = std::io::stdout().lock();
    if cli.yes {
        app::run(&cli, &config, &mut prompt::AssumeYes, Local::now(), &mut stdout)
    } else {
        app::run(&cli, &config, &mut prompt::StdinConfirm, Local::now(), &mut stdout)
    }
}
