//! relcache - release manifest cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use relcache::cli::{commands, Cli, Commands};
use relcache::config::ConfigManager;
use relcache::error::RelcacheResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> RelcacheResult<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        commands::completions(shell);
        return Ok(());
    }

    let manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let mut config = manager.load().await?;
    if let Some(root) = cli.cache_root {
        config.cache.root = root;
    }

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("relcache=warn"),
        1 => EnvFilter::new("relcache=info"),
        _ => EnvFilter::new("relcache=debug"),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if config.general.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.without_time().init();
    }

    debug!("Using cache root {}", config.cache.root.display());

    match cli.command {
        Commands::Completions { .. } => unreachable!("Completions handled above"),
        Commands::Update(args) => commands::update(args, &config).await,
        Commands::Show(args) => commands::show(args, &config).await,
        Commands::LastModified(args) => commands::last_modified(args, &config).await,
        Commands::Status(args) => commands::status(args, &config).await,
        Commands::Init => commands::init(&config).await,
        Commands::Config(args) => commands::config(args, &manager, &config).await,
    }
}
