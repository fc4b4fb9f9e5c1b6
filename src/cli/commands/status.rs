//! Status command - list cached, missing and malformed pairs

use super::build_coordinator;
use crate::catalog::Scope;
use crate::cli::args::{OutputFormat, StatusArgs};
use crate::config::Config;
use crate::coordinator::{CacheState, CacheStatus};
use crate::error::RelcacheResult;
use console::style;

/// Execute the status command
pub async fn execute(args: StatusArgs, config: &Config) -> RelcacheResult<()> {
    let catalog = config.catalog()?;
    let coordinator = build_coordinator(config)?;
    let statuses = coordinator.status(&Scope::full(&catalog)).await?;

    match args.format {
        OutputFormat::Table => print_table(&statuses),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&statuses)?),
        OutputFormat::Plain => print_plain(&statuses),
    }

    Ok(())
}

fn print_table(statuses: &[CacheStatus]) {
    println!(
        "{:<24} {:<10} {:<10} {:<28}",
        style("PROJECT").bold(),
        style("CHANNEL").bold(),
        style("STATE").bold(),
        style("LAST MODIFIED").bold()
    );
    println!("{}", "-".repeat(72));

    for status in statuses {
        let state = match status.state {
            CacheState::Cached => style(status.state.as_str()).green(),
            CacheState::Missing => style(status.state.as_str()).dim(),
            CacheState::Malformed => style(status.state.as_str()).red(),
        };
        let last_modified = status
            .last_modified
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<24} {:<10} {:<10} {:<28}",
            status.project, status.channel, state, last_modified
        );
    }

    let cached = statuses.iter().filter(|s| s.is_cached()).count();
    println!();
    println!("{} of {} pair(s) cached", cached, statuses.len());

    for status in statuses {
        if let Some(detail) = &status.detail {
            println!("{} {}", style("!").red(), detail);
        }
    }
}

fn print_plain(statuses: &[CacheStatus]) {
    for status in statuses {
        println!("{} {} {}", status.project, status.channel, status.state);
    }
}
