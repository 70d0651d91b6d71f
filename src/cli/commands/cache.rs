//! Cache command - manage the goal cache

use crate::cache::{CacheRecord, GoalCache};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::{Config, ConfigManager};
use crate::error::{GoalError, GoalResult};
use crate::goal::Goal;
use crate::source::canonical_key_path;
use console::style;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config, cache_dir: Option<&Path>) -> GoalResult<()> {
    let cache = GoalCache::new(ConfigManager::cache_dir(config, cache_dir));

    match args.action {
        CacheAction::List { format } => list_records(&cache, format).await,
        CacheAction::Remove { path } => remove_record(&cache, &path).await,
        CacheAction::Clear { yes } => clear_records(&cache, yes).await,
        CacheAction::Path => {
            println!("{}", cache.dir().display());
            Ok(())
        }
    }
}

/// List all cached goal records
async fn list_records(cache: &GoalCache, format: OutputFormat) -> GoalResult<()> {
    let records = cache.list().await?;

    if records.is_empty() {
        match format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => println!("No cached goals."),
        }
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_record_table(&records),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Plain => {
            for record in &records {
                println!("{}\t{}", record.key, record.goal);
            }
        }
    }

    Ok(())
}

fn print_record_table(records: &[CacheRecord]) {
    println!(
        "{:<50} {:<8} {:<20}",
        style("SOURCE").bold(),
        style("GOAL").bold(),
        style("STORED").bold()
    );
    println!("{}", "-".repeat(80));

    for record in records {
        let goal = match record.goal {
            Goal::Module => style(record.goal.as_str()).cyan(),
            _ => style(record.goal.as_str()).green(),
        };
        let stored = record.stored_at.format("%Y-%m-%d %H:%M").to_string();

        println!("{:<50} {:<8} {:<20}", record.key, goal, stored);
    }

    println!();
    println!("Total: {} record(s)", records.len());
}

/// Remove the record for one source file
async fn remove_record(cache: &GoalCache, path: &Path) -> GoalResult<()> {
    // A deleted source still has a record under its last canonical path
    let key = match canonical_key_path(path).await {
        Ok(canonical) => canonical,
        Err(GoalError::PathNotFound(_)) => absolute(path)?,
        Err(e) => return Err(e),
    };
    let key = key.to_string_lossy();

    if cache.remove(&key).await? {
        println!("{} removed cache record for {}", style("✓").green(), key);
    } else {
        println!("No cache record for {}", key);
    }

    Ok(())
}

fn absolute(path: &Path) -> GoalResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd =
        std::env::current_dir().map_err(|e| GoalError::io("getting current directory", e))?;
    Ok(cwd.join(path))
}

/// Clear all records
async fn clear_records(cache: &GoalCache, skip_confirm: bool) -> GoalResult<()> {
    let records = cache.list().await?;

    if records.is_empty() {
        println!("No cached goals to clear.");
        return Ok(());
    }

    if !skip_confirm {
        print!("This will remove {} cache record(s). Are you sure? [y/N] ", records.len());
        let _ = io::stdout().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            println!("Failed to read input, aborting.");
            return Ok(());
        }

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let removed = cache.clear().await?;
    println!("{} cleared {} record(s)", style("✓").green(), removed);

    Ok(())
}
