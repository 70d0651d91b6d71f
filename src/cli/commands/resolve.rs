//! Resolve command - determine the parse goal of source files

use crate::cli::args::{OutputFormat, ResolveArgs};
use crate::config::Config;
use crate::driver::{Driver, Outcome};
use crate::error::{GoalError, GoalResult};
use crate::goal::{Goal, GoalOrder};
use crate::resolver::GoalResolver;
use console::style;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Execute the resolve command
pub async fn execute(args: ResolveArgs, config: &Config, cache_dir: Option<&Path>) -> GoalResult<()> {
    let mut driver = Driver::from_config(config, cache_dir)?;

    if !args.order.is_empty() {
        driver = driver.with_resolver(GoalResolver::new(GoalOrder::new(&args.order)?));
    }
    if args.no_cache {
        driver = driver.without_cache();
    }

    let driver = Arc::new(driver);
    let results = driver.resolve_all(args.paths, args.goal).await;

    match args.format {
        OutputFormat::Table => print_table(&results),
        OutputFormat::Json => print_json(&results)?,
        OutputFormat::Plain => print_plain(&results),
    }

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    if failed > 0 {
        return Err(GoalError::ResolutionFailed {
            failed,
            total: results.len(),
        });
    }

    Ok(())
}

fn attempts_display(attempts: &[Goal]) -> String {
    attempts
        .iter()
        .map(Goal::as_str)
        .collect::<Vec<_>>()
        .join(" > ")
}

/// One diagnostic line per failure, compiler style
fn print_failure(path: &Path, error: &GoalError) {
    match error {
        GoalError::Syntax {
            goal,
            position,
            message,
            declared,
        } => {
            let goal_label = if *declared {
                format!("{} (declared)", goal)
            } else {
                goal.to_string()
            };
            eprintln!(
                "{}:{}: {} {}: {}",
                path.display(),
                position,
                style("error:").red().bold(),
                goal_label,
                message
            );
        }
        other => eprintln!("{}: {} {}", path.display(), style("error:").red().bold(), other),
    }
}

fn print_table(results: &[(PathBuf, GoalResult<Outcome>)]) {
    println!(
        "{:<40} {:<8} {:<10} {:<9} {:<20}",
        style("PATH").bold(),
        style("GOAL").bold(),
        style("SOURCE").bold(),
        style("CACHE").bold(),
        style("ATTEMPTS").bold()
    );
    println!("{}", "-".repeat(90));

    let mut resolved = 0;
    for (path, result) in results {
        match result {
            Ok(outcome) => {
                let goal = match outcome.goal {
                    Goal::Module => style(outcome.goal.as_str()).cyan(),
                    _ => style(outcome.goal.as_str()).green(),
                };
                println!(
                    "{:<40} {:<8} {:<10} {:<9} {:<20}",
                    path.display(),
                    goal,
                    outcome.source.kind(),
                    outcome.cache,
                    attempts_display(&outcome.attempts)
                );
                resolved += 1;
            }
            Err(e) => print_failure(path, e),
        }
    }

    println!();
    println!("{} of {} file(s) resolved", resolved, results.len());
}

fn print_json(results: &[(PathBuf, GoalResult<Outcome>)]) -> GoalResult<()> {
    #[derive(serde::Serialize)]
    struct ResolveJson {
        path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        goal: Option<Goal>,
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<&'static str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cache: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        attempts: Vec<Goal>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    }

    let json_results: Vec<ResolveJson> = results
        .iter()
        .map(|(path, result)| match result {
            Ok(outcome) => ResolveJson {
                path: path.display().to_string(),
                goal: Some(outcome.goal),
                source: Some(outcome.source.kind()),
                cache: Some(outcome.cache.to_string()),
                attempts: outcome.attempts.clone(),
                error: None,
            },
            Err(e) => ResolveJson {
                path: path.display().to_string(),
                goal: None,
                source: None,
                cache: None,
                attempts: vec![],
                error: Some(e.to_string()),
            },
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json_results)?);
    Ok(())
}

fn print_plain(results: &[(PathBuf, GoalResult<Outcome>)]) {
    for (path, result) in results {
        match result {
            Ok(outcome) => println!("{}\t{}", path.display(), outcome.goal),
            Err(e) => print_failure(path, e),
        }
    }
}
