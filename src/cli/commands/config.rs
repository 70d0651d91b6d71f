//! Config command - show or initialize configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::GoalResult;
use console::style;

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> GoalResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> GoalResult<()> {
    let toml = toml::to_string_pretty(config)?;
    println!("{}", toml);
    Ok(())
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> GoalResult<()> {
    let path = manager.path();

    if path.exists() && !force {
        println!(
            "{} Config already exists at {}",
            style("!").yellow(),
            path.display()
        );
        println!("  Use --force to overwrite");
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    println!(
        "{} Configuration initialized: {}",
        style("✓").green(),
        path.display()
    );

    Ok(())
}
