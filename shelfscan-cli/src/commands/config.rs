//! Config command - inspect configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use shelfscan_sources::SourceRegistry;
use shelfscan_store::{ResetPolicySetting, default_budget_path, default_settings_path};

use super::load_settings;
use crate::output::JsonFormatter;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<ExitCode> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await?,
        ConfigAction::Path => show_paths(cli)?,
    }
    Ok(ExitCode::Success)
}

async fn show_config(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli).await;

    match cli.format {
        OutputFormat::Text => {
            println!("shelfscan Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Sources:");
            for desc in SourceRegistry::all() {
                let overrides = settings.source(desc.id);
                let enabled = overrides.is_none_or(|s| s.enabled);
                let priority = overrides
                    .and_then(|s| s.priority)
                    .unwrap_or(desc.defaults.priority);
                println!(
                    "  • {:<16} priority {priority}{}",
                    desc.display_name,
                    if enabled { "" } else { " (disabled)" }
                );
            }
            println!();
            match settings.reset_policy {
                ResetPolicySetting::Rolling { window_hours } => {
                    println!("Budget window: rolling, {window_hours}h");
                }
                ResetPolicySetting::UtcMidnight => println!("Budget window: UTC midnight"),
            }
            println!("Timeout: {}s", settings.timeout_secs);
            println!("Persist budgets: {}", settings.persist_budgets);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let settings_path = cli.settings.clone().unwrap_or_else(default_settings_path);
    let budget_path = default_budget_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Settings: {}", settings_path.display());
            println!("Budgets:  {}", budget_path.display());
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let paths = serde_json::json!({
                "settings": settings_path.display().to_string(),
                "budgets": budget_path.display().to_string(),
            });
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}
