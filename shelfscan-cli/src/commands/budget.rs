//! Budget command - show or reset rate budgets.

use anyhow::Result;
use clap::{Args, Subcommand};
use shelfscan_core::{BudgetEntry, OperationKind};
use tracing::warn;

use super::Session;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the budget command.
#[derive(Args)]
pub struct BudgetArgs {
    #[command(subcommand)]
    pub action: Option<BudgetAction>,
}

/// Budget subcommands.
#[derive(Subcommand)]
pub enum BudgetAction {
    /// Show remaining budgets (default).
    Show,

    /// Restore full budgets. Narrow with the global `--source` and `--kind`.
    Reset {
        /// Only reset this operation kind (lookup or search).
        #[arg(long, short)]
        kind: Option<OperationKind>,
    },
}

/// Runs the budget command.
pub async fn run(args: &BudgetArgs, cli: &Cli) -> Result<ExitCode> {
    let session = Session::open(cli).await?;
    match &args.action {
        None | Some(BudgetAction::Show) => show(&session, cli)?,
        Some(BudgetAction::Reset { kind }) => reset(&session, *kind, cli).await?,
    }
    Ok(ExitCode::Success)
}

/// Budget entries for the sources the session admits.
fn selected_entries(session: &Session) -> Vec<BudgetEntry> {
    let ctx = session.resolver.context();
    session
        .resolver
        .tracker()
        .snapshot()
        .entries
        .into_iter()
        .filter(|e| ctx.allows_source(&e.source))
        .collect()
}

fn show(session: &Session, cli: &Cli) -> Result<()> {
    let entries = selected_entries(session);
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            for entry in &entries {
                println!(
                    "{}",
                    formatter.format_budget_line(&entry.source, entry.kind, &entry.budget)
                );
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_budgets(&entries)?);
        }
    }
    Ok(())
}

async fn reset(session: &Session, kind: Option<OperationKind>, cli: &Cli) -> Result<()> {
    let tracker = session.resolver.tracker();
    let ctx = session.resolver.context();
    let kinds: Vec<OperationKind> = kind.map_or_else(|| OperationKind::ALL.to_vec(), |k| vec![k]);

    let mut reset = Vec::new();
    for adapter in session.resolver.adapters() {
        if !ctx.allows_source(adapter.id()) {
            continue;
        }
        for kind in &kinds {
            tracker.reset(adapter.id(), *kind);
            reset.push((adapter.id().to_string(), *kind));
        }
    }

    if session.persists_budgets() {
        session.finish().await;
    } else {
        warn!("Budgets are not persisted; the reset only lasted for this run");
    }

    match cli.format {
        OutputFormat::Text => {
            for (source, kind) in &reset {
                println!("Reset {kind} budget for {source}");
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_resets(&reset)?);
        }
    }
    Ok(())
}
