//! Sources command - list registered sources.

use anyhow::Result;
use shelfscan_fetch::SourceInfo;

use super::Session;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Runs the sources command.
pub async fn run(cli: &Cli) -> Result<ExitCode> {
    let session = Session::open(cli).await?;
    let ctx = session.resolver.context();
    let infos: Vec<SourceInfo> = session
        .resolver
        .source_info()
        .into_iter()
        .filter(|info| ctx.allows_source(&info.id))
        .collect();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_sources_header());
            for info in &infos {
                println!("{}", formatter.format_source_line(info));
            }
            if infos.iter().all(|i| !i.configured) {
                println!();
                println!("No source is configured. Set an API key in the environment.");
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_sources(&infos)?);
        }
    }

    Ok(ExitCode::Success)
}
