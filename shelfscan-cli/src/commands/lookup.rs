//! Lookup command - resolve a product code.

use anyhow::Result;
use clap::Args;
use shelfscan_core::LookupKey;

use super::Session;
use crate::{Cli, ExitCode};

/// Arguments for the lookup command.
#[derive(Args)]
pub struct LookupArgs {
    /// UPC, EAN or GTIN. Spaces and dashes are ignored.
    pub code: String,
}

/// Runs the lookup command.
pub async fn run(args: &LookupArgs, cli: &Cli) -> Result<ExitCode> {
    let key = LookupKey::code(&args.code)?;
    let session = Session::open(cli).await?;
    session.resolve_and_print(&key, cli).await
}
