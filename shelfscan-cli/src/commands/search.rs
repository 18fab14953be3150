//! Search command - resolve a product name.

use anyhow::Result;
use clap::Args;
use shelfscan_core::LookupKey;

use super::Session;
use crate::{Cli, ExitCode};

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Product name. Several words may be given without quotes.
    #[arg(required = true, num_args = 1..)]
    pub name: Vec<String>,

    /// Brand to narrow the search.
    #[arg(long, short)]
    pub brand: Option<String>,
}

impl SearchArgs {
    /// Builds the lookup key from the arguments.
    pub fn key(&self) -> Result<LookupKey, shelfscan_core::CoreError> {
        LookupKey::name(&self.name.join(" "), self.brand.as_deref())
    }
}

/// Runs the search command.
pub async fn run(args: &SearchArgs, cli: &Cli) -> Result<ExitCode> {
    let key = args.key()?;
    let session = Session::open(cli).await?;
    session.resolve_and_print(&key, cli).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: SearchArgs,
    }

    #[test]
    fn test_words_are_joined() {
        let harness =
            Harness::try_parse_from(["search", "wonder", "woman", "--brand", "Funko"]).unwrap();
        assert_eq!(
            harness.args.key().unwrap(),
            LookupKey::Name {
                name: "wonder woman".to_string(),
                brand: Some("Funko".to_string()),
            }
        );
    }

    #[test]
    fn test_blank_name_is_invalid() {
        let harness = Harness::try_parse_from(["search", "  "]).unwrap();
        assert!(harness.args.key().is_err());
    }
}
