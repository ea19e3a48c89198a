//! Edge commands

use clap::{Args, Subcommand};

use crate::output::{to_json, OutputFormat};
use crate::{AppContext, Cli};

#[derive(Args)]
pub struct EdgeArgs {
    #[command(subcommand)]
    pub command: EdgeCommands,
}

#[derive(Subcommand)]
pub enum EdgeCommands {
    /// Add a directed edge unless an identical one exists.
    /// Missing endpoint nodes are created without a label.
    Add {
        /// Source entity name
        source: String,
        /// Target entity name
        target: String,
        /// Relationship label (normalized before storage)
        #[arg(short, long)]
        label: Option<String>,
    },
}

pub async fn run(args: &EdgeArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        EdgeCommands::Add {
            source,
            target,
            label,
        } => {
            let id = ctx
                .resolver
                .add_edge_if_not_exists(source, target, label.as_deref())
                .await?;

            match cli.format {
                OutputFormat::Json => println!("{}", to_json(&serde_json::json!({ "edge_id": id }))?),
                OutputFormat::Text => println!("{}", id),
            }
        }
    }
    Ok(())
}
