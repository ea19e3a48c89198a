//! Node commands

use clap::{Args, Subcommand};

use crate::output::format_node;
use crate::{AppContext, Cli};
use linkbase_core::GraphStore;

#[derive(Args)]
pub struct NodeArgs {
    #[command(subcommand)]
    pub command: NodeCommands,
}

#[derive(Subcommand)]
pub enum NodeCommands {
    /// Resolve a name to a node, creating it if needed
    Add {
        /// Entity name (case and surrounding whitespace are ignored)
        name: String,
        /// Node label; replaces the stored label when different
        #[arg(short, long)]
        label: Option<String>,
    },
    /// Look up a node by name
    Get {
        /// Entity name
        name: String,
    },
}

pub async fn run(args: &NodeArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        NodeCommands::Add { name, label } => {
            let id = ctx
                .resolver
                .get_or_create_node(name, label.as_deref())
                .await?;
            let node = ctx
                .store
                .nodes_by_ids(&[id])
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| anyhow::anyhow!("Node {} vanished after write", id))?;
            println!("{}", format_node(&node, cli.format)?);
        }
        NodeCommands::Get { name } => match ctx.resolver.find_node(name).await? {
            Some(node) => println!("{}", format_node(&node, cli.format)?),
            None => anyhow::bail!("Node '{}' not found", name.trim()),
        },
    }
    Ok(())
}
