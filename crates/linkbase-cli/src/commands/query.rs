//! Read-only graph queries

use clap::Args;

use crate::output::{format_counts, to_json};
use crate::{AppContext, Cli};
use linkbase_core::{GraphStore, GraphView};

#[derive(Args)]
pub struct NeighborhoodArgs {
    /// Center entity name
    pub center: String,

    /// Hops to expand, in either edge direction (config: default_depth)
    #[arg(long)]
    pub depth: Option<u32>,
}

#[derive(Args)]
pub struct PathsArgs {
    /// Start entity name
    pub start: String,

    /// End entity name
    pub end: String,

    /// Longest path, in edges (config: default_max_depth)
    #[arg(short, long)]
    pub max_depth: Option<u32>,
}

pub async fn run_neighborhood(args: &NeighborhoodArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let depth = args.depth.unwrap_or(ctx.config.default_depth);
    let outcome = ctx.engine.neighborhood(&args.center, depth).await?;

    if let Some(hood) = outcome.found() {
        tracing::debug!("Neighborhood stats: {:?}", hood.stats);
    }
    print_view(&GraphView::from_neighborhood(outcome))
}

pub async fn run_paths(args: &PathsArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let max_depth = args.max_depth.unwrap_or(ctx.config.default_max_depth);
    let outcome = ctx.engine.all_paths(&args.start, &args.end, max_depth).await?;

    if let Some(set) = outcome.found() {
        tracing::debug!("Path search stats: {:?}", set.stats);
    }
    print_view(&GraphView::from_paths(outcome))
}

pub async fn run_graph(ctx: &AppContext) -> anyhow::Result<()> {
    let graph = ctx.store.load_graph().await?;
    tracing::info!(
        "Loaded full graph: {} nodes, {} edges",
        graph.nodes.len(),
        graph.edges.len()
    );
    print_view(&GraphView::full(graph))
}

pub async fn run_stats(cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let counts = ctx.store.counts().await?;
    println!("{}", format_counts(&counts, cli.format)?);
    Ok(())
}

pub async fn run_schema(ctx: &AppContext) -> anyhow::Result<()> {
    println!("{}", ctx.store.schema().await?);
    Ok(())
}

fn print_view(view: &GraphView) -> anyhow::Result<()> {
    if let Some(message) = &view.error_message {
        tracing::warn!("{}", message);
    }
    println!("{}", to_json(view)?);
    Ok(())
}
