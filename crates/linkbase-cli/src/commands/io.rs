//! Import/Export commands

use std::io::Write;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use anyhow::Context;
use clap::Args;

use crate::output::to_json;
use crate::AppContext;
use linkbase_core::{GraphStore, WriteBatch};

#[derive(Args)]
pub struct ImportArgs {
    /// Input file: {"nodes": [{"name", "label"}], "edges": [{"source", "target", "label"}]}
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn run_import(args: &ImportArgs, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::info!("Importing from {:?}", args.file);

    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let batch: WriteBatch = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", args.file.display()))?;

    if batch.is_empty() {
        println!("Nothing to import from {:?}", args.file);
        return Ok(());
    }

    let report = ctx.resolver.apply(&batch).await?;
    println!(
        "Imported {} nodes and {} edges from {:?}",
        report.node_ids.len(),
        report.edge_ids.len(),
        args.file
    );
    Ok(())
}

pub async fn run_export(args: &ExportArgs, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::info!("Exporting graph");

    let graph = ctx.store.load_graph().await?;
    let batch = WriteBatch::from_subgraph(&graph);
    tracing::debug!(
        "Exporting {} nodes, {} edges",
        batch.nodes.len(),
        batch.edges.len()
    );
    let content = to_json(&batch)?;

    if let Some(ref path) = args.output {
        // Write with secure permissions (0o600 = owner read/write only)
        #[cfg(unix)]
        {
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)?;
            file.write_all(content.as_bytes())?;
        }
        #[cfg(not(unix))]
        {
            std::fs::write(path, &content)?;
        }
        println!("Exported to {:?}", path);
    } else {
        println!("{}", content);
    }

    Ok(())
}
