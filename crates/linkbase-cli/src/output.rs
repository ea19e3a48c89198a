//! Output formatting utilities

use clap::ValueEnum;
use serde::Serialize;

use linkbase_core::{GraphCounts, Node};

/// Output format for non-query commands. Query commands always print JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Pretty JSON for stdout
pub fn to_json<T: Serialize>(data: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

pub fn format_node(node: &Node, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => to_json(node),
        OutputFormat::Text => Ok(match &node.label {
            Some(label) => format!("{}\t{}\t{}", node.id, node.name, label),
            None => format!("{}\t{}", node.id, node.name),
        }),
    }
}

pub fn format_counts(counts: &GraphCounts, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => to_json(counts),
        OutputFormat::Text => Ok(format!("nodes: {}\nedges: {}", counts.nodes, counts.edges)),
    }
}
