//! Linkbase CLI - Command line interface for the entity graph

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{completions, edge, io, node, query};
use config::Config;
use linkbase_core::{GraphStore, Resolver, TraversalEngine};
use linkbase_storage::SqliteStore;
use output::OutputFormat;

/// Database file name inside the data directory
pub const DB_FILE: &str = "linkbase.db";

#[derive(Parser)]
#[command(name = "linkbase")]
#[command(author, version, about = "Entity graph store with neighborhood and path queries")]
pub struct Cli {
    /// Data directory
    #[arg(short, long, global = true, env = "LINKBASE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Database file (overrides --data-dir)
    #[arg(long, global = true, env = "LINKBASE_DB")]
    pub db: Option<PathBuf>,

    /// Also append logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Output format for non-query commands
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Get the database path
    pub fn db_path(&self, config: &Config) -> PathBuf {
        if let Some(db) = &self.db {
            return db.clone();
        }
        self.data_dir
            .clone()
            .unwrap_or_else(|| config.data_dir.clone())
            .join(DB_FILE)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or look up nodes
    Node(node::NodeArgs),
    /// Create edges
    Edge(edge::EdgeArgs),
    /// Nodes and edges within N hops of a node
    Neighborhood(query::NeighborhoodArgs),
    /// All simple paths between two nodes
    Paths(query::PathsArgs),
    /// Dump the whole graph
    Graph,
    /// Node and edge counts
    Stats,
    /// Print the database schema
    Schema,
    /// Import nodes and edges from a JSON file
    Import(io::ImportArgs),
    /// Export the graph as JSON
    Export(io::ExportArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with storage backend
pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub resolver: Resolver<SqliteStore>,
    pub engine: TraversalEngine<SqliteStore>,
    pub config: Config,
}

impl AppContext {
    pub async fn new(cli: &Cli, config: Config) -> anyhow::Result<Self> {
        let db_path = cli.db_path(&config);
        tracing::debug!("Using database at: {:?}", db_path);

        let store = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("opening database {}", db_path.display()))?,
        );
        store.initialize().await?;

        let mut engine = TraversalEngine::new(store.clone());
        if let Some(timeout) = config.query_timeout() {
            engine = engine.with_timeout(timeout);
        }

        Ok(Self {
            resolver: Resolver::new(store.clone()),
            engine,
            store,
            config,
        })
    }
}

fn init_logging(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let file_layer = match cli.log_file.as_ref().or(config.log_file.as_ref()) {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load();

    init_logging(&cli, &config)?;
    tracing::debug!("Starting linkbase CLI");

    // Commands that do not touch the database
    match &cli.command {
        Commands::Config(args) => return commands::config::run(args).await,
        Commands::Completions(args) => return completions::run(args),
        _ => {}
    }

    let ctx = AppContext::new(&cli, config).await?;

    let result = match &cli.command {
        Commands::Node(args) => node::run(args, &cli, &ctx).await,
        Commands::Edge(args) => edge::run(args, &cli, &ctx).await,
        Commands::Neighborhood(args) => query::run_neighborhood(args, &ctx).await,
        Commands::Paths(args) => query::run_paths(args, &ctx).await,
        Commands::Graph => query::run_graph(&ctx).await,
        Commands::Stats => query::run_stats(&cli, &ctx).await,
        Commands::Schema => query::run_schema(&ctx).await,
        Commands::Import(args) => io::run_import(args, &ctx).await,
        Commands::Export(args) => io::run_export(args, &ctx).await,
        Commands::Config(_) | Commands::Completions(_) => Ok(()),
    };

    let closed = ctx.store.close().await;
    finish(result, closed)
}

/// The command's own error wins over a failure to close the store
fn finish(result: anyhow::Result<()>, closed: linkbase_core::Result<()>) -> anyhow::Result<()> {
    match (result, closed) {
        (Err(e), Err(close_err)) => {
            tracing::warn!("Failed to close store: {}", close_err);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), closed) => Ok(closed?),
    }
}
