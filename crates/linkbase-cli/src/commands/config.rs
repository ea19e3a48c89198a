//! `linkbase config` subcommands

use clap::{Args, Subcommand};

use crate::config::{config_file_path, Config};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print one value
    Get {
        /// One of: data_dir, default_depth, default_max_depth, query_timeout_secs, log_file
        key: String,
    },
    /// Change one value and write the file
    Set {
        key: String,
        /// New value (empty clears log_file)
        value: String,
    },
    /// Print every value
    List,
    /// Print the config file location
    Path,
    /// Write a config file holding the defaults
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(args: &ConfigArgs) -> anyhow::Result<()> {
    let path = config_file_path();

    match &args.command {
        ConfigCommands::Get { key } => {
            ensure_known(key)?;
            println!("{}", Config::load().get(key).unwrap_or_default());
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load();
            config.set(key, value)?;
            config.save()?;
            tracing::info!("Wrote {} = {:?} to {}", key, value, path.display());
            println!("{} = {}", key, value);
        }
        ConfigCommands::List => {
            let config = Config::load();
            println!("# {}", path.display());
            for key in Config::keys() {
                match config.get(key) {
                    Some(value) => println!("{} = {}", key, value),
                    None => println!("# {} is unset", key),
                }
            }
        }
        ConfigCommands::Path => println!("{}", path.display()),
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists; pass --force to replace it",
                    path.display()
                );
            }
            Config::default().save()?;
            println!("Wrote default config to {}", path.display());
        }
    }
    Ok(())
}

fn ensure_known(key: &str) -> anyhow::Result<()> {
    if Config::keys().iter().any(|k| *k == key) {
        return Ok(());
    }
    anyhow::bail!(
        "Unknown config key: {}. Available keys: {}",
        key,
        Config::keys().join(", ")
    )
}
