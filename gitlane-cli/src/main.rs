use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod display;

use commands::{demo, replay, serve};

#[derive(Parser)]
#[command(name = "gitlane")]
#[command(version, about = "In-memory commit graphs laid out in branch lanes", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the repository registry and layouts over HTTP
    Serve {
        /// Port for the API server (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Replay a TOML script of operations and show the resulting graph
    Replay {
        /// Script file with [[step]] entries
        script: PathBuf,

        /// Repository name used for commit ids
        #[arg(short, long, default_value = "replay")]
        name: String,

        /// Print the layout as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Build the feature-branch merge example and show its graph
    Demo {
        /// Print the layout as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::Serve { port, config } => {
            serve::run(port, config).await?;
        }
        Commands::Replay {
            script,
            name,
            json,
            config,
        } => {
            replay::run(script, name, json, config)?;
        }
        Commands::Demo { json } => {
            demo::run(json)?;
        }
    }

    Ok(())
}
