//! fairgroupd — the FairGroup daemon.
//!
//! Serves the REST API, or runs a single assignment from a CSV file.
//!
//! # Usage
//!
//! ```text
//! fairgroupd serve --port 8080 --config fairgroup.toml
//! fairgroupd assign --file roster.csv --groups 4 --format json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fairgroup_core::FairGroupConfig;

mod commands;

#[derive(Parser)]
#[command(name = "fairgroupd", about = "FairGroup daemon", version)]
struct Cli {
    /// Path to fairgroup.toml. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve {
        /// Port to listen on (overrides [server].port).
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (overrides [server].bind).
        #[arg(long)]
        bind: Option<String>,
    },
    /// Split a CSV roster into groups and print the result.
    Assign {
        /// CSV file with one `name,grade` record per line.
        #[arg(short, long)]
        file: PathBuf,

        /// Number of groups.
        #[arg(short, long)]
        groups: i64,

        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,fairgroupd=debug,fairgroup=debug"))?,
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => FairGroupConfig::from_file(path)?,
        None => FairGroupConfig::default(),
    };

    match cli.command {
        Command::Serve { port, bind } => commands::serve::run(config, port, bind).await,
        Command::Assign {
            file,
            groups,
            format,
        } => commands::assign::run(&config, &file, groups, &format),
    }
}
