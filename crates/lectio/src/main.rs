mod cli;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Process {
            paths,
            topics,
            words,
            classify,
            pretty,
        } => {
            let options = cli::process::Options {
                topics,
                words,
                classify,
                pretty,
            };
            cli::process::run(config, &paths, &options).await
        }
        Commands::Normalize { path } => cli::normalize::run(config, &path).await,
        Commands::Entities { path, top } => cli::entities::run(config, &path, top).await,
        Commands::Topics {
            path,
            topics,
            words,
        } => cli::topics::run(config, &path, topics, words).await,
        Commands::Config => cli::show_config(config),
    }
}
