use clap::{Parser, Subcommand};
use podlog::cli::FetchArgs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "podlog")]
#[command(about = "Paginated, time-ordered logs across all pods of a workload", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    fetch: FetchArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one page of logs as JSON
    Fetch(FetchArgs),
    /// Serve pages over HTTP
    Serve {
        #[arg(long)]
        listen: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the page, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "podlog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = podlog::config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Fetch(args)) => podlog::cli::run_fetch(config, args).await?,
        None => podlog::cli::run_fetch(config, cli.fetch).await?,
        Some(Commands::Serve { listen }) => podlog::cli::run_serve(config, listen).await?,
    }

    Ok(())
}
