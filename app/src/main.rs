#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;

use clap::{Parser, Subcommand};
use slackqa_config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

use command::{
    AskInput, AskStrategy, ChatInput, ChatStrategy, CommandStrategy, InfoStrategy, InitStrategy,
    ServeInput, ServeStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "slackqa")]
#[command(about = "Answer questions from Slack channel history", long_about = None)]
struct Cli {
    /// Verbose logging (same as DEBUG_MODE=true)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question
    Ask {
        /// The question
        #[arg(short, long)]
        query: String,

        /// Channel ID to search (defaults to slack.default_channel)
        #[arg(short, long)]
        channel: Option<String>,

        /// Only consider messages from this user ID
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Ask questions interactively
    Chat {
        /// Channel ID to search (defaults to slack.default_channel)
        #[arg(short, long)]
        channel: Option<String>,
    },
    /// Serve the Slack Events API endpoint
    Serve {
        /// Port to listen on (overrides server.port and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show the effective configuration
    Info,
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Load configuration, then start logging at the level it asks for.
fn load_config(cli_debug: bool) -> anyhow::Result<Config> {
    let config = Config::load()?;
    init_tracing(cli_debug || config.debug);
    info!("Using config at {}", Config::config_path()?.display());
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ask {
            query,
            channel,
            user,
        } => {
            let config = load_config(cli.debug)?;
            AskStrategy
                .execute(AskInput {
                    config,
                    query,
                    channel,
                    user,
                })
                .await
        }
        Commands::Chat { channel } => {
            let config = load_config(cli.debug)?;
            ChatStrategy.execute(ChatInput { config, channel }).await
        }
        Commands::Serve { port } => {
            let config = load_config(cli.debug)?;
            ServeStrategy.execute(ServeInput { config, port }).await
        }
        Commands::Info => {
            let config = load_config(cli.debug)?;
            InfoStrategy.execute(config).await
        }
        Commands::Init => {
            init_tracing(cli.debug);
            InitStrategy.execute(()).await
        }
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
