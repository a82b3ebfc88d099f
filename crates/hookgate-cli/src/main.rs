mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, serve::ServeArgs, sign::SignArgs};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hookgate",
    about = "GitHub push webhook gate: verify origin and signature, then run deploy actions",
    version,
    propagate_version = true
)]
struct Cli {
    /// Repository store (default: repos.json)
    #[arg(long, global = true, env = "GITHUB_WEBHOOK_REPOS_JSON")]
    repos: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Verbose logging and detailed rejection bodies (also DEBUG=true)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the webhook endpoint
    Serve(ServeArgs),

    /// Inspect the repository store
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Print the signature headers GitHub would send for a payload
    Sign(SignArgs),
}

fn main() {
    let cli = Cli::parse();
    let debug = cli.debug || cmd::debug_from_env();

    let default_level = if debug {
        tracing::Level::DEBUG
    } else {
        match &cli.command {
            Commands::Serve(_) => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let repos = hookgate_core::config::repos_path(cli.repos.as_deref());

    let result = match cli.command {
        Commands::Serve(args) => cmd::serve::run(repos, args, debug),
        Commands::Config { subcommand } => cmd::config::run(&repos, subcommand, cli.json),
        Commands::Sign(args) => cmd::sign::run(args, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
