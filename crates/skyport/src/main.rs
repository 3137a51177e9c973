mod commands;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use skyport_api::HttpControlPlane;
use skyport_cloud::{Diagnostics, OperationContext};
use skyport_provider::{Provider, Settings};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "skyport", version)]
#[command(
    about = "Manage Skyport control plane resources from declarative JSON state",
    long_about = None
)]
struct Cli {
    /// Config file (default: ./skyport.yaml, ./.skyport.yaml, ~/.config/skyport/config.yaml)
    #[arg(long, global = true, env = "SKYPORT_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Give up after this many seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported resource types
    Resources,
    #[command(flatten)]
    Lifecycle(LifecycleCommand),
}

#[derive(Subcommand)]
pub(crate) enum LifecycleCommand {
    /// Create a resource from its planned state
    Create {
        /// Resource type, e.g. skyport_container
        resource_type: String,
        /// Planned state as a JSON file ("-" for stdin)
        state: PathBuf,
    },
    /// Refresh a resource's state from the control plane
    Read {
        resource_type: String,
        /// Current state as a JSON file ("-" for stdin)
        state: PathBuf,
    },
    /// Apply the difference between two states
    Update {
        resource_type: String,
        /// Prior state as a JSON file
        prior: PathBuf,
        /// Planned state as a JSON file ("-" for stdin)
        planned: PathBuf,
    },
    /// Delete a resource
    Delete {
        resource_type: String,
        /// Current state as a JSON file ("-" for stdin)
        state: PathBuf,
    },
    /// Adopt an existing resource by its identifier
    Import {
        resource_type: String,
        /// e.g. prod/web, or prod/pg/app for databases
        id: String,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<skyport_config::ProviderConfig> {
    let config = match path {
        Some(path) => {
            let mut config = skyport_config::load_from(path)?;
            config.apply_env();
            config
        }
        None => skyport_config::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the resulting state, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let command = match cli.command {
        Commands::Resources => {
            commands::list_resources();
            return Ok(());
        }
        Commands::Lifecycle(command) => command,
    };

    let config = load_config(cli.config.as_deref())?;
    let client = HttpControlPlane::new(config.require_endpoint()?, config.token.clone())?;
    tracing::debug!(endpoint = client.base_url(), "using control plane");
    let provider = Provider::new(Arc::new(client), Settings::from_config(&config));

    let ctx = match cli.timeout {
        Some(secs) => OperationContext::with_deadline_in(Duration::from_secs(secs)),
        None => OperationContext::background(),
    };
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", "Interrupted, cancelling...".yellow());
            interrupt.cancel();
        }
    });

    let mut diags = Diagnostics::new();
    let state = commands::run(&provider, &ctx, &mut diags, command).await?;

    output::print_diagnostics(&diags);
    if let Some(state) = state {
        println!("{}", serde_json::to_string_pretty(&state)?);
    }

    if diags.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
