//! `ranktab` binary — cluster rank-table generation.
//!
//! ```bash
//! # Discover two hosts with password auth and write rank_table_file.json
//! RUST_LOG=info ranktab generate \
//!     --nodes 10.0.0.1,10.0.0.2 --username root --password secret
//!
//! # Key auth, tolerate unreachable hosts, custom output path
//! ranktab generate --nodes 10.0.0.1,10.0.0.2 --username root \
//!     --use-key --key-path ~/.ssh/id_cluster \
//!     --skip-unreachable --output /tmp/rank_table.json
//!
//! # Patch a service config against the generated topology
//! ranktab apply --config-path conf/config.json --container-ip 10.0.0.1 \
//!     --model-name qwen --model-path /models/qwen --world-size 16 \
//!     --device-ids '[0,1,2,3,4,5,6,7]'
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ranktab_discovery::RankTableBuilder;
use ranktab_types::config::{
    AuthMethod, Credentials, DiscoveryConfig, FailurePolicy, DEFAULT_DEVICES_PER_HOST,
    DEFAULT_DEVICE_QUERY, DEFAULT_SSH_PORT,
};
use ranktab_types::host::HostAddress;

mod apply;
mod output;
mod prompt;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name    = "ranktab",
    version = env!("CARGO_PKG_VERSION"),
    about   = "Discover accelerator cluster topology and emit a rank table"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Discover every host and write the rank-table descriptor.
    Generate(GenerateArgs),

    /// Patch a service configuration file in place (with a backup).
    Apply(apply::ApplyArgs),
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Comma-separated IPv4 host addresses, in rank-assignment order.
    #[arg(long, value_delimiter = ',', required_unless_present = "interactive")]
    nodes: Vec<String>,

    /// SSH username for remote hosts.
    #[arg(long, required_unless_present = "interactive")]
    username: Option<String>,

    /// Authenticate with a private key instead of a password.
    #[arg(long)]
    use_key: bool,

    /// Private key path; defaults to the conventional ~/.ssh keys.
    #[arg(long)]
    key_path: Option<PathBuf>,

    /// SSH password (required unless --use-key is given).
    #[arg(long)]
    password: Option<String>,

    /// SSH port.
    #[arg(long, default_value_t = DEFAULT_SSH_PORT)]
    port: u16,

    /// Accelerator devices expected on every host.
    #[arg(long, default_value_t = DEFAULT_DEVICES_PER_HOST)]
    devices_per_host: u32,

    /// Per-slot device address query; `{slot}` is replaced by the slot index.
    #[arg(long, default_value = DEFAULT_DEVICE_QUERY)]
    query_command: String,

    /// Skip hosts that fail instead of aborting the whole run.
    #[arg(long)]
    skip_unreachable: bool,

    /// Require remote host keys to match known_hosts.
    #[arg(long)]
    strict_host_key: bool,

    /// Session establishment timeout in seconds.
    #[arg(long, default_value_t = 30)]
    connect_timeout: u64,

    /// Where to write the descriptor.
    #[arg(long, default_value = "rank_table_file.json")]
    output: PathBuf,

    /// Collect hosts and credentials interactively instead of from flags.
    #[arg(long)]
    interactive: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Default log level: INFO. Override with RUST_LOG=ranktab_discovery=debug etc.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => run_generate(args).await,
        Command::Apply(args)    => apply::run(args),
    }
}

// ── Generate ──────────────────────────────────────────────────────────────────

async fn run_generate(args: GenerateArgs) -> Result<()> {
    let config = discovery_config(&args)?;
    info!(
        hosts = config.hosts.len(),
        devices_per_host = config.devices_per_host,
        policy = ?config.failure_policy,
        "starting topology discovery"
    );

    let builder = RankTableBuilder::from_config(config)?;
    let table = match builder.build().await {
        Ok(table) => table,
        Err(e) => {
            error!(%e, "rank table generation failed — no descriptor written");
            return Err(e.into());
        }
    };

    output::write_rank_table(&args.output, &table)?;
    info!(
        path = %args.output.display(),
        servers = %table.server_count,
        ranks = table.total_ranks(),
        "rank table generated"
    );
    Ok(())
}

/// Translate CLI flags (or an interactive session) into a validated
/// [`DiscoveryConfig`].
fn discovery_config(args: &GenerateArgs) -> Result<DiscoveryConfig> {
    let (hosts, credentials) = if args.interactive {
        let setup = prompt::collect_setup()?;
        (setup.hosts, setup.credentials)
    } else {
        let hosts = args
            .nodes
            .iter()
            .map(|n| n.trim().parse::<HostAddress>())
            .collect::<Result<Vec<_>, _>>()
            .context("invalid --nodes entry")?;
        let auth = if args.use_key {
            AuthMethod::Key { path: args.key_path.clone() }
        } else {
            AuthMethod::Password {
                password: args.password.clone().unwrap_or_default(),
            }
        };
        let username = args.username.clone().unwrap_or_default();
        (hosts, Credentials { username, auth })
    };

    let mut config = DiscoveryConfig::new(hosts, credentials);
    config.port = args.port;
    config.devices_per_host = args.devices_per_host;
    config.device_query_command = args.query_command.clone();
    config.failure_policy = if args.skip_unreachable {
        FailurePolicy::SkipAndContinue
    } else {
        FailurePolicy::AbortAll
    };
    config.strict_host_verification = args.strict_host_key;
    config.connect_timeout = std::time::Duration::from_secs(args.connect_timeout);
    config.validate()?;
    Ok(config)
}
