use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lanwake_gateway::commands::{format_device_list, format_probe, format_wake};
use lanwake_gateway::daemon::dispatcher_for;
use lanwake_gateway::devices::{ActionResult, Capabilities, DeviceRegistry, ProbeOutcome};
use lanwake_gateway::{Config, Daemon};

/// Lanwake - permission-gated Wake-on-LAN and ping gateway
#[derive(Parser)]
#[command(name = "lanwake", version, about)]
struct Cli {
    /// Devices file (overrides config)
    #[arg(short, long, env = "LANWAKE_DEVICES")]
    devices: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the devices file and exit
    Check,
    /// List devices a user can see
    Devices {
        /// User ID to search as
        #[arg(short, long)]
        user: String,
        /// Name filter (case-insensitive substring)
        #[arg(default_value = "")]
        query: String,
    },
    /// Send a wake packet as a user
    Wake {
        /// Device ID
        device: String,
        /// User ID to act as
        #[arg(short, long)]
        user: String,
    },
    /// Probe a device as a user
    Probe {
        /// Device ID
        device: String,
        /// User ID to act as
        #[arg(short, long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,lanwake_gateway=info",
        1 => "info,lanwake_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = Config::load()?;
    if let Some(path) = cli.devices {
        config.devices_path = path;
    }
    tracing::debug!(?config, "loaded configuration");

    let Some(cmd) = cli.command else {
        tracing::info!(devices = %config.devices_path.display(), "starting lanwake gateway");
        Daemon::new(config)?.run().await?;
        return Ok(ExitCode::SUCCESS);
    };

    let registry = Arc::new(DeviceRegistry::load(&config.devices_path)?);
    let dispatcher = dispatcher_for(&config, registry.clone());

    let code = match cmd {
        Command::Check => {
            println!(
                "{}: {} device(s) OK",
                config.devices_path.display(),
                registry.snapshot().len()
            );
            ExitCode::SUCCESS
        }
        Command::Devices { user, query } => {
            let choices = dispatcher.search(&query, &user, Capabilities::NONE);
            println!("{}", format_device_list(&choices));
            ExitCode::SUCCESS
        }
        Command::Wake { device, user } => {
            let report = dispatcher.wake(&device, &user, Capabilities::WAKE).await;
            println!("{}", format_wake(&report));
            exit_code(report.result == ActionResult::Success)
        }
        Command::Probe { device, user } => {
            let outcome = dispatcher.probe(&device, &user, Capabilities::PING).await;
            println!("{}", format_probe(&device, &outcome));
            exit_code(matches!(outcome, ProbeOutcome::Reply(ref r) if r.alive))
        }
    };

    Ok(code)
}

const fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
