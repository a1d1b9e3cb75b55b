//! bluechictl: list the units managed by a bluechi controller

use bluechi_rs::{BluechiError, BusKind, BusTarget, BusctlConnection, ClientConfig};
use bluechictl_core::network::tcp_bus_address;
use bluechictl_core::{
    categorize_error, format_bluechi_error, list_units, print_unit_list_simple, validate_glob,
};
use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use std::fs::File;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{EnvFilter, prelude::*};

/// bluechictl: query a bluechi controller
#[derive(Parser, Debug)]
#[command(name = "bluechictl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/bluechictl/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Talk to the user bus instead of the system bus
    #[arg(long)]
    user: bool,

    /// Explicit D-Bus address to connect to
    #[arg(long, conflicts_with = "tcp_host")]
    address: Option<String>,

    /// Reach the bus on a remote host over SSH ([USER@]HOST)
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Connect to a bus served over TCP on this host
    #[arg(long)]
    tcp_host: Option<String>,

    /// Port for --tcp-host
    #[arg(long)]
    tcp_port: Option<u16>,

    /// Method call timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List units on all nodes, or on NODE only
    ListUnits {
        /// Node to query; all nodes when omitted
        node: Option<String>,

        /// Only show units whose id matches this glob
        #[arg(short, long)]
        filter: Option<String>,
    },
}

fn init_logging(cli: &Cli) -> Result<()> {
    let log_level = if cli.debug { Level::DEBUG } else { Level::WARN };
    let env_filter = EnvFilter::from_default_env().add_directive(log_level.into());

    match &cli.log_file {
        Some(path) => {
            let log_file = File::create(path)?;
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(log_file)
                        .with_ansi(false)
                        .with_target(false),
                )
                .with(env_filter)
                .init();
        }
        None => {
            // stdout carries the table, so logs go to stderr
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false),
                )
                .with(env_filter)
                .init();
        }
    }
    Ok(())
}

/// Merge the config file with command-line overrides
fn load_config(cli: &Cli) -> Result<ClientConfig, BluechiError> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load_default()?,
    };

    if cli.user {
        config.bus = BusKind::User;
    }
    if let Some(address) = &cli.address {
        config.address = Some(address.clone());
        config.tcp_host = None;
    }
    if let Some(tcp_host) = &cli.tcp_host {
        config.tcp_host = Some(tcp_host.clone());
        config.address = None;
    }
    if let Some(port) = cli.tcp_port {
        config.tcp_port = port;
    }
    if let Some(host) = &cli.host {
        config.host = Some(host.clone());
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    config.validate()?;
    Ok(config)
}

async fn connect(config: &ClientConfig) -> Result<BusctlConnection, BluechiError> {
    let mut bus = BusctlConnection::from_config(config);
    if let Some(tcp_host) = &config.tcp_host {
        let address = tcp_bus_address(tcp_host, config.tcp_port).await?;
        tracing::debug!("Using bus address {}", address);
        bus = bus.with_target(BusTarget::Address(address));
    }
    Ok(bus)
}

async fn run(cli: &Cli) -> Result<(), BluechiError> {
    let config = load_config(cli)?;
    let bus = connect(&config).await?;

    match &cli.command {
        Command::ListUnits { node, filter } => {
            if let Some(pattern) = filter {
                validate_glob(pattern)?;
            }
            list_units(
                &bus,
                node.as_deref(),
                print_unit_list_simple,
                filter.as_deref(),
            )
            .await
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize error handling
    color_eyre::install()?;

    init_logging(&cli)?;
    tracing::debug!("Starting bluechictl: {:?}", cli.command);

    if let Err(e) = run(&cli).await {
        let category = categorize_error(&e);
        tracing::debug!("{} error: {:?}", category.label(), e);
        if category.exit_code() != 1 {
            eprintln!("{}", format_bluechi_error(&e));
            std::process::exit(category.exit_code());
        }
        return Err(eyre!(format_bluechi_error(&e)));
    }

    Ok(())
}
