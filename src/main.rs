//! Registration Flow CLI
//!
//! Demo driver for the commit-reveal registration client. Runs against the
//! in-process simulated registrar so the full protocol can be exercised
//! without a node.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use registrar_flow::{
    artifact::ContractArtifact,
    build_commitment_request, compute_prices, derive_secret,
    gateway::{decode_revert, ChainGateway},
    FlowConfig, FlowState, RegistrationFlow, SimulatedRegistrar,
};

#[derive(Parser)]
#[command(name = "regflow")]
#[command(author = "Atlanta Registrar Team")]
#[command(version = "0.1.0")]
#[command(about = "Commit-reveal name registration client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full commit-reveal registration flow
    Register {
        /// Name to register
        #[arg(short, long, default_value = "billal.test")]
        name: String,

        /// Registration duration in seconds
        #[arg(short, long, default_value = "3600")]
        duration: u64,

        /// Platform domain baked into the secret's fingerprint bytes
        #[arg(long)]
        platform_domain: Option<String>,

        /// Campaign reference baked into the secret (32-bit)
        #[arg(long)]
        campaign: Option<u64>,

        /// Minimum commitment age in seconds
        #[arg(long, default_value = "5")]
        min_wait: u64,

        /// Maximum commitment age in seconds
        #[arg(long, default_value = "86400")]
        max_wait: u64,

        /// Also set the reverse record
        #[arg(long)]
        reverse_record: bool,
    },

    /// Show the current price quote and computed amounts for a name
    Quote {
        #[arg(short, long, default_value = "billal.test")]
        name: String,

        #[arg(short, long, default_value = "3600")]
        duration: u64,
    },

    /// Derive and print a registration secret
    Secret {
        #[arg(long)]
        platform_domain: Option<String>,

        #[arg(long)]
        campaign: Option<u64>,
    },

    /// Decode a raw revert payload (hex)
    Decode {
        /// Revert payload, with or without 0x prefix
        payload: String,
    },

    /// Inspect a deployment artifact's ABI
    Artifact {
        /// Path to the ignition artifact JSON
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Print configuration info
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Register {
            name,
            duration,
            platform_domain,
            campaign,
            min_wait,
            max_wait,
            reverse_record,
        } => run_registration(
            &name,
            duration,
            platform_domain.as_deref(),
            campaign,
            min_wait,
            max_wait,
            reverse_record,
        )?,

        Commands::Quote { name, duration } => print_quote(&name, duration)?,

        Commands::Secret {
            platform_domain,
            campaign,
        } => {
            let secret = derive_secret(platform_domain.as_deref(), campaign)?;
            println!("{}", secret.to_hex());
        }

        Commands::Decode { payload } => {
            let bytes = parse_hex(&payload)?;
            println!("{}", decode_revert(&bytes));
        }

        Commands::Artifact { path } => inspect_artifact(path.as_deref())?,

        Commands::Info => print_info(),
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_registration(
    name: &str,
    duration: u64,
    platform_domain: Option<&str>,
    campaign: Option<u64>,
    min_wait: u64,
    max_wait: u64,
    reverse_record: bool,
) -> Result<()> {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║       Commit-Reveal Name Registration                    ║");
    println!("║       Atlanta Registrar Client                           ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    let config = FlowConfig::localnet();
    let registrar = SimulatedRegistrar::new(
        config.buyer_account.clone(),
        Duration::from_secs(min_wait),
        Duration::from_secs(max_wait),
    );

    let secret = derive_secret(platform_domain, campaign)?;
    let request = build_commitment_request(
        name,
        config.buyer_account.clone(),
        duration,
        secret,
        config.resolver.clone(),
        vec![],
        reverse_record,
        0,
    )?;

    let quote = registrar.get_price_quote(name, duration)?;
    let prices = compute_prices(&quote);

    info!("Name:      {}", name);
    info!("Buyer:     {}", config.buyer_account);
    info!("Duration:  {}s", duration);
    info!("Secret:    {}", secret.to_hex());
    info!("Register:  {} ETH", wei_to_eth(prices.register_value));
    info!("Payment:   {} ETH", wei_to_eth(prices.payment_value));
    info!("Fee:       {} ETH", wei_to_eth(prices.fee_value));
    println!();

    let mut flow = RegistrationFlow::new(
        request,
        Duration::from_secs(min_wait),
        Duration::from_secs(max_wait),
    );

    let receipt = flow.run(&registrar, countdown)?;

    println!();
    match flow.state() {
        FlowState::Registered => {
            println!("✅ Registered {} in tx {}", name, receipt.tx_id);
        }
        other => println!("Flow ended in state {:?}", other),
    }
    println!();

    Ok(())
}

fn print_quote(name: &str, duration: u64) -> Result<()> {
    let config = FlowConfig::localnet();
    let registrar = SimulatedRegistrar::new(
        config.buyer_account,
        Duration::from_secs(config.min_commitment_age_secs),
        Duration::from_secs(config.max_commitment_age_secs),
    );

    let quote = registrar.get_price_quote(name, duration)?;
    let prices = compute_prices(&quote);

    println!();
    println!("Quote for {} ({}s):", name, duration);
    println!("  Base:     {} ETH", wei_to_eth(quote.base));
    println!("  Premium:  {} ETH", wei_to_eth(quote.premium));
    println!("  Register: {} ETH", wei_to_eth(prices.register_value));
    println!("  Payment:  {} ETH", wei_to_eth(prices.payment_value));
    println!("  Fee:      {} ETH", wei_to_eth(prices.fee_value));
    println!();

    Ok(())
}

fn inspect_artifact(path: Option<&str>) -> Result<()> {
    let config = FlowConfig::localnet();
    let path = path.unwrap_or(config.artifact_path.as_str());

    let artifact = ContractArtifact::load(path)
        .with_context(|| format!("Could not load artifact from {}", path))?;

    println!();
    println!("Contract: {}", artifact.contract_name);
    println!("Functions:");
    for function in artifact.function_names() {
        println!("  • {}", function);
    }

    let missing = artifact.missing_functions();
    if missing.is_empty() {
        println!("ABI exposes everything the flow needs");
    } else {
        println!("⚠ Missing functions required by the flow: {:?}", missing);
    }
    println!();

    Ok(())
}

fn print_info() {
    let config = FlowConfig::localnet();

    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║       Registration Flow Client - Info                    ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();
    println!("Two-phase commit-reveal registration against an ENS-style");
    println!("registrar with a price oracle and payment treasury.");
    println!();
    println!("COMPONENTS:");
    println!("  • SecretDeriver      - 32-byte secrets with attribution bytes");
    println!("  • PriceCalculator    - 110%/115% markup over the rent quote");
    println!("  • CommitmentPlanner  - canonical registration requests");
    println!("  • RegistrationFlow   - commit → wait → register state machine");
    println!("  • SimulatedRegistrar - in-process registrar for demos/tests");
    println!();
    println!("USAGE:");
    println!("  regflow register --name billal.test   # Full flow");
    println!("  regflow quote --name abc.test          # Price preview");
    println!("  regflow secret --campaign 42           # Derive a secret");
    println!("  regflow decode 0x08c379a0...           # Decode a revert");
    println!();
    println!("CONFIG (localnet):");
    println!("  RPC:        {}", config.rpc_url);
    println!("  Registrar:  {}", config.registrar_address);
    println!("  Owner:      {}", config.owner_account);
    println!("  Buyer:      {}", config.buyer_account);
    println!("  Resolver:   {}", config.resolver);
    println!();
}

/// Blocking countdown replacing the original's console status spinner.
fn countdown(wait: Duration) {
    let total = wait.as_secs();
    if total == 0 {
        return;
    }
    info!("Waiting {}s for the commitment to mature...", total);
    for remaining in (1..=total).rev() {
        if remaining % 10 == 0 || remaining <= 3 {
            info!("  {}s remaining", remaining);
        }
        std::thread::sleep(Duration::from_secs(1));
    }
}

fn wei_to_eth(wei: u128) -> f64 {
    wei as f64 / 1e18
}

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let hex = input.strip_prefix("0x").unwrap_or(input);
    if hex.len() % 2 != 0 {
        bail!("hex payload has odd length");
    }
    hex.as_bytes()
        .chunks(2)
        .map(|pair| {
            let text = std::str::from_utf8(pair).context("invalid hex")?;
            u8::from_str_radix(text, 16).context("invalid hex digit")
        })
        .collect()
}
