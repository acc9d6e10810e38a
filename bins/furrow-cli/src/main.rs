//! furrow-cli: Operator interface for a Furrow farming contract.
//!
//! Initialises a contract in a RocksDB directory, runs position updates
//! against it and prints pool and position state as JSON.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use furrow_core::constants::METHOD_UPDATE_FARMING;
use furrow_core::types::{Amount, AssetId, Height, PubKey};
use furrow_farming::{FarmingEngine, PositionChange};
use furrow_host::records::UpdatePositionArgs;
use furrow_host::{DaoContract, HostConfig, RocksKvStore};
use tracing::info;

/// Furrow farming contract operator CLI.
#[derive(Parser)]
#[command(name = "furrow-cli")]
#[command(version, about = "Deterministic farming reward accrual")]
struct Cli {
    /// Config file (TOML). Missing files are ignored.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides config and FURROW_DATA_DIR).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json").
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the contract with an empty farming pool.
    Init(InitArgs),
    /// Settle a position and optionally move principal or reward.
    Update(UpdateArgs),
    /// Invoke a method with hex-encoded argument bytes.
    Invoke(InvokeArgs),
    /// Print the farming pool state.
    Pool,
    /// Print a position.
    Position(PositionArgs),
    /// Print the farming weight of a deposit.
    Weight(WeightArgs),
}

#[derive(Args)]
struct InitArgs {
    /// Reward asset id.
    #[arg(long)]
    asset_id: AssetId,
}

#[derive(Args)]
struct UpdateArgs {
    /// Position public key (64 hex characters).
    #[arg(long)]
    pk: String,

    /// Current block height.
    #[arg(long)]
    height: Height,

    /// Principal to lock, in groth.
    #[arg(long, conflicts_with = "withdraw")]
    deposit: Option<Amount>,

    /// Principal to unlock, in groth.
    #[arg(long)]
    withdraw: Option<Amount>,

    /// Accrued reward to withdraw, in groth.
    #[arg(long, default_value_t = 0)]
    claim: Amount,
}

#[derive(Args)]
struct InvokeArgs {
    /// Method id.
    #[arg(long, default_value_t = METHOD_UPDATE_FARMING)]
    method: u32,

    /// Hex-encoded argument record.
    #[arg(long)]
    args: String,

    /// Current block height.
    #[arg(long)]
    height: Height,
}

#[derive(Args)]
struct PositionArgs {
    /// Position public key (64 hex characters).
    #[arg(long)]
    pk: String,
}

#[derive(Args)]
struct WeightArgs {
    /// Deposit in groth.
    amount: Amount,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_logging(&config.log_level, &config.log_format);

    match cli.command {
        Commands::Init(args) => cmd_init(&config, args),
        Commands::Update(args) => cmd_update(&config, args),
        Commands::Invoke(args) => cmd_invoke(&config, args),
        Commands::Pool => cmd_pool(&config),
        Commands::Position(args) => cmd_position(&config, args),
        Commands::Weight(args) => cmd_weight(args),
    }
}

/// Config file and environment first, then command-line overrides.
fn load_config(cli: &Cli) -> Result<HostConfig> {
    let mut config = HostConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    Ok(config)
}

fn open_contract(config: &HostConfig) -> Result<DaoContract<RocksKvStore>> {
    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!("Failed to create directory: {}", config.data_dir.display())
    })?;
    let path = config.db_path();
    let store = RocksKvStore::open(&path)
        .with_context(|| format!("Failed to open store: {}", path.display()))?;
    Ok(DaoContract::new(store))
}

fn parse_pk(s: &str) -> Result<PubKey> {
    PubKey::from_hex(s).with_context(|| format!("Invalid public key: {s}"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_init(config: &HostConfig, args: InitArgs) -> Result<()> {
    let mut contract = open_contract(config)?;
    contract
        .initialize(args.asset_id)
        .context("Failed to initialize contract")?;
    info!(path = %config.db_path().display(), "cli: contract created");
    print_json(&contract.contract_state()?)
}

fn cmd_update(config: &HostConfig, args: UpdateArgs) -> Result<()> {
    let pk = parse_pk(&args.pk)?;
    let change = match (args.deposit, args.withdraw) {
        (Some(amount), None) => PositionChange::deposit(amount),
        (None, Some(amount)) => PositionChange::withdraw(amount),
        (None, None) => PositionChange::default(),
        (Some(_), Some(_)) => bail!("--deposit and --withdraw are mutually exclusive"),
    }
    .with_claim(args.claim);

    let mut contract = open_contract(config)?;
    let receipt = contract
        .update_position(&UpdatePositionArgs::new(pk, &change), args.height)
        .context("Position update rejected")?;
    print_json(&receipt)
}

fn cmd_invoke(config: &HostConfig, args: InvokeArgs) -> Result<()> {
    let bytes = hex::decode(&args.args).context("Arguments must be hex")?;
    let mut contract = open_contract(config)?;
    let receipt = contract
        .invoke(args.method, &bytes, args.height)
        .with_context(|| format!("Method {} rejected", args.method))?;
    print_json(&receipt)
}

fn cmd_pool(config: &HostConfig) -> Result<()> {
    let contract = open_contract(config)?;
    let pool = contract.pool_state()?;
    let engine = contract.engine();
    print_json(&serde_json::json!({
        "asset_id": contract.contract_state()?.asset_id,
        "pool": pool,
        "emission_so_far": engine.emission_so_far(&pool),
        "emission_total": engine.schedule().total(),
        "emission_per_block": engine.schedule().emission_per_block(),
    }))
}

fn cmd_position(config: &HostConfig, args: PositionArgs) -> Result<()> {
    let pk = parse_pk(&args.pk)?;
    let contract = open_contract(config)?;
    match contract.position(&pk)? {
        Some(pos) => print_json(&serde_json::json!({
            "pk": pk,
            "position": pos,
            "weight": contract.engine().weight(pos.principal),
        })),
        None => bail!("No position for {pk}"),
    }
}

fn cmd_weight(args: WeightArgs) -> Result<()> {
    let engine = FarmingEngine::new();
    println!("{}", engine.weight(args.amount));
    Ok(())
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// Pass `format = "json"` for structured JSON output. Any other value
/// defaults to human-readable text. Logs go to stderr so JSON results on
/// stdout stay clean.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
