use alloy_primitives::{Address, Bytes, B256};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reactor_chain::Chain;
use reactor_config::{ConfigLoader, LogFormat, ReactorConfig};
use reactor_order::abi::order_hash;
use reactor_permit::{LocalPermitSigner, Permit2, PermitTransferFrom, SignatureTransfer};
use reactor_types::{SignedOrder, Timestamp};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod factory;

#[derive(Parser)]
#[command(name = "order-reactor")]
#[command(about = "Order reactor tooling", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[arg(short, long, value_name = "FILE", default_value = "config/reactor.toml")]
	config: PathBuf,

	/// Overrides the configured log level.
	#[arg(long, env = "REACTOR_LOG_LEVEL")]
	log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
	/// Validate the configuration file
	Validate,
	/// Resolve an encoded order and print it as JSON
	Resolve {
		/// Hex-encoded order payload
		#[arg(long)]
		order: String,
		/// Evaluation time, defaults to now
		#[arg(long)]
		timestamp: Option<Timestamp>,
	},
	/// Print the hash of an encoded order
	Hash {
		#[arg(long)]
		order: String,
	},
	/// Sign the permit for an encoded order
	Sign {
		#[arg(long)]
		order: String,
		/// Hex-encoded private key of the offerer
		#[arg(long, env = "REACTOR_SIGNING_KEY", hide_env_values = true)]
		key: String,
		#[arg(long)]
		timestamp: Option<Timestamp>,
	},
}

#[derive(Serialize)]
struct SignedPermit {
	order_hash: B256,
	digest: B256,
	signer: Address,
	signature: Bytes,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	if let Commands::Hash { order } = &cli.command {
		setup_tracing(cli.log_level.as_deref().unwrap_or("info"), LogFormat::Pretty)?;
		println!("{}", order_hash(&decode_hex(order)?));
		return Ok(());
	}

	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;
	let log_level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
	setup_tracing(log_level, config.logging.format)?;

	match cli.command {
		Commands::Validate => validate_config(&config),
		Commands::Resolve { order, timestamp } => resolve_order(&config, &order, timestamp),
		Commands::Sign {
			order,
			key,
			timestamp,
		} => sign_order(&config, &order, &key, timestamp),
		Commands::Hash { .. } => Ok(()),
	}
}

fn validate_config(config: &ReactorConfig) -> Result<()> {
	info!("Configuration is valid");
	info!(
		reactor = %config.reactor.address,
		chain_id = config.reactor.chain_id,
		order_type = ?config.reactor.order_type,
		"reactor"
	);
	if let Some(fees) = &config.fees {
		info!(
			recipient = %fees.recipient,
			default_bps = ?fees.default_bps,
			tokens = fees.tokens.len(),
			"protocol fees enabled"
		);
	}
	if let Some(settlement) = &config.settlement {
		info!(settler = %settlement.address, oracle = %settlement.oracle, "cross-chain settlement");
	}
	Ok(())
}

fn resolve_order(config: &ReactorConfig, order: &str, timestamp: Option<Timestamp>) -> Result<()> {
	let chain = Chain::new(config.reactor.chain_id, timestamp.unwrap_or_else(now));
	let signed = SignedOrder::new(decode_hex(order)?, Bytes::new());

	let resolved = factory::resolve(config, &chain, &signed).context("Failed to resolve order")?;

	println!("{}", serde_json::to_string_pretty(&resolved)?);
	Ok(())
}

fn sign_order(
	config: &ReactorConfig,
	order: &str,
	key: &str,
	timestamp: Option<Timestamp>,
) -> Result<()> {
	let chain = Chain::new(config.reactor.chain_id, timestamp.unwrap_or_else(now));
	let signer = LocalPermitSigner::new(key)?;
	let signed = SignedOrder::new(decode_hex(order)?, Bytes::new());

	let resolved = factory::resolve(config, &chain, &signed).context("Failed to resolve order")?;
	let order = resolved.order();
	if order.info.offerer != signer.address() {
		warn!(
			offerer = %order.info.offerer,
			signer = %signer.address(),
			"signing key does not belong to the offerer"
		);
	}

	let permit2 = Permit2::new(config.reactor.permit2);
	let digest = permit2.permit_digest(
		config.reactor.chain_id,
		factory::spender(config)?,
		&PermitTransferFrom::for_order(order),
		order.hash,
	);
	let signature = signer.sign_digest(&digest)?;

	let output = SignedPermit {
		order_hash: order.hash,
		digest,
		signer: signer.address(),
		signature,
	};
	println!("{}", serde_json::to_string_pretty(&output)?);
	Ok(())
}

fn decode_hex(input: &str) -> Result<Vec<u8>> {
	hex::decode(input.trim().trim_start_matches("0x")).context("Order must be hex-encoded")
}

fn now() -> Timestamp {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or_default()
}

fn setup_tracing(log_level: &str, format: LogFormat) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	let registry = tracing_subscriber::registry().with(env_filter);
	let result = match format {
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
			.try_init(),
		LogFormat::Compact => registry
			.with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
			.try_init(),
		LogFormat::Pretty => registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.try_init(),
	};
	result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}
