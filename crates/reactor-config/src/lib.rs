//! Configuration loading for the order reactor.
//!
//! Configuration is read from a TOML file. `${VAR}` placeholders are
//! substituted from the environment before parsing, and a handful of
//! `REACTOR_`-prefixed variables override parsed values afterwards.

use alloy_primitives::Address;
use reactor_types::MAX_FEE_BPS;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub mod types;

pub use types::*;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<String>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "REACTOR_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<ReactorConfig, ConfigError> {
		let Some(file_path) = &self.file_path else {
			return Err(ConfigError::FileNotFound(
				"No configuration file specified".to_string(),
			));
		};
		info!(path = %file_path, "loading configuration");
		let content = tokio::fs::read_to_string(file_path).await?;
		self.load_str(&content)
	}

	/// Parses, overrides and validates configuration from a TOML string.
	pub fn load_str(&self, content: &str) -> Result<ReactorConfig, ConfigError> {
		let substituted = self.substitute_env_vars(content)?;
		let mut config: ReactorConfig =
			toml::from_str(&substituted).map_err(|e| ConfigError::ParseError(e.to_string()))?;

		self.apply_env_overrides(&mut config)?;
		validate_config(&config)?;

		Ok(config)
	}

	fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
		let mut result = content.to_string();

		// Find and replace ${VAR_NAME} patterns
		let re = regex::Regex::new(r"\$\{([^}]+)\}")
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;

		for cap in re.captures_iter(content) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let env_value = env::var(var_name)
				.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			result = result.replace(full_match, &env_value);
		}

		Ok(result)
	}

	fn apply_env_overrides(&self, config: &mut ReactorConfig) -> Result<(), ConfigError> {
		if let Ok(log_level) = env::var(format!("{}LOG_LEVEL", self.env_prefix)) {
			debug!("overriding log level from environment");
			config.logging.level = log_level;
		}

		if let Ok(chain_id) = env::var(format!("{}CHAIN_ID", self.env_prefix)) {
			config.reactor.chain_id = chain_id
				.parse()
				.map_err(|e| ConfigError::ValidationError(format!("Invalid chain id: {}", e)))?;
		}

		if let Ok(recipient) = env::var(format!("{}FEE_RECIPIENT", self.env_prefix)) {
			let recipient: Address = recipient.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid fee recipient: {}", e))
			})?;
			if let Some(fees) = config.fees.as_mut() {
				fees.recipient = recipient;
			}
		}

		Ok(())
	}
}

impl FeeConfig {
	/// Per-token rates with parsed token addresses.
	pub fn token_rates(&self) -> Result<Vec<(Address, u64)>, ConfigError> {
		self.tokens
			.iter()
			.map(|(token, bps)| {
				let token: Address = token.parse().map_err(|e| {
					ConfigError::ValidationError(format!("Invalid fee token {}: {}", token, e))
				})?;
				Ok((token, *bps))
			})
			.collect()
	}
}

/// Checks a parsed configuration for values that cannot work at runtime.
pub fn validate_config(config: &ReactorConfig) -> Result<(), ConfigError> {
	if config.reactor.address == Address::ZERO {
		return Err(ConfigError::ValidationError(
			"Reactor address must be set".to_string(),
		));
	}
	if config.reactor.permit2 == Address::ZERO {
		return Err(ConfigError::ValidationError(
			"Permit2 address must be set".to_string(),
		));
	}
	if config.reactor.chain_id == 0 {
		return Err(ConfigError::ValidationError(
			"Chain id must be non-zero".to_string(),
		));
	}

	if let Some(fees) = &config.fees {
		let rates = fees.token_rates()?;
		let too_high = fees
			.default_bps
			.into_iter()
			.chain(rates.iter().map(|(_, bps)| *bps))
			.find(|bps| *bps > MAX_FEE_BPS);
		if let Some(bps) = too_high {
			return Err(ConfigError::ValidationError(format!(
				"Fee of {} bps exceeds the protocol maximum of {} bps",
				bps, MAX_FEE_BPS
			)));
		}
	}

	if config.reactor.order_type == OrderType::CrossChain && config.settlement.is_none() {
		return Err(ConfigError::ValidationError(
			"Cross-chain orders need a [settlement] section".to_string(),
		));
	}

	if let Some(settlement) = &config.settlement {
		if settlement.address == Address::ZERO || settlement.oracle == Address::ZERO {
			return Err(ConfigError::ValidationError(
				"Settlement address and oracle must be set".to_string(),
			));
		}
		if settlement.address == config.reactor.address {
			return Err(ConfigError::ValidationError(
				"Settlement and reactor must be deployed at different addresses".to_string(),
			));
		}
	}

	if !LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
		return Err(ConfigError::ValidationError(format!(
			"Unknown log level '{}'",
			config.logging.level
		)));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	const CONFIG: &str = r#"
[reactor]
address = "0x00000000000000000000000000000000000000ee"
chain_id = 1
permit2 = "0x000000000022D473030F116dDEE9F6B43aC78BA3"
order_type = "dutch"

[fees]
recipient = "0x00000000000000000000000000000000000000fe"
default_bps = 5

[fees.tokens]
"0x0000000000000000000000000000000000000010" = 2

[settlement]
address = "0x00000000000000000000000000000000000000e5"
oracle = "0x000000000000000000000000000000000000000a"
"#;

	fn write_config(content: &str) -> NamedTempFile {
		let mut file = NamedTempFile::new().unwrap();
		file.write_all(content.as_bytes()).unwrap();
		file
	}

	#[tokio::test]
	async fn test_load_full_config() {
		let file = write_config(CONFIG);

		let config = ConfigLoader::new()
			.with_env_prefix("REACTOR_TEST_FULL_")
			.with_file(file.path())
			.load()
			.await
			.unwrap();

		assert_eq!(config.reactor.chain_id, 1);
		assert_eq!(config.reactor.order_type, OrderType::Dutch);
		assert_eq!(config.logging, LoggingConfig::default());
		let fees = config.fees.unwrap();
		assert_eq!(fees.default_bps, Some(5));
		assert_eq!(
			fees.token_rates().unwrap(),
			vec![(
				"0x0000000000000000000000000000000000000010"
					.parse::<Address>()
					.unwrap(),
				2
			)]
		);
		assert!(config.settlement.is_some());
	}

	#[tokio::test]
	async fn test_missing_file_path() {
		let err = ConfigLoader::new().load().await.unwrap_err();
		assert!(matches!(err, ConfigError::FileNotFound(_)));
	}

	#[test]
	fn test_env_substitution_and_overrides() {
		env::set_var("REACTOR_TEST_SUBST_ADDRESS", "0x00000000000000000000000000000000000000ee");
		env::set_var("REACTOR_TEST_OVR_CHAIN_ID", "10");
		env::set_var("REACTOR_TEST_OVR_LOG_LEVEL", "debug");
		let content = CONFIG.replace(
			"\"0x00000000000000000000000000000000000000ee\"",
			"\"${REACTOR_TEST_SUBST_ADDRESS}\"",
		);

		let config = ConfigLoader::new()
			.with_env_prefix("REACTOR_TEST_OVR_")
			.load_str(&content)
			.unwrap();

		assert_eq!(
			config.reactor.address,
			"0x00000000000000000000000000000000000000ee"
				.parse::<Address>()
				.unwrap()
		);
		assert_eq!(config.reactor.chain_id, 10);
		assert_eq!(config.logging.level, "debug");
	}

	#[test]
	fn test_unset_placeholder_rejected() {
		let content = CONFIG.replace("chain_id = 1", "chain_id = ${REACTOR_TEST_UNSET_VAR}");

		let err = ConfigLoader::new().load_str(&content).unwrap_err();

		assert!(matches!(err, ConfigError::EnvVarNotFound(ref v) if v == "REACTOR_TEST_UNSET_VAR"));
	}

	#[test]
	fn test_fee_above_protocol_bound_rejected() {
		let content = CONFIG.replace("default_bps = 5", "default_bps = 6");

		let err = ConfigLoader::new()
			.with_env_prefix("REACTOR_TEST_FEE_")
			.load_str(&content)
			.unwrap_err();

		assert!(matches!(err, ConfigError::ValidationError(_)));
	}

	#[test]
	fn test_zero_reactor_address_rejected() {
		let content = CONFIG.replace(
			"address = \"0x00000000000000000000000000000000000000ee\"",
			"address = \"0x0000000000000000000000000000000000000000\"",
		);

		let err = ConfigLoader::new()
			.with_env_prefix("REACTOR_TEST_ZERO_")
			.load_str(&content)
			.unwrap_err();

		assert!(matches!(err, ConfigError::ValidationError(_)));
	}

	#[test]
	fn test_cross_chain_requires_settlement() {
		let content = r#"
[reactor]
address = "0x00000000000000000000000000000000000000ee"
chain_id = 1
permit2 = "0x0000000000000000000000000000000000000002"
order_type = "cross_chain"
"#;

		let err = ConfigLoader::new()
			.with_env_prefix("REACTOR_TEST_XC_")
			.load_str(content)
			.unwrap_err();

		assert!(matches!(err, ConfigError::ValidationError(_)));
	}

	#[test]
	fn test_minimal_config_defaults() {
		let content = r#"
[reactor]
address = "0x00000000000000000000000000000000000000ee"
chain_id = 1
permit2 = "0x0000000000000000000000000000000000000002"
"#;

		let config = ConfigLoader::new()
			.with_env_prefix("REACTOR_TEST_MIN_")
			.load_str(content)
			.unwrap();

		assert_eq!(config.reactor.order_type, OrderType::Limit);
		assert!(config.fees.is_none());
		assert!(config.settlement.is_none());
		assert_eq!(config.logging.format, LogFormat::Pretty);
	}
}
