//! Configuration types.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level configuration of an `order-reactor` deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactorConfig {
	pub reactor: ReactorSection,
	#[serde(default)]
	pub fees: Option<FeeConfig>,
	#[serde(default)]
	pub settlement: Option<SettlementConfig>,
	#[serde(default)]
	pub logging: LoggingConfig,
}

/// The single-chain reactor deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactorSection {
	pub address: Address,
	pub chain_id: u64,
	pub permit2: Address,
	#[serde(default)]
	pub order_type: OrderType,
}

/// Order type the reactor is instantiated for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
	#[default]
	Limit,
	Dutch,
	/// Settled through the cross-chain settler named in `[settlement]`.
	CrossChain,
}

/// Basis-point fee policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
	pub recipient: Address,
	#[serde(default)]
	pub default_bps: Option<u64>,
	/// Per-token rates, keyed by token address.
	#[serde(default)]
	pub tokens: BTreeMap<String, u64>,
}

/// The cross-chain settler deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementConfig {
	pub address: Address,
	pub oracle: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
	#[serde(default = "default_log_level")]
	pub level: String,
	#[serde(default)]
	pub format: LogFormat,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: default_log_level(),
			format: LogFormat::default(),
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
	#[default]
	Pretty,
	Compact,
	Json,
}
