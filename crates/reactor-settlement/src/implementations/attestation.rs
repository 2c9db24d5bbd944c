//! Settlement oracle fed by an attester watching the target chains.

use crate::SettlementOracle;
use alloy_primitives::{Address, B256};
use reactor_chain::ContractError;
use reactor_types::OutputToken;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::info;

/// Records the outputs observed on target chains, keyed by order hash and
/// target filler.
#[derive(Debug, Default)]
pub struct AttestationOracle {
	attestations: RwLock<HashMap<(B256, Address), Vec<OutputToken>>>,
}

impl AttestationOracle {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records that `target_filler` delivered `outputs` for `order_hash`.
	/// A later attestation for the same pair replaces the earlier one.
	pub fn attest(
		&self,
		order_hash: B256,
		target_filler: Address,
		outputs: Vec<OutputToken>,
	) -> Result<(), ContractError> {
		let mut attestations = self
			.attestations
			.write()
			.map_err(|e| ContractError::Reverted(format!("Failed to acquire write lock: {}", e)))?;
		info!(%order_hash, %target_filler, outputs = outputs.len(), "fill attested");
		attestations.insert((order_hash, target_filler), outputs);
		Ok(())
	}
}

impl SettlementOracle for AttestationOracle {
	fn get_filled_outputs(
		&self,
		order_hash: B256,
		target_filler: Address,
	) -> Result<Vec<OutputToken>, ContractError> {
		let attestations = self
			.attestations
			.read()
			.map_err(|e| ContractError::Reverted(format!("Failed to acquire read lock: {}", e)))?;
		Ok(attestations
			.get(&(order_hash, target_filler))
			.cloned()
			.unwrap_or_default())
	}
}
