//! Fee controller charging a fixed number of basis points per output token.

use crate::fees::{FeeController, BPS};
use alloy_primitives::{Address, U256};
use reactor_types::{OutputToken, ResolvedOrder};
use std::collections::HashMap;

/// Charges `bps` of each output token's total to a single recipient.
///
/// Per-token rates override the default; tokens with no rate are free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BpsFeeController {
	recipient: Address,
	default_bps: Option<u64>,
	token_bps: HashMap<Address, u64>,
}

impl BpsFeeController {
	pub fn new(recipient: Address) -> Self {
		Self {
			recipient,
			default_bps: None,
			token_bps: HashMap::new(),
		}
	}

	pub fn with_default_bps(mut self, bps: u64) -> Self {
		self.default_bps = Some(bps);
		self
	}

	pub fn with_token_bps(mut self, token: Address, bps: u64) -> Self {
		self.token_bps.insert(token, bps);
		self
	}

	fn rate(&self, token: Address) -> Option<u64> {
		self.token_bps.get(&token).copied().or(self.default_bps)
	}
}

impl FeeController for BpsFeeController {
	fn get_fee_outputs(&self, order: &ResolvedOrder) -> Vec<OutputToken> {
		let mut fees: Vec<OutputToken> = Vec::new();
		for output in order.outputs.iter().filter(|o| !o.is_fee_output) {
			if fees.iter().any(|fee| fee.token == output.token) {
				continue;
			}
			let Some(bps) = self.rate(output.token) else {
				continue;
			};
			let amount = order.output_amount(output.token).saturating_mul(U256::from(bps))
				/ U256::from(BPS);
			if amount.is_zero() {
				continue;
			}
			fees.push(OutputToken {
				token: output.token,
				amount,
				recipient: self.recipient,
				is_fee_output: true,
				chain_id: output.chain_id,
			});
		}
		fees
	}
}
