//! Order types shared by resolvers, the fee engine, the validator and the reactors.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Metadata common to every order type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInfo {
	/// The reactor deployment this order is addressed to.
	pub reactor: Address,
	/// The signer of the order.
	pub offerer: Address,
	/// Replay-prevention nonce, single-use per offerer.
	pub nonce: U256,
	/// Absolute deadline after which the order can no longer be settled.
	pub deadline: Timestamp,
	/// Optional extra validation contract (`Address::ZERO` for none).
	pub validation_contract: Address,
	/// Opaque payload interpreted by the validation contract.
	pub validation_data: Bytes,
}

impl OrderInfo {
	/// Whether the offerer asked for an additional validation callback.
	pub fn has_validation_contract(&self) -> bool {
		self.validation_contract != Address::ZERO
	}
}

/// The token the offerer is selling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputToken {
	pub token: Address,
	/// Amount transferred for this fill.
	pub amount: U256,
	/// Most the offerer ever permitted for this order; the permit is signed over it.
	pub max_amount: U256,
}

/// A token amount promised to a recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputToken {
	pub token: Address,
	pub amount: U256,
	pub recipient: Address,
	/// Marks outputs that pay fees rather than the swapper.
	pub is_fee_output: bool,
	/// Chain the output must be delivered on.
	pub chain_id: u64,
}

/// An encoded order together with the offerer's detached signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedOrder {
	pub order: Bytes,
	pub sig: Bytes,
}

impl SignedOrder {
	pub fn new(order: impl Into<Bytes>, sig: impl Into<Bytes>) -> Self {
		Self {
			order: order.into(),
			sig: sig.into(),
		}
	}
}

/// Canonical, fully concretized order ready for settlement.
///
/// Amounts are final once an order is resolved. The only mutation allowed
/// afterwards is the appension of protocol fee outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOrder {
	pub info: OrderInfo,
	pub input: InputToken,
	pub outputs: Vec<OutputToken>,
	pub sig: Bytes,
	/// keccak256 of the encoded order.
	pub hash: B256,
}

impl ResolvedOrder {
	/// Sum of the non-fee output amounts paying out the given token.
	pub fn output_amount(&self, token: Address) -> U256 {
		self.outputs
			.iter()
			.filter(|output| output.token == token && !output.is_fee_output)
			.fold(U256::ZERO, |acc, output| acc.saturating_add(output.amount))
	}
}

/// A (recipient, token, minimum-increase) triple checked after a fill callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedBalance {
	pub recipient: Address,
	pub token: Address,
	pub expected_amount: U256,
}
