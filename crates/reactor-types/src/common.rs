//! Primitive aliases and protocol-wide constants.

pub use alloy_primitives::{address, Address, Bytes, B256, U256};

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Token identity used for the chain's native currency.
pub const NATIVE: Address = Address::ZERO;

/// Filler sentinel meaning "the caller fills the order itself, no callback".
pub const DIRECT_FILL: Address = address!("0000000000000000000000000000000000000001");

/// Basis point denominator.
pub const BPS: u64 = 10_000;

/// Maximum protocol fee per token, in basis points of the order's value in that token.
pub const MAX_FEE_BPS: u64 = 5;

/// Returns true when the token is the native currency.
pub fn is_native(token: Address) -> bool {
	token == NATIVE
}

/// Sender and attached native value of a top-level call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
	pub sender: Address,
	pub value: U256,
}

impl CallContext {
	/// A call carrying no native value.
	pub fn new(sender: Address) -> Self {
		Self {
			sender,
			value: U256::ZERO,
		}
	}

	pub fn with_value(mut self, value: U256) -> Self {
		self.value = value;
		self
	}
}
