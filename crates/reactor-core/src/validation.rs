//! Order validation shared by the single-chain reactor and the cross-chain settler.

use alloy_primitives::Address;
use reactor_chain::Chain;
use reactor_types::{ResolvedOrder, Timestamp};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when validating a resolved order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	/// The order was signed for a different deployment.
	#[error("Invalid reactor: order targets {declared}, executing on {actual}")]
	InvalidReactor { declared: Address, actual: Address },
	/// The order deadline has passed.
	#[error("Deadline {deadline} passed at {now}")]
	DeadlinePassed { deadline: Timestamp, now: Timestamp },
	/// The offerer's validation contract rejected the filler.
	#[error("Additional validation failed")]
	ValidationFailed,
}

/// Checks a resolved order against the deployment executing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderValidator {
	reactor: Address,
}

impl OrderValidator {
	/// Creates a validator for the contract deployed at `reactor`.
	pub fn new(reactor: Address) -> Self {
		Self { reactor }
	}

	/// Validates `order` for `filler` at the chain's current time.
	///
	/// When the order names a validation contract, the hook deployed at that
	/// address decides. A missing hook counts as a rejection.
	pub fn validate(
		&self,
		chain: &Chain,
		order: &ResolvedOrder,
		filler: Address,
	) -> Result<(), ValidationError> {
		if order.info.reactor != self.reactor {
			return Err(ValidationError::InvalidReactor {
				declared: order.info.reactor,
				actual: self.reactor,
			});
		}

		let now = chain.timestamp();
		if now > order.info.deadline {
			return Err(ValidationError::DeadlinePassed {
				deadline: order.info.deadline,
				now,
			});
		}

		if order.info.has_validation_contract() {
			let accepted = chain
				.validation_hook(order.info.validation_contract)
				.map(|hook| hook.validate(filler, order))
				.unwrap_or(false);
			if !accepted {
				debug!(
					order_hash = %order.hash,
					%filler,
					validation_contract = %order.info.validation_contract,
					"additional validation rejected filler"
				);
				return Err(ValidationError::ValidationFailed);
			}
		}

		Ok(())
	}
}
