//! Protocol fee injection.
//!
//! A [`FeeController`] proposes fee outputs for a resolved order. The
//! [`ProtocolFeeEngine`] checks each proposal against the order's own
//! outputs and appends the accepted fees before the order is validated.

use alloy_primitives::{Address, U256};
use reactor_types::{OutputToken, ResolvedOrder};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub use reactor_types::{BPS, MAX_FEE_BPS};

/// Errors raised while injecting protocol fees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeError {
	/// The controller returned two fees in the same token.
	#[error("Duplicate fee output for token {0}")]
	DuplicateFeeOutput(Address),
	/// The fee token appears in neither the input nor the outputs.
	#[error("Fee token {0} not present in order")]
	InvalidFeeToken(Address),
	/// The fee exceeds the per-token cap.
	#[error("Fee of {amount} in {token} exceeds maximum {max}")]
	FeeTooLarge {
		token: Address,
		amount: U256,
		max: U256,
	},
}

/// Source of protocol fee outputs for an order.
pub trait FeeController: Send + Sync {
	/// Returns the fee outputs to append to `order`.
	fn get_fee_outputs(&self, order: &ResolvedOrder) -> Vec<OutputToken>;
}

/// Applies a fee controller's proposals to resolved orders.
#[derive(Clone, Default)]
pub struct ProtocolFeeEngine {
	controller: Option<Arc<dyn FeeController>>,
}

impl ProtocolFeeEngine {
	/// An engine that charges nothing.
	pub fn disabled() -> Self {
		Self::default()
	}

	pub fn new(controller: Arc<dyn FeeController>) -> Self {
		Self {
			controller: Some(controller),
		}
	}

	pub fn is_enabled(&self) -> bool {
		self.controller.is_some()
	}

	/// Appends the controller's fee outputs to `order`.
	///
	/// The order is only modified when every proposed fee passes.
	pub fn take_fees(&self, order: &mut ResolvedOrder) -> Result<(), FeeError> {
		let Some(controller) = &self.controller else {
			return Ok(());
		};

		let fees = controller.get_fee_outputs(order);
		for (i, fee) in fees.iter().enumerate() {
			if fees[..i].iter().any(|prior| prior.token == fee.token) {
				return Err(FeeError::DuplicateFeeOutput(fee.token));
			}

			let mut reference = order.output_amount(fee.token);
			if order.input.token == fee.token {
				reference = reference.saturating_add(order.input.amount);
			}
			if reference.is_zero() {
				return Err(FeeError::InvalidFeeToken(fee.token));
			}

			let max = reference.saturating_mul(U256::from(MAX_FEE_BPS)) / U256::from(BPS);
			if fee.amount > max {
				return Err(FeeError::FeeTooLarge {
					token: fee.token,
					amount: fee.amount,
					max,
				});
			}
		}

		for fee in fees {
			debug!(
				order_hash = %order.hash,
				token = %fee.token,
				amount = %fee.amount,
				recipient = %fee.recipient,
				"appending protocol fee"
			);
			order.outputs.push(OutputToken {
				is_fee_output: true,
				..fee
			});
		}
		Ok(())
	}
}
