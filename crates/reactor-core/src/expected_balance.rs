//! Post-callback delivery check.
//!
//! Before control passes to a fill contract, the reactor records each
//! recipient's balance of every token it is owed. After the callback every
//! recipient must hold at least its recorded balance plus the sum owed to it
//! across the whole batch.

use crate::ReactorError;
use alloy_primitives::U256;
use reactor_chain::Chain;
use reactor_types::{ExpectedBalance, ResolvedOrder};

/// Sums the outputs of `orders` per (recipient, token), in first-seen order.
pub fn expected_balances(orders: &[ResolvedOrder]) -> Vec<ExpectedBalance> {
	let mut expected: Vec<ExpectedBalance> = Vec::new();
	for output in orders.iter().flat_map(|order| &order.outputs) {
		match expected
			.iter_mut()
			.find(|e| e.recipient == output.recipient && e.token == output.token)
		{
			Some(entry) => {
				entry.expected_amount = entry.expected_amount.saturating_add(output.amount);
			}
			None => expected.push(ExpectedBalance {
				recipient: output.recipient,
				token: output.token,
				expected_amount: output.amount,
			}),
		}
	}
	expected
}

/// Balances owed to recipients together with what they held beforehand.
#[derive(Debug, Clone)]
pub struct ExpectedBalanceTracker {
	entries: Vec<(ExpectedBalance, U256)>,
}

impl ExpectedBalanceTracker {
	/// Records the current balances of every recipient owed by `orders`.
	pub fn snapshot(chain: &Chain, orders: &[ResolvedOrder]) -> Self {
		let entries = expected_balances(orders)
			.into_iter()
			.map(|expected| {
				let before = chain.balance_of(expected.token, expected.recipient);
				(expected, before)
			})
			.collect();
		Self { entries }
	}

	pub fn expected(&self) -> impl Iterator<Item = &ExpectedBalance> {
		self.entries.iter().map(|(expected, _)| expected)
	}

	/// Fails with [`ReactorError::InsufficientOutput`] on the first recipient
	/// that received less than owed.
	pub fn check(&self, chain: &Chain) -> Result<(), ReactorError> {
		for (expected, before) in &self.entries {
			let now = chain.balance_of(expected.token, expected.recipient);
			let received = now.saturating_sub(*before);
			if received < expected.expected_amount {
				return Err(ReactorError::InsufficientOutput {
					recipient: expected.recipient,
					token: expected.token,
					expected: expected.expected_amount,
					received,
				});
			}
		}
		Ok(())
	}
}
