//! Token balances held on the chain.
//!
//! Balances are keyed by (token, owner). The native currency is tracked
//! under the `NATIVE` token identity like any other token.

use alloy_primitives::{Address, U256};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur while moving balances.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
	/// The sender does not hold enough of the token.
	#[error("Insufficient balance of {token} for {owner}: need {needed}, have {available}")]
	InsufficientBalance {
		token: Address,
		owner: Address,
		needed: U256,
		available: U256,
	},
	/// Crediting the recipient would overflow.
	#[error("Balance overflow for {owner} in {token}")]
	Overflow { token: Address, owner: Address },
}

/// In-memory balance sheet for every token on the chain.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
	balances: HashMap<(Address, Address), U256>,
}

impl Ledger {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the balance of `owner` in `token`.
	pub fn balance_of(&self, token: Address, owner: Address) -> U256 {
		self.balances
			.get(&(token, owner))
			.copied()
			.unwrap_or(U256::ZERO)
	}

	/// Creates new supply of `token` for `owner`.
	pub fn mint(&mut self, token: Address, owner: Address, amount: U256) -> Result<(), LedgerError> {
		let balance = self.balances.entry((token, owner)).or_insert(U256::ZERO);
		*balance = balance
			.checked_add(amount)
			.ok_or(LedgerError::Overflow { token, owner })?;
		Ok(())
	}

	/// Moves `amount` of `token` from `from` to `to`.
	///
	/// Either both sides are updated or neither is.
	pub fn transfer(
		&mut self,
		token: Address,
		from: Address,
		to: Address,
		amount: U256,
	) -> Result<(), LedgerError> {
		if amount.is_zero() || from == to {
			let available = self.balance_of(token, from);
			if available < amount {
				return Err(LedgerError::InsufficientBalance {
					token,
					owner: from,
					needed: amount,
					available,
				});
			}
			return Ok(());
		}

		let available = self.balance_of(token, from);
		let remaining = available
			.checked_sub(amount)
			.ok_or(LedgerError::InsufficientBalance {
				token,
				owner: from,
				needed: amount,
				available,
			})?;
		let credited = self
			.balance_of(token, to)
			.checked_add(amount)
			.ok_or(LedgerError::Overflow { token, owner: to })?;

		self.balances.insert((token, from), remaining);
		self.balances.insert((token, to), credited);
		Ok(())
	}
}
