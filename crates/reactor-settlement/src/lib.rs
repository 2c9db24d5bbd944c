//! Cross-chain settlement for orders filled on another chain.
//!
//! The origin-chain filler escrows the offerer's input together with its own
//! collateral, then fills the outputs on the target chain. Unless someone
//! challenges before the optimistic deadline, the filler collects the escrow
//! once that deadline passes. A challenged settlement only finalizes once the
//! settlement oracle attests to outputs matching the order; if that never
//! happens the offerer can cancel after the challenge deadline.

use alloy_primitives::{Address, B256, U256};
use reactor_chain::{ContractError, LedgerError};
use reactor_core::ValidationError;
use reactor_order::OrderError;
use reactor_permit::PermitError;
use reactor_types::{ActiveSettlement, OutputToken, SettlementStatus, Timestamp};
use thiserror::Error;

pub mod settler;

/// Re-export implementations
pub mod implementations {
	pub mod attestation;
	pub mod memory;
}

pub use implementations::attestation::AttestationOracle;
pub use implementations::memory::MemorySettlementStorage;
pub use settler::CrossChainSettler;

/// Errors that can occur in the settlement record store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
	/// A record for the hash already exists.
	#[error("Settlement {0} already stored")]
	AlreadyExists(B256),
	/// No record for the hash.
	#[error("Settlement {0} not found")]
	NotFound(B256),
	/// The record changed status since it was read.
	#[error("Settlement is {actual:?}, expected {expected:?}")]
	StatusMismatch {
		expected: SettlementStatus,
		actual: SettlementStatus,
	},
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Errors raised by the cross-chain settler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
	/// The order payload could not be resolved.
	#[error(transparent)]
	Order(#[from] OrderError),
	/// The order failed validation.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// The permit transfer of the offerer's input failed.
	#[error(transparent)]
	Permit(#[from] PermitError),
	/// A collateral or escrow transfer failed.
	#[error(transparent)]
	Ledger(#[from] LedgerError),
	/// Error that occurs in the settlement record store.
	#[error(transparent)]
	Storage(#[from] StorageError),
	/// The settlement oracle failed to answer.
	#[error("Oracle error: {0}")]
	Oracle(#[from] ContractError),
	/// A settlement for the order hash already exists.
	#[error("Settlement {0} already initiated")]
	SettlementAlreadyInitiated(B256),
	/// No settlement was initiated for the order hash.
	#[error("Settlement {0} does not exist")]
	SettlementDoesNotExist(B256),
	/// The settlement already reached Success or Cancelled.
	#[error("Settlement {0} already completed")]
	SettlementAlreadyCompleted(B256),
	/// Cancellation attempted at or before the challenge deadline.
	#[error("Cannot cancel before challenge deadline {deadline} (now {now})")]
	CannotCancelBeforeDeadline { deadline: Timestamp, now: Timestamp },
	/// Unchallenged finalization attempted before the optimistic deadline.
	#[error("Cannot finalize before optimistic deadline {deadline} (now {now})")]
	CannotFinalizeBeforeDeadline { deadline: Timestamp, now: Timestamp },
	/// The settlement is not in the Pending status.
	#[error("Only pending settlements can be challenged")]
	CanOnlyChallengePendingSettlements,
	/// Challenge attempted at or after the optimistic deadline.
	#[error("Optimistic period ended at {deadline} (now {now})")]
	OptimisticPeriodOver { deadline: Timestamp, now: Timestamp },
	/// No oracle is registered at the settlement's oracle address.
	#[error("Unknown settlement oracle {0}")]
	UnknownOracle(Address),
	/// The oracle attested a different number of outputs.
	#[error("Oracle attested {actual} outputs, order has {expected}")]
	OutputsLengthMismatch { expected: usize, actual: usize },
	/// Attested output recipient differs from the order.
	#[error("Output {index}: recipient mismatch")]
	InvalidRecipient { index: usize },
	/// Attested output token differs from the order.
	#[error("Output {index}: token mismatch")]
	InvalidToken { index: usize },
	/// Attested output chain id differs from the order.
	#[error("Output {index}: chain mismatch")]
	InvalidChain { index: usize },
	/// Attested output amount is below the order's amount.
	#[error("Output {index}: attested {actual}, expected at least {expected}")]
	InvalidAmount {
		index: usize,
		expected: U256,
		actual: U256,
	},
}

/// Source of truth for what was delivered on a target chain.
pub trait SettlementOracle: Send + Sync {
	/// Outputs `target_filler` is attested to have delivered for `order_hash`,
	/// in order. Empty when nothing was attested.
	fn get_filled_outputs(
		&self,
		order_hash: B256,
		target_filler: Address,
	) -> Result<Vec<OutputToken>, ContractError>;
}

/// Trait defining the interface for settlement record backends.
///
/// Writes are check-and-set so that a transition only lands on the state it
/// was computed from.
pub trait SettlementStorage: Send + Sync {
	fn get(&self, order_hash: B256) -> Result<Option<ActiveSettlement>, StorageError>;

	/// Stores a new record; fails if one already exists.
	fn insert_new(&self, order_hash: B256, settlement: ActiveSettlement) -> Result<(), StorageError>;

	/// Replaces the record, provided it is still in status `expected`.
	fn replace(
		&self,
		order_hash: B256,
		expected: SettlementStatus,
		settlement: ActiveSettlement,
	) -> Result<(), StorageError>;
}
