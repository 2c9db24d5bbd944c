//! Single-chain settlement for signed orders.
//!
//! The [`SettlementReactor`] takes signed orders, resolves them with its
//! order type's resolver, injects protocol fees, validates them, pulls the
//! offerers' inputs through the signature-transfer collaborator, and either
//! lets the caller pay the outputs directly or hands control to a fill
//! contract whose delivery is then checked against the promised balances.

use alloy_primitives::{Address, U256};
use reactor_chain::{ContractError, LedgerError};
use reactor_order::OrderError;
use reactor_permit::PermitError;
use thiserror::Error;

pub mod expected_balance;
pub mod fees;
pub mod reactor;
pub mod validation;

/// Re-export implementations
pub mod implementations {
	pub mod bps_fee;
}

pub use expected_balance::ExpectedBalanceTracker;
pub use fees::{FeeController, FeeError, ProtocolFeeEngine};
pub use implementations::bps_fee::BpsFeeController;
pub use reactor::SettlementReactor;
pub use validation::{OrderValidator, ValidationError};

/// Errors that abort an `execute` or `execute_batch` call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactorError {
	#[error(transparent)]
	Order(#[from] OrderError),
	#[error(transparent)]
	Validation(#[from] ValidationError),
	#[error(transparent)]
	Fee(#[from] FeeError),
	#[error(transparent)]
	Permit(#[from] PermitError),
	#[error(transparent)]
	Ledger(#[from] LedgerError),
	/// The fill contract reverted.
	#[error("Fill callback failed: {0}")]
	Callback(#[from] ContractError),
	/// No fill contract is deployed at the given address.
	#[error("No fill contract at {0}")]
	UnknownFillContract(Address),
	/// Native outputs exceeded the value sent with a direct fill.
	#[error("Insufficient native value: need {needed}, have {available}")]
	InsufficientEth { needed: U256, available: U256 },
	/// A recipient received less than promised after the fill callback.
	#[error("Insufficient output for {recipient} in {token}: expected {expected}, received {received}")]
	InsufficientOutput {
		recipient: Address,
		token: Address,
		expected: U256,
		received: U256,
	},
	/// The reactor was entered again while a call was in progress.
	#[error("Reentrant call")]
	ReentrantCall,
}
