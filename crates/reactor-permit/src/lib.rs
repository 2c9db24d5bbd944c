//! Signature-based token transfers for the reactors.
//!
//! Offerers never approve a reactor directly. Instead they sign a permit that
//! binds the spender, the token, the maximum amount, a single-use nonce, a
//! deadline and a witness (the order hash). The reactor presents that permit
//! together with the order to pull exactly the resolved input amount.

use alloy_primitives::{Address, B256, U256};
use reactor_chain::{Chain, LedgerError};
use reactor_types::{ResolvedOrder, Timestamp};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod permit2;
}

pub mod signer;

pub use implementations::permit2::Permit2;
pub use signer::LocalPermitSigner;

/// Errors that can occur while verifying and executing a permit transfer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermitError {
	/// The signature does not recover to the owner for this permit.
	#[error("Invalid signer")]
	InvalidSigner,
	/// The nonce was already used or invalidated.
	#[error("Invalid nonce")]
	InvalidNonce,
	/// The permit deadline has passed.
	#[error("Signature expired at {deadline}")]
	SignatureExpired { deadline: Timestamp },
	/// More was requested than the owner permitted.
	#[error("Requested {requested} exceeds permitted {permitted}")]
	InvalidAmount { requested: U256, permitted: U256 },
	/// Signing a digest failed.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// Error that occurs when a private key cannot be parsed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	#[error(transparent)]
	Ledger(#[from] LedgerError),
}

/// What the owner signed over: token, maximum amount, nonce and deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermitTransferFrom {
	pub token: Address,
	pub amount: U256,
	pub nonce: U256,
	pub deadline: Timestamp,
}

impl PermitTransferFrom {
	/// The permit covering a resolved order's input.
	pub fn for_order(order: &ResolvedOrder) -> Self {
		Self {
			token: order.input.token,
			amount: order.input.max_amount,
			nonce: order.info.nonce,
			deadline: order.info.deadline,
		}
	}
}

/// Where the tokens go and how many of the permitted amount to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferDetails {
	pub to: Address,
	pub requested_amount: U256,
}

/// Trait defining the signature-transfer collaborator used by the reactors.
pub trait SignatureTransfer: Send + Sync {
	/// Address the collaborator is deployed at.
	fn address(&self) -> Address;

	/// Digest the owner must sign for `spender` to use `permit` with `witness`.
	fn permit_digest(
		&self,
		chain_id: u64,
		spender: Address,
		permit: &PermitTransferFrom,
		witness: B256,
	) -> B256;

	/// Verifies the owner's signature, consumes the nonce and transfers
	/// `details.requested_amount` of the permitted token from `owner`.
	#[allow(clippy::too_many_arguments)]
	fn permit_witness_transfer_from(
		&self,
		chain: &mut Chain,
		spender: Address,
		permit: &PermitTransferFrom,
		details: TransferDetails,
		owner: Address,
		witness: B256,
		signature: &[u8],
	) -> Result<(), PermitError>;

	/// Burns the nonces set in `mask` within word `word_pos` for `owner`.
	fn invalidate_unordered_nonces(
		&self,
		chain: &mut Chain,
		owner: Address,
		word_pos: U256,
		mask: U256,
	);
}
