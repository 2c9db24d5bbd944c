//! Permit2-style signature transfer.
//!
//! Nonces are unordered: each owner has a bitmap of 256-bit words stored in
//! the contract's storage, and a nonce `n` maps to bit `n & 0xff` of word
//! `n >> 8`. Using a nonce flips its bit; a nonce whose bit is already set is
//! rejected forever.

use crate::{PermitError, PermitTransferFrom, SignatureTransfer, TransferDetails};
use alloy_primitives::{keccak256, Address, PrimitiveSignature, B256, U256};
use alloy_sol_types::{sol, SolValue};
use reactor_chain::Chain;
use tracing::{debug, warn};

sol! {
	/// Message signed by the owner.
	struct PermitWitnessTransferFrom {
		address verifyingContract;
		uint256 chainId;
		address spender;
		address token;
		uint256 amount;
		uint256 nonce;
		uint256 deadline;
		bytes32 witness;
	}

	/// Storage key of one nonce bitmap word.
	struct NonceWord {
		address owner;
		uint256 wordPos;
	}
}

/// Signature-transfer contract deployed at a fixed address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permit2 {
	address: Address,
}

impl Permit2 {
	pub fn new(address: Address) -> Self {
		Self { address }
	}

	fn bitmap_slot(owner: Address, word_pos: U256) -> B256 {
		keccak256(
			NonceWord {
				owner,
				wordPos: word_pos,
			}
			.abi_encode(),
		)
	}

	/// Splits a nonce into its bitmap word position and bit mask.
	fn bitmap_position(nonce: U256) -> (U256, U256) {
		let word_pos = nonce >> 8;
		let bit = nonce.as_limbs()[0] & 0xff;
		(word_pos, U256::from(1) << (bit as usize))
	}

	/// Whether `nonce` has already been used or invalidated by `owner`.
	pub fn is_nonce_used(&self, chain: &Chain, owner: Address, nonce: U256) -> bool {
		let (word_pos, bit) = Self::bitmap_position(nonce);
		let bitmap = chain.storage(self.address, Self::bitmap_slot(owner, word_pos));
		!(bitmap & bit).is_zero()
	}

	fn use_unordered_nonce(
		&self,
		chain: &mut Chain,
		owner: Address,
		nonce: U256,
	) -> Result<(), PermitError> {
		let (word_pos, bit) = Self::bitmap_position(nonce);
		let slot = Self::bitmap_slot(owner, word_pos);
		let bitmap = chain.storage(self.address, slot);
		if !(bitmap & bit).is_zero() {
			return Err(PermitError::InvalidNonce);
		}
		chain.set_storage(self.address, slot, bitmap | bit);
		Ok(())
	}
}

impl SignatureTransfer for Permit2 {
	fn address(&self) -> Address {
		self.address
	}

	fn permit_digest(
		&self,
		chain_id: u64,
		spender: Address,
		permit: &PermitTransferFrom,
		witness: B256,
	) -> B256 {
		keccak256(
			PermitWitnessTransferFrom {
				verifyingContract: self.address,
				chainId: U256::from(chain_id),
				spender,
				token: permit.token,
				amount: permit.amount,
				nonce: permit.nonce,
				deadline: U256::from(permit.deadline),
				witness,
			}
			.abi_encode(),
		)
	}

	fn permit_witness_transfer_from(
		&self,
		chain: &mut Chain,
		spender: Address,
		permit: &PermitTransferFrom,
		details: TransferDetails,
		owner: Address,
		witness: B256,
		signature: &[u8],
	) -> Result<(), PermitError> {
		if chain.timestamp() > permit.deadline {
			return Err(PermitError::SignatureExpired {
				deadline: permit.deadline,
			});
		}
		if details.requested_amount > permit.amount {
			return Err(PermitError::InvalidAmount {
				requested: details.requested_amount,
				permitted: permit.amount,
			});
		}

		let digest = self.permit_digest(chain.chain_id(), spender, permit, witness);
		let signer = PrimitiveSignature::try_from(signature)
			.ok()
			.and_then(|sig| sig.recover_address_from_prehash(&digest).ok());
		if signer != Some(owner) {
			warn!(%owner, %spender, "permit signature does not match owner");
			return Err(PermitError::InvalidSigner);
		}

		chain.atomically(|chain| {
			self.use_unordered_nonce(chain, owner, permit.nonce)?;
			chain.transfer(permit.token, owner, details.to, details.requested_amount)?;
			Ok::<(), PermitError>(())
		})?;

		debug!(
			%owner,
			to = %details.to,
			amount = %details.requested_amount,
			nonce = %permit.nonce,
			"permit transfer executed"
		);
		Ok(())
	}

	fn invalidate_unordered_nonces(
		&self,
		chain: &mut Chain,
		owner: Address,
		word_pos: U256,
		mask: U256,
	) {
		let slot = Self::bitmap_slot(owner, word_pos);
		let bitmap = chain.storage(self.address, slot);
		chain.set_storage(self.address, slot, bitmap | mask);
	}
}
