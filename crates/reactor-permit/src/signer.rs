//! Local key signer for permits.

use crate::PermitError;
use alloy_primitives::{Address, Bytes, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

/// Signs permit digests with a locally held private key.
#[derive(Debug, Clone)]
pub struct LocalPermitSigner {
	signer: PrivateKeySigner,
}

impl LocalPermitSigner {
	/// Creates a signer from a hex-encoded private key (with or without 0x prefix).
	pub fn new(private_key_hex: &str) -> Result<Self, PermitError> {
		let signer = private_key_hex
			.parse::<PrivateKeySigner>()
			.map_err(|e| PermitError::InvalidKey(e.to_string()))?;
		Ok(Self { signer })
	}

	/// Creates a signer from raw private key bytes.
	pub fn from_bytes(key: B256) -> Result<Self, PermitError> {
		let signer =
			PrivateKeySigner::from_bytes(&key).map_err(|e| PermitError::InvalidKey(e.to_string()))?;
		Ok(Self { signer })
	}

	pub fn address(&self) -> Address {
		self.signer.address()
	}

	/// Signs a prehashed digest, returning the 65-byte r || s || v signature.
	pub fn sign_digest(&self, digest: &B256) -> Result<Bytes, PermitError> {
		let signature = self
			.signer
			.sign_hash_sync(digest)
			.map_err(|e| PermitError::SigningFailed(e.to_string()))?;
		Ok(Bytes::from(signature.as_bytes().to_vec()))
	}
}
