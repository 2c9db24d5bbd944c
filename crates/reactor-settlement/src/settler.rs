//! The cross-chain settler: escrow, challenge, finalize and cancel.

use crate::implementations::memory::MemorySettlementStorage;
use crate::{SettlementError, SettlementOracle, SettlementStorage};
use alloy_primitives::{Address, B256, U256};
use reactor_chain::Chain;
use reactor_core::OrderValidator;
use reactor_order::{CrossChainLimitOrderResolver, OrderResolver};
use reactor_permit::{PermitTransferFrom, SignatureTransfer, TransferDetails};
use reactor_types::{
	ActiveSettlement, OutputToken, ReactorEvent, ResolvedCrossChainOrder, SettlementStatus,
	SignedOrder,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Escrows cross-chain orders on the origin chain and releases them once the
/// fill on the target chain is either unchallenged or attested.
pub struct CrossChainSettler<R = CrossChainLimitOrderResolver> {
	address: Address,
	resolver: R,
	permit2: Arc<dyn SignatureTransfer>,
	validator: OrderValidator,
	oracles: HashMap<Address, Arc<dyn SettlementOracle>>,
	storage: Box<dyn SettlementStorage>,
}

impl<R> CrossChainSettler<R>
where
	R: OrderResolver<Resolved = ResolvedCrossChainOrder>,
{
	/// Creates a settler deployed at `address` with in-memory records.
	pub fn new(address: Address, resolver: R, permit2: Arc<dyn SignatureTransfer>) -> Self {
		Self {
			address,
			resolver,
			permit2,
			validator: OrderValidator::new(address),
			oracles: HashMap::new(),
			storage: Box::new(MemorySettlementStorage::new()),
		}
	}

	/// Registers the oracle deployed at `address`.
	pub fn with_oracle(mut self, address: Address, oracle: Arc<dyn SettlementOracle>) -> Self {
		self.oracles.insert(address, oracle);
		self
	}

	pub fn with_storage(mut self, storage: Box<dyn SettlementStorage>) -> Self {
		self.storage = storage;
		self
	}

	pub fn address(&self) -> Address {
		self.address
	}

	/// Current record for `order_hash`, if the order was ever initiated.
	pub fn get_settlement(&self, order_hash: B256) -> Result<Option<ActiveSettlement>, SettlementError> {
		Ok(self.storage.get(order_hash)?)
	}

	/// Escrows the order's input and `filler`'s collateral and opens a
	/// pending settlement. Returns the order hash.
	pub fn initiate_settlement(
		&self,
		chain: &mut Chain,
		filler: Address,
		signed: &SignedOrder,
		target_filler: Address,
	) -> Result<B256, SettlementError> {
		chain.atomically(|chain| -> Result<B256, SettlementError> {
			let ResolvedCrossChainOrder { order, terms } = self.resolver.resolve(chain, signed)?;
			self.validator.validate(chain, &order, filler)?;

			let order_hash = order.hash;
			if self.storage.get(order_hash)?.is_some() {
				return Err(SettlementError::SettlementAlreadyInitiated(order_hash));
			}

			self.permit2.permit_witness_transfer_from(
				chain,
				self.address,
				&PermitTransferFrom::for_order(&order),
				TransferDetails {
					to: self.address,
					requested_amount: order.input.amount,
				},
				order.info.offerer,
				order_hash,
				&order.sig,
			)?;
			chain.transfer(
				terms.filler_collateral.token,
				filler,
				self.address,
				terms.filler_collateral.amount,
			)?;

			let now = chain.timestamp();
			let fill_deadline = now.saturating_add(terms.fill_period);
			let optimistic_deadline = fill_deadline.saturating_add(terms.optimistic_settlement_period);
			let challenge_deadline = optimistic_deadline.saturating_add(terms.challenge_period);

			let settlement = ActiveSettlement {
				status: SettlementStatus::Pending,
				offerer: order.info.offerer,
				origin_filler: filler,
				target_filler,
				settlement_oracle: terms.settlement_oracle,
				fill_deadline,
				optimistic_deadline,
				challenge_deadline,
				input: order.input,
				filler_collateral: terms.filler_collateral,
				challenged: false,
				challenger: Address::ZERO,
				challenger_collateral: terms.challenger_collateral,
				outputs: order.outputs,
			};
			self.storage.insert_new(order_hash, settlement.clone())?;

			chain.emit(ReactorEvent::InitiateSettlement {
				order_hash,
				offerer: settlement.offerer,
				origin_filler: filler,
				target_filler,
				settlement_oracle: settlement.settlement_oracle,
				fill_deadline,
				optimistic_deadline,
				challenge_deadline,
				input: settlement.input,
				filler_collateral: settlement.filler_collateral,
				outputs: settlement.outputs,
			});
			info!(%order_hash, %filler, %target_filler, optimistic_deadline, "settlement initiated");
			Ok(order_hash)
		})
	}

	/// Disputes a pending settlement before its optimistic deadline,
	/// escrowing the challenger's collateral.
	pub fn challenge_settlement(
		&self,
		chain: &mut Chain,
		challenger: Address,
		order_hash: B256,
	) -> Result<(), SettlementError> {
		let settlement = self.load(order_hash)?;
		if settlement.status != SettlementStatus::Pending {
			return Err(SettlementError::CanOnlyChallengePendingSettlements);
		}
		let now = chain.timestamp();
		if now >= settlement.optimistic_deadline {
			return Err(SettlementError::OptimisticPeriodOver {
				deadline: settlement.optimistic_deadline,
				now,
			});
		}

		chain.atomically(|chain| -> Result<(), SettlementError> {
			chain.transfer(
				settlement.challenger_collateral.token,
				challenger,
				self.address,
				settlement.challenger_collateral.amount,
			)?;
			let challenged = ActiveSettlement {
				status: SettlementStatus::Challenged,
				challenged: true,
				challenger,
				..settlement
			};
			self.storage
				.replace(order_hash, SettlementStatus::Pending, challenged)?;
			chain.emit(ReactorEvent::SettlementChallenged {
				order_hash,
				challenger,
			});
			info!(%order_hash, %challenger, "settlement challenged");
			Ok(())
		})
	}

	/// Pays the escrow to the origin filler.
	///
	/// An unchallenged settlement finalizes once its optimistic deadline is
	/// reached. A challenged one needs the oracle to attest matching outputs,
	/// and the filler also receives the challenger's collateral.
	pub fn finalize_settlement(&self, chain: &mut Chain, order_hash: B256) -> Result<(), SettlementError> {
		let settlement = self.load(order_hash)?;
		match settlement.status {
			SettlementStatus::Success | SettlementStatus::Cancelled => {
				return Err(SettlementError::SettlementAlreadyCompleted(order_hash));
			}
			SettlementStatus::Pending => {
				let now = chain.timestamp();
				if now < settlement.optimistic_deadline {
					return Err(SettlementError::CannotFinalizeBeforeDeadline {
						deadline: settlement.optimistic_deadline,
						now,
					});
				}
			}
			SettlementStatus::Challenged => {
				let oracle = self
					.oracles
					.get(&settlement.settlement_oracle)
					.ok_or(SettlementError::UnknownOracle(settlement.settlement_oracle))?;
				let attested = oracle.get_filled_outputs(order_hash, settlement.target_filler)?;
				verify_outputs(&settlement.outputs, &attested)?;
			}
		}

		chain.atomically(|chain| -> Result<(), SettlementError> {
			let filler = settlement.origin_filler;
			self.pay(chain, settlement.input.token, filler, settlement.input.amount)?;
			self.pay(
				chain,
				settlement.filler_collateral.token,
				filler,
				settlement.filler_collateral.amount,
			)?;
			self.pay(
				chain,
				settlement.challenger_collateral.token,
				filler,
				settlement.posted_challenger_collateral(),
			)?;

			let previous = settlement.status;
			let finalized = ActiveSettlement {
				status: SettlementStatus::Success,
				..settlement
			};
			self.storage.replace(order_hash, previous, finalized)?;
			chain.emit(ReactorEvent::FinalizeSettlement {
				order_hash,
				origin_filler: filler,
			});
			info!(%order_hash, origin_filler = %filler, "settlement finalized");
			Ok(())
		})
	}

	/// Returns the escrow and filler collateral to the offerer once the
	/// challenge deadline has passed without finalization. A challenger gets
	/// its collateral back.
	pub fn cancel_settlement(&self, chain: &mut Chain, order_hash: B256) -> Result<(), SettlementError> {
		let settlement = self.load(order_hash)?;
		if settlement.status.is_terminal() {
			return Err(SettlementError::SettlementAlreadyCompleted(order_hash));
		}
		let now = chain.timestamp();
		if now <= settlement.challenge_deadline {
			return Err(SettlementError::CannotCancelBeforeDeadline {
				deadline: settlement.challenge_deadline,
				now,
			});
		}

		chain.atomically(|chain| -> Result<(), SettlementError> {
			let offerer = settlement.offerer;
			self.pay(chain, settlement.input.token, offerer, settlement.input.amount)?;
			self.pay(
				chain,
				settlement.filler_collateral.token,
				offerer,
				settlement.filler_collateral.amount,
			)?;
			self.pay(
				chain,
				settlement.challenger_collateral.token,
				settlement.challenger,
				settlement.posted_challenger_collateral(),
			)?;

			let previous = settlement.status;
			let cancelled = ActiveSettlement {
				status: SettlementStatus::Cancelled,
				..settlement
			};
			self.storage.replace(order_hash, previous, cancelled)?;
			chain.emit(ReactorEvent::CancelSettlement { order_hash, offerer });
			info!(%order_hash, %offerer, "settlement cancelled");
			Ok(())
		})
	}

	fn load(&self, order_hash: B256) -> Result<ActiveSettlement, SettlementError> {
		self.storage
			.get(order_hash)?
			.ok_or(SettlementError::SettlementDoesNotExist(order_hash))
	}

	fn pay(&self, chain: &mut Chain, token: Address, to: Address, amount: U256) -> Result<(), SettlementError> {
		if amount.is_zero() {
			return Ok(());
		}
		debug!(%token, %to, %amount, "releasing escrow");
		chain.transfer(token, self.address, to, amount)?;
		Ok(())
	}
}

/// Compares attested outputs position by position. Over-delivery is fine.
fn verify_outputs(expected: &[OutputToken], attested: &[OutputToken]) -> Result<(), SettlementError> {
	if expected.len() != attested.len() {
		return Err(SettlementError::OutputsLengthMismatch {
			expected: expected.len(),
			actual: attested.len(),
		});
	}
	for (index, (want, got)) in expected.iter().zip(attested).enumerate() {
		if want.recipient != got.recipient {
			return Err(SettlementError::InvalidRecipient { index });
		}
		if want.token != got.token {
			return Err(SettlementError::InvalidToken { index });
		}
		if want.chain_id != got.chain_id {
			return Err(SettlementError::InvalidChain { index });
		}
		if got.amount < want.amount {
			return Err(SettlementError::InvalidAmount {
				index,
				expected: want.amount,
				actual: got.amount,
			});
		}
	}
	Ok(())
}
