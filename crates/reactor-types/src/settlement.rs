//! Cross-chain settlement records.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::{InputToken, OutputToken, ResolvedOrder, Timestamp};

/// A token amount posted as collateral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collateral {
	pub token: Address,
	pub amount: U256,
}

/// Lifecycle of a cross-chain settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementStatus {
	Pending,
	Challenged,
	Success,
	Cancelled,
}

impl SettlementStatus {
	/// Success and Cancelled admit no further transitions.
	pub fn is_terminal(&self) -> bool {
		matches!(self, SettlementStatus::Success | SettlementStatus::Cancelled)
	}
}

/// Settlement parameters declared by a cross-chain order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementTerms {
	/// Oracle attesting to fills on the target chain.
	pub settlement_oracle: Address,
	/// Seconds the filler has to fill on the target chain.
	pub fill_period: u64,
	/// Seconds after the fill deadline during which the fill may be challenged.
	pub optimistic_settlement_period: u64,
	/// Seconds after the optimistic deadline for the oracle to resolve a challenge.
	pub challenge_period: u64,
	/// Collateral posted by the origin-chain filler on initiation.
	pub filler_collateral: Collateral,
	/// Collateral posted by a challenger.
	pub challenger_collateral: Collateral,
}

/// A resolved cross-chain order: the canonical order plus its settlement terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCrossChainOrder {
	pub order: ResolvedOrder,
	pub terms: SettlementTerms,
}

impl ResolvedCrossChainOrder {
	pub fn hash(&self) -> B256 {
		self.order.hash
	}
}

/// Persistent per-order-hash record kept by the settler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSettlement {
	pub status: SettlementStatus,
	pub offerer: Address,
	pub origin_filler: Address,
	pub target_filler: Address,
	pub settlement_oracle: Address,
	pub fill_deadline: Timestamp,
	pub optimistic_deadline: Timestamp,
	pub challenge_deadline: Timestamp,
	/// Escrowed input.
	pub input: InputToken,
	pub filler_collateral: Collateral,
	/// Whether challenger collateral has been collected.
	pub challenged: bool,
	/// Set once the settlement is challenged.
	pub challenger: Address,
	pub challenger_collateral: Collateral,
	pub outputs: Vec<OutputToken>,
}

impl ActiveSettlement {
	/// Challenger collateral actually held, zero until challenged.
	pub fn posted_challenger_collateral(&self) -> U256 {
		if self.challenged {
			self.challenger_collateral.amount
		} else {
			U256::ZERO
		}
	}
}
