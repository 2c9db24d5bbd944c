//! Cross-chain limit orders settled through the optimistic escrow.

use crate::abi::{malformed, order_hash, CollateralData, CrossChainLimitOrder};
use crate::{OrderError, OrderResolver};
use alloy_primitives::{Address, Bytes, B256};
use alloy_sol_types::SolValue;
use reactor_chain::Chain;
use reactor_types::{
	Collateral, OutputToken, ResolvedCrossChainOrder, ResolvedOrder, SettlementTerms,
	SignedOrder,
};

impl CrossChainLimitOrder {
	pub fn encode(&self) -> Bytes {
		crate::abi::encode(self)
	}

	pub fn hash(&self) -> B256 {
		order_hash(&self.abi_encode())
	}
}

impl From<CollateralData> for Collateral {
	fn from(data: CollateralData) -> Self {
		Collateral {
			token: data.token,
			amount: data.amount,
		}
	}
}

/// Resolves [`CrossChainLimitOrder`] payloads into an order plus its
/// settlement terms. Outputs keep the target chain they were signed for.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossChainLimitOrderResolver;

impl OrderResolver for CrossChainLimitOrderResolver {
	type Resolved = ResolvedCrossChainOrder;

	fn resolve(
		&self,
		_chain: &Chain,
		signed: &SignedOrder,
	) -> Result<ResolvedCrossChainOrder, OrderError> {
		let order = CrossChainLimitOrder::abi_decode(&signed.order, true).map_err(malformed)?;
		if order.settlementOracle == Address::ZERO {
			return Err(OrderError::MissingSettlementOracle);
		}

		let outputs = order
			.outputs
			.into_iter()
			.map(|output| OutputToken {
				token: output.token,
				amount: output.amount,
				recipient: output.recipient,
				is_fee_output: false,
				chain_id: output.chainId.saturating_to::<u64>(),
			})
			.collect();

		Ok(ResolvedCrossChainOrder {
			order: ResolvedOrder {
				info: order.info.into(),
				input: order.input.into(),
				outputs,
				sig: signed.sig.clone(),
				hash: order_hash(&signed.order),
			},
			terms: SettlementTerms {
				settlement_oracle: order.settlementOracle,
				fill_period: u64::from(order.fillPeriod),
				optimistic_settlement_period: u64::from(order.optimisticSettlementPeriod),
				challenge_period: u64::from(order.challengePeriod),
				filler_collateral: order.fillerCollateral.into(),
				challenger_collateral: order.challengerCollateral.into(),
			},
		})
	}
}
