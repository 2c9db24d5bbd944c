//! Builds reactor components from a loaded configuration.

use alloy_primitives::Address;
use anyhow::{Context, Result};
use reactor_chain::Chain;
use reactor_config::{FeeConfig, OrderType, ReactorConfig};
use reactor_core::{BpsFeeController, ProtocolFeeEngine};
use reactor_order::{
	CrossChainLimitOrderResolver, DutchLimitOrderResolver, LimitOrderResolver, OrderResolver,
};
use reactor_types::{ResolvedCrossChainOrder, ResolvedOrder, SignedOrder};
use serde::Serialize;
use std::sync::Arc;

/// An order resolved by whichever resolver the configuration selects.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Resolved {
	Single(ResolvedOrder),
	CrossChain(ResolvedCrossChainOrder),
}

impl Resolved {
	pub fn order(&self) -> &ResolvedOrder {
		match self {
			Resolved::Single(order) => order,
			Resolved::CrossChain(resolved) => &resolved.order,
		}
	}
}

pub fn create_fee_controller(fees: &FeeConfig) -> Result<BpsFeeController> {
	let mut controller = BpsFeeController::new(fees.recipient);
	if let Some(bps) = fees.default_bps {
		controller = controller.with_default_bps(bps);
	}
	for (token, bps) in fees.token_rates()? {
		controller = controller.with_token_bps(token, bps);
	}
	Ok(controller)
}

/// Fee engine for the configured policy, disabled without a `[fees]` section.
pub fn create_fee_engine(config: &ReactorConfig) -> Result<ProtocolFeeEngine> {
	match &config.fees {
		Some(fees) => Ok(ProtocolFeeEngine::new(Arc::new(create_fee_controller(fees)?))),
		None => Ok(ProtocolFeeEngine::disabled()),
	}
}

/// Contract that pulls the offerer's input, and so the permit spender.
pub fn spender(config: &ReactorConfig) -> Result<Address> {
	match config.reactor.order_type {
		OrderType::CrossChain => config
			.settlement
			.as_ref()
			.map(|settlement| settlement.address)
			.context("Cross-chain orders need a [settlement] section"),
		OrderType::Limit | OrderType::Dutch => Ok(config.reactor.address),
	}
}

/// Resolves `signed` at the chain's time the way the configured contract
/// would, including protocol fees on single-chain orders.
pub fn resolve(config: &ReactorConfig, chain: &Chain, signed: &SignedOrder) -> Result<Resolved> {
	let resolved = match config.reactor.order_type {
		OrderType::Limit => Resolved::Single(LimitOrderResolver.resolve(chain, signed)?),
		OrderType::Dutch => Resolved::Single(DutchLimitOrderResolver.resolve(chain, signed)?),
		OrderType::CrossChain => {
			return Ok(Resolved::CrossChain(
				CrossChainLimitOrderResolver.resolve(chain, signed)?,
			));
		}
	};

	match resolved {
		Resolved::Single(mut order) => {
			create_fee_engine(config)?
				.take_fees(&mut order)
				.context("Protocol fee rejected")?;
			Ok(Resolved::Single(order))
		}
		cross_chain => Ok(cross_chain),
	}
}
