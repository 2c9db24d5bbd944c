//! Limit orders: fixed input and output amounts.

use crate::abi::{malformed, order_hash, LimitOrder};
use crate::{OrderError, OrderResolver};
use alloy_primitives::{Bytes, B256};
use alloy_sol_types::SolValue;
use reactor_chain::Chain;
use reactor_types::{ResolvedOrder, SignedOrder};

impl LimitOrder {
	pub fn encode(&self) -> Bytes {
		crate::abi::encode(self)
	}

	pub fn hash(&self) -> B256 {
		order_hash(&self.abi_encode())
	}
}

/// Resolves [`LimitOrder`] payloads. Amounts are taken verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct LimitOrderResolver;

impl OrderResolver for LimitOrderResolver {
	type Resolved = ResolvedOrder;

	fn resolve(&self, chain: &Chain, signed: &SignedOrder) -> Result<ResolvedOrder, OrderError> {
		let order = LimitOrder::abi_decode(&signed.order, true).map_err(malformed)?;
		let chain_id = chain.chain_id();

		Ok(ResolvedOrder {
			info: order.info.into(),
			input: order.input.into(),
			outputs: order
				.outputs
				.into_iter()
				.map(|output| output.on_chain(chain_id))
				.collect(),
			sig: signed.sig.clone(),
			hash: order_hash(&signed.order),
		})
	}
}
