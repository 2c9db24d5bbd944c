//! Dutch limit orders: amounts decay linearly over a time window.
//!
//! The input may only grow from its start to its end amount and every
//! output may only shrink, so the order gets better for fillers as time
//! passes. The offerer signs a permit for the input's end amount, the most
//! the order can ever pull.

use crate::abi::{malformed, order_hash, timestamp, DutchLimitOrder};
use crate::decay::decay;
use crate::{OrderError, OrderResolver};
use alloy_primitives::{Bytes, B256};
use alloy_sol_types::SolValue;
use reactor_chain::Chain;
use reactor_types::{InputToken, OrderInfo, OutputToken, ResolvedOrder, SignedOrder};
use tracing::debug;

impl DutchLimitOrder {
	pub fn encode(&self) -> Bytes {
		crate::abi::encode(self)
	}

	pub fn hash(&self) -> B256 {
		order_hash(&self.abi_encode())
	}

	/// Checks the invariants every Dutch order must satisfy.
	fn validate(&self) -> Result<(), OrderError> {
		let start = timestamp(self.decayStartTime);
		let end = timestamp(self.decayEndTime);
		if end < start {
			return Err(OrderError::EndTimeBeforeStartTime { start, end });
		}

		let deadline = timestamp(self.info.deadline);
		if deadline < end {
			return Err(OrderError::DeadlineBeforeEndTime { deadline, end });
		}

		if self.input.startAmount > self.input.endAmount {
			return Err(OrderError::IncorrectAmounts(
				"input start amount exceeds end amount".to_string(),
			));
		}

		if let Some(index) = self
			.outputs
			.iter()
			.position(|output| output.startAmount < output.endAmount)
		{
			return Err(OrderError::IncorrectAmounts(format!(
				"output {} start amount below end amount",
				index
			)));
		}

		Ok(())
	}
}

/// Resolves [`DutchLimitOrder`] payloads at the chain's current time.
#[derive(Debug, Clone, Copy, Default)]
pub struct DutchLimitOrderResolver;

impl OrderResolver for DutchLimitOrderResolver {
	type Resolved = ResolvedOrder;

	fn resolve(&self, chain: &Chain, signed: &SignedOrder) -> Result<ResolvedOrder, OrderError> {
		let order = DutchLimitOrder::abi_decode(&signed.order, true).map_err(malformed)?;
		order.validate()?;

		let now = chain.timestamp();
		let start = timestamp(order.decayStartTime);
		let end = timestamp(order.decayEndTime);

		let input = InputToken {
			token: order.input.token,
			amount: decay(order.input.startAmount, order.input.endAmount, start, end, now)?,
			max_amount: order.input.endAmount,
		};

		let outputs = order
			.outputs
			.iter()
			.map(|output| {
				Ok(OutputToken {
					token: output.token,
					amount: decay(output.startAmount, output.endAmount, start, end, now)?,
					recipient: output.recipient,
					is_fee_output: output.isFeeOutput,
					chain_id: chain.chain_id(),
				})
			})
			.collect::<Result<Vec<_>, OrderError>>()?;

		let hash = order_hash(&signed.order);
		debug!(order_hash = %hash, now, start, end, "resolved dutch order");

		Ok(ResolvedOrder {
			info: OrderInfo::from(order.info),
			input,
			outputs,
			sig: signed.sig.clone(),
			hash,
		})
	}
}
