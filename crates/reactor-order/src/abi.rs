//! ABI wire formats of the supported order types.
//!
//! IMPORTANT: Field order is part of the signed encoding. Changing it changes
//! every order hash and invalidates outstanding signatures.

use crate::OrderError;
use alloy_primitives::{keccak256, Bytes, B256, U256};
use alloy_sol_types::{sol, SolValue};
use reactor_types::{InputToken, OrderInfo, OutputToken};

sol! {
	/// Order metadata common to every order type.
	#[derive(Debug, PartialEq, Eq)]
	struct OrderInfoData {
		address reactor;
		address offerer;
		uint256 nonce;
		uint256 deadline;
		address validationContract;
		bytes validationData;
	}

	#[derive(Debug, PartialEq, Eq)]
	struct InputTokenData {
		address token;
		uint256 amount;
	}

	#[derive(Debug, PartialEq, Eq)]
	struct OutputTokenData {
		address token;
		uint256 amount;
		address recipient;
		bool isFeeOutput;
	}

	/// Fixed-amount order.
	#[derive(Debug, PartialEq, Eq)]
	struct LimitOrder {
		OrderInfoData info;
		InputTokenData input;
		OutputTokenData[] outputs;
	}

	#[derive(Debug, PartialEq, Eq)]
	struct DutchInput {
		address token;
		uint256 startAmount;
		uint256 endAmount;
	}

	#[derive(Debug, PartialEq, Eq)]
	struct DutchOutput {
		address token;
		uint256 startAmount;
		uint256 endAmount;
		address recipient;
		bool isFeeOutput;
	}

	/// Order whose amounts decay linearly between two timestamps.
	#[derive(Debug, PartialEq, Eq)]
	struct DutchLimitOrder {
		OrderInfoData info;
		uint256 decayStartTime;
		uint256 decayEndTime;
		DutchInput input;
		DutchOutput[] outputs;
	}

	#[derive(Debug, PartialEq, Eq)]
	struct CollateralData {
		address token;
		uint256 amount;
	}

	#[derive(Debug, PartialEq, Eq)]
	struct SettlementOutputData {
		address token;
		uint256 amount;
		address recipient;
		uint256 chainId;
	}

	/// Fixed-amount order settled through the cross-chain escrow.
	#[derive(Debug, PartialEq, Eq)]
	struct CrossChainLimitOrder {
		OrderInfoData info;
		address settlementOracle;
		uint32 fillPeriod;
		uint32 optimisticSettlementPeriod;
		uint32 challengePeriod;
		InputTokenData input;
		CollateralData fillerCollateral;
		CollateralData challengerCollateral;
		SettlementOutputData[] outputs;
	}
}

/// ABI-encodes an order.
pub fn encode<T: SolValue>(order: &T) -> Bytes {
	Bytes::from(order.abi_encode())
}

/// Maps an ABI decoding failure to a resolution error.
pub(crate) fn malformed(err: alloy_sol_types::Error) -> OrderError {
	OrderError::Malformed(err.to_string())
}

/// Stable identifier of an encoded order.
pub fn order_hash(encoded: &[u8]) -> B256 {
	keccak256(encoded)
}

/// Clamps an on-chain uint256 timestamp into the host's u64 clock domain.
pub(crate) fn timestamp(value: U256) -> u64 {
	value.saturating_to::<u64>()
}

impl From<OrderInfoData> for OrderInfo {
	fn from(data: OrderInfoData) -> Self {
		OrderInfo {
			reactor: data.reactor,
			offerer: data.offerer,
			nonce: data.nonce,
			deadline: timestamp(data.deadline),
			validation_contract: data.validationContract,
			validation_data: data.validationData,
		}
	}
}

impl From<OrderInfo> for OrderInfoData {
	fn from(info: OrderInfo) -> Self {
		OrderInfoData {
			reactor: info.reactor,
			offerer: info.offerer,
			nonce: info.nonce,
			deadline: U256::from(info.deadline),
			validationContract: info.validation_contract,
			validationData: info.validation_data,
		}
	}
}

impl From<InputTokenData> for InputToken {
	fn from(data: InputTokenData) -> Self {
		InputToken {
			token: data.token,
			amount: data.amount,
			max_amount: data.amount,
		}
	}
}

impl OutputTokenData {
	/// Output delivered on `chain_id`.
	pub fn on_chain(self, chain_id: u64) -> OutputToken {
		OutputToken {
			token: self.token,
			amount: self.amount,
			recipient: self.recipient,
			is_fee_output: self.isFeeOutput,
			chain_id,
		}
	}
}
