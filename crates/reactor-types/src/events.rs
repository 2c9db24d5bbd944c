//! Events emitted by the reactor and the cross-chain settler.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::{Collateral, InputToken, OutputToken, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactorEvent {
	/// An order's input was transferred to its filler.
	Fill {
		order_hash: B256,
		filler: Address,
		offerer: Address,
		nonce: U256,
	},
	InitiateSettlement {
		order_hash: B256,
		offerer: Address,
		origin_filler: Address,
		target_filler: Address,
		settlement_oracle: Address,
		fill_deadline: Timestamp,
		optimistic_deadline: Timestamp,
		challenge_deadline: Timestamp,
		input: InputToken,
		filler_collateral: Collateral,
		outputs: Vec<OutputToken>,
	},
	SettlementChallenged {
		order_hash: B256,
		challenger: Address,
	},
	FinalizeSettlement {
		order_hash: B256,
		origin_filler: Address,
	},
	CancelSettlement {
		order_hash: B256,
		offerer: Address,
	},
}

impl ReactorEvent {
	pub fn order_hash(&self) -> B256 {
		match self {
			ReactorEvent::Fill { order_hash, .. }
			| ReactorEvent::InitiateSettlement { order_hash, .. }
			| ReactorEvent::SettlementChallenged { order_hash, .. }
			| ReactorEvent::FinalizeSettlement { order_hash, .. }
			| ReactorEvent::CancelSettlement { order_hash, .. } => *order_hash,
		}
	}
}
