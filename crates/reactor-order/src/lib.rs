//! Order resolution for the reactors.
//!
//! Each order type ships its own ABI encoding and its own rule for turning a
//! signed payload into concrete amounts. Resolvers implement
//! [`OrderResolver`]; a reactor is instantiated with exactly one resolver
//! type, so dispatch happens at compile time.

use reactor_chain::Chain;
use reactor_types::SignedOrder;
use thiserror::Error;

pub mod abi;
pub mod decay;

/// Re-export implementations
pub mod implementations {
	pub mod standards {
		pub mod cross_chain;
		pub mod dutch;
		pub mod limit;
	}
}

pub use implementations::standards::{
	cross_chain::CrossChainLimitOrderResolver, dutch::DutchLimitOrderResolver,
	limit::LimitOrderResolver,
};

/// Errors that can occur while resolving an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
	/// The payload is not a valid encoding of the order type.
	#[error("Malformed order: {0}")]
	Malformed(String),
	/// The decay window ends before it starts.
	#[error("Decay end time {end} before start time {start}")]
	EndTimeBeforeStartTime { start: u64, end: u64 },
	/// The order expires before its decay window closes.
	#[error("Deadline {deadline} before decay end time {end}")]
	DeadlineBeforeEndTime { deadline: u64, end: u64 },
	/// Inputs may only grow and outputs may only shrink over the decay window.
	#[error("Incorrect amounts: {0}")]
	IncorrectAmounts(String),
	/// Linear interpolation exceeded 256 bits.
	#[error("Decay computation overflowed")]
	DecayOverflow,
	/// A cross-chain order must name a settlement oracle.
	#[error("Missing settlement oracle")]
	MissingSettlementOracle,
}

/// Trait defining the interface for order type implementations.
///
/// Resolution is pure with respect to the chain: implementations may read
/// the clock and chain id but never mutate state.
pub trait OrderResolver: Send + Sync {
	/// The canonical form this order type resolves to.
	type Resolved;

	/// Decodes `signed.order` and evaluates it at the chain's current time.
	fn resolve(&self, chain: &Chain, signed: &SignedOrder) -> Result<Self::Resolved, OrderError>;
}
