//! Host context the reactors execute against.
//!
//! A [`Chain`] bundles everything a settlement call reads or writes: token
//! balances, contract storage, the clock, the event log, and the contracts
//! deployed at known addresses (validation hooks and fill contracts). It is
//! passed explicitly to every operation so that time is injected rather than
//! read from a global, and so that a failed call can be rolled back as a unit
//! with [`Chain::atomically`].

use alloy_primitives::{Address, B256, U256};
use reactor_types::{ReactorEvent, ResolvedOrder, Timestamp};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub mod ledger;

pub use ledger::{Ledger, LedgerError};

/// Errors raised by contracts deployed on the chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
	/// The contract rejected the call.
	#[error("Contract reverted: {0}")]
	Reverted(String),
	/// A token movement made by the contract failed.
	#[error(transparent)]
	Ledger(#[from] LedgerError),
}

/// Per-order validation callback chosen by the offerer.
///
/// Lets an offerer impose arbitrary extra conditions (allowed fillers,
/// minimum fill size, ...) without changes to the reactor.
pub trait ValidationHook: Send + Sync {
	/// Returns whether `filler` may fill `order`.
	fn validate(&self, filler: Address, order: &ResolvedOrder) -> bool;
}

/// A fill contract invoked by the reactor after inputs were transferred to it.
///
/// The contract is expected to deliver every output of every order to its
/// recipient before returning.
pub trait ReactorCallback: Send + Sync {
	fn reactor_callback(
		&self,
		chain: &mut Chain,
		orders: &[ResolvedOrder],
		filler: Address,
		fill_data: &[u8],
	) -> Result<(), ContractError>;
}

/// The simulated chain a reactor is deployed on.
#[derive(Clone, Default)]
pub struct Chain {
	chain_id: u64,
	timestamp: Timestamp,
	ledger: Ledger,
	storage: HashMap<(Address, B256), U256>,
	events: Vec<ReactorEvent>,
	validation_hooks: HashMap<Address, Arc<dyn ValidationHook>>,
	fill_contracts: HashMap<Address, Arc<dyn ReactorCallback>>,
}

impl fmt::Debug for Chain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Chain")
			.field("chain_id", &self.chain_id)
			.field("timestamp", &self.timestamp)
			.field("ledger", &self.ledger)
			.field("events", &self.events.len())
			.field("validation_hooks", &self.validation_hooks.len())
			.field("fill_contracts", &self.fill_contracts.len())
			.finish()
	}
}

impl Chain {
	/// Creates an empty chain with the given id, starting at `timestamp`.
	pub fn new(chain_id: u64, timestamp: Timestamp) -> Self {
		Self {
			chain_id,
			timestamp,
			..Default::default()
		}
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	/// Current block timestamp.
	pub fn timestamp(&self) -> Timestamp {
		self.timestamp
	}

	/// Moves the clock to `timestamp`. The clock never goes backwards.
	pub fn set_timestamp(&mut self, timestamp: Timestamp) {
		self.timestamp = self.timestamp.max(timestamp);
	}

	/// Advances the clock by `seconds`.
	pub fn advance(&mut self, seconds: u64) {
		self.timestamp = self.timestamp.saturating_add(seconds);
	}

	pub fn ledger(&self) -> &Ledger {
		&self.ledger
	}

	pub fn balance_of(&self, token: Address, owner: Address) -> U256 {
		self.ledger.balance_of(token, owner)
	}

	pub fn mint(&mut self, token: Address, owner: Address, amount: U256) -> Result<(), LedgerError> {
		self.ledger.mint(token, owner, amount)
	}

	pub fn transfer(
		&mut self,
		token: Address,
		from: Address,
		to: Address,
		amount: U256,
	) -> Result<(), LedgerError> {
		debug!(%token, %from, %to, %amount, "transfer");
		self.ledger.transfer(token, from, to, amount)
	}

	/// Reads a storage slot of `contract`.
	pub fn storage(&self, contract: Address, slot: B256) -> U256 {
		self.storage
			.get(&(contract, slot))
			.copied()
			.unwrap_or(U256::ZERO)
	}

	/// Writes a storage slot of `contract`.
	pub fn set_storage(&mut self, contract: Address, slot: B256, value: U256) {
		if value.is_zero() {
			self.storage.remove(&(contract, slot));
		} else {
			self.storage.insert((contract, slot), value);
		}
	}

	/// Appends an event to the log.
	pub fn emit(&mut self, event: ReactorEvent) {
		debug!(order_hash = %event.order_hash(), "event emitted");
		self.events.push(event);
	}

	/// Events emitted so far.
	pub fn events(&self) -> &[ReactorEvent] {
		&self.events
	}

	/// Removes and returns every event emitted so far.
	pub fn drain_events(&mut self) -> Vec<ReactorEvent> {
		std::mem::take(&mut self.events)
	}

	/// Deploys a validation hook at `address`.
	pub fn deploy_validation_hook(&mut self, address: Address, hook: Arc<dyn ValidationHook>) {
		self.validation_hooks.insert(address, hook);
	}

	pub fn validation_hook(&self, address: Address) -> Option<Arc<dyn ValidationHook>> {
		self.validation_hooks.get(&address).cloned()
	}

	/// Deploys a fill contract at `address`.
	pub fn deploy_fill_contract(&mut self, address: Address, contract: Arc<dyn ReactorCallback>) {
		self.fill_contracts.insert(address, contract);
	}

	pub fn fill_contract(&self, address: Address) -> Option<Arc<dyn ReactorCallback>> {
		self.fill_contracts.get(&address).cloned()
	}

	/// Runs `f` as one atomic unit: if it fails, every change it made to the
	/// chain (balances, storage, events, deployments) is discarded.
	pub fn atomically<T, E>(
		&mut self,
		f: impl FnOnce(&mut Chain) -> Result<T, E>,
	) -> Result<T, E> {
		let snapshot = self.clone();
		let result = f(self);
		if result.is_err() {
			*self = snapshot;
		}
		result
	}
}
