//! In-memory settlement record store.

use crate::{SettlementStorage, StorageError};
use alloy_primitives::B256;
use reactor_types::{ActiveSettlement, SettlementStatus};
use std::collections::HashMap;
use std::sync::RwLock;

/// Settlement records held in a map behind a lock.
#[derive(Debug, Default)]
pub struct MemorySettlementStorage {
	records: RwLock<HashMap<B256, ActiveSettlement>>,
}

impl MemorySettlementStorage {
	pub fn new() -> Self {
		Self::default()
	}
}

impl SettlementStorage for MemorySettlementStorage {
	fn get(&self, order_hash: B256) -> Result<Option<ActiveSettlement>, StorageError> {
		let records = self
			.records
			.read()
			.map_err(|e| StorageError::Backend(format!("Failed to acquire read lock: {}", e)))?;
		Ok(records.get(&order_hash).cloned())
	}

	fn insert_new(&self, order_hash: B256, settlement: ActiveSettlement) -> Result<(), StorageError> {
		let mut records = self
			.records
			.write()
			.map_err(|e| StorageError::Backend(format!("Failed to acquire write lock: {}", e)))?;
		if records.contains_key(&order_hash) {
			return Err(StorageError::AlreadyExists(order_hash));
		}
		records.insert(order_hash, settlement);
		Ok(())
	}

	fn replace(
		&self,
		order_hash: B256,
		expected: SettlementStatus,
		settlement: ActiveSettlement,
	) -> Result<(), StorageError> {
		let mut records = self
			.records
			.write()
			.map_err(|e| StorageError::Backend(format!("Failed to acquire write lock: {}", e)))?;
		let current = records
			.get_mut(&order_hash)
			.ok_or(StorageError::NotFound(order_hash))?;
		if current.status != expected {
			return Err(StorageError::StatusMismatch {
				expected,
				actual: current.status,
			});
		}
		*current = settlement;
		Ok(())
	}
}
