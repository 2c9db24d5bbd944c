//! Linear amount decay between two timestamps.

use crate::OrderError;
use alloy_primitives::U256;

/// Amount of a decaying order component at time `now`.
///
/// Before (or at) `decay_start` the start amount applies, at or after
/// `decay_end` the end amount applies, and in between the amount moves
/// linearly from start to end, rounded down. Works in both directions.
pub fn decay(
	start_amount: U256,
	end_amount: U256,
	decay_start: u64,
	decay_end: u64,
	now: u64,
) -> Result<U256, OrderError> {
	if decay_end <= now {
		return Ok(end_amount);
	}
	if decay_start >= now {
		return Ok(start_amount);
	}

	let elapsed = U256::from(now - decay_start);
	let duration = U256::from(decay_end - decay_start);
	if end_amount < start_amount {
		let delta = (start_amount - end_amount)
			.checked_mul(elapsed)
			.ok_or(OrderError::DecayOverflow)?
			/ duration;
		Ok(start_amount - delta)
	} else {
		let delta = (end_amount - start_amount)
			.checked_mul(elapsed)
			.ok_or(OrderError::DecayOverflow)?
			/ duration;
		Ok(start_amount + delta)
	}
}
