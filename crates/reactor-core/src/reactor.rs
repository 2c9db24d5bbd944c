//! The single-chain settlement reactor.

use crate::expected_balance::ExpectedBalanceTracker;
use crate::fees::{FeeController, ProtocolFeeEngine};
use crate::validation::OrderValidator;
use crate::ReactorError;
use alloy_primitives::{Address, U256};
use reactor_chain::Chain;
use reactor_order::OrderResolver;
use reactor_permit::{PermitTransferFrom, SignatureTransfer, TransferDetails};
use reactor_types::{
	is_native, CallContext, ReactorEvent, ResolvedOrder, SignedOrder, DIRECT_FILL, NATIVE,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Clears the reactor's entered flag when a call unwinds.
struct EntryGuard<'a>(&'a AtomicBool);

impl<'a> EntryGuard<'a> {
	fn enter(flag: &'a AtomicBool) -> Result<Self, ReactorError> {
		if flag.swap(true, Ordering::SeqCst) {
			return Err(ReactorError::ReentrantCall);
		}
		Ok(Self(flag))
	}
}

impl Drop for EntryGuard<'_> {
	fn drop(&mut self) {
		self.0.store(false, Ordering::SeqCst);
	}
}

/// Settles signed orders of one order type on a single chain.
///
/// Fillers either pay outputs directly from their own balances (by passing
/// [`DIRECT_FILL`] as the fill contract) or nominate a fill contract that
/// receives the inputs first and must deliver every output before control
/// returns to the reactor.
pub struct SettlementReactor<R> {
	address: Address,
	resolver: R,
	permit2: Arc<dyn SignatureTransfer>,
	fees: ProtocolFeeEngine,
	validator: OrderValidator,
	entered: AtomicBool,
}

impl<R> SettlementReactor<R>
where
	R: OrderResolver<Resolved = ResolvedOrder>,
{
	/// Creates a reactor deployed at `address` with protocol fees disabled.
	pub fn new(address: Address, resolver: R, permit2: Arc<dyn SignatureTransfer>) -> Self {
		Self {
			address,
			resolver,
			permit2,
			fees: ProtocolFeeEngine::disabled(),
			validator: OrderValidator::new(address),
			entered: AtomicBool::new(false),
		}
	}

	/// Enables protocol fees sourced from `controller`.
	pub fn with_fee_controller(mut self, controller: Arc<dyn FeeController>) -> Self {
		self.fees = ProtocolFeeEngine::new(controller);
		self
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub fn resolver(&self) -> &R {
		&self.resolver
	}

	/// Executes a single order. See [`Self::execute_batch`].
	pub fn execute(
		&self,
		chain: &mut Chain,
		call: CallContext,
		order: &SignedOrder,
		fill_contract: Address,
		fill_data: &[u8],
	) -> Result<(), ReactorError> {
		self.execute_batch(
			chain,
			call,
			std::slice::from_ref(order),
			fill_contract,
			fill_data,
		)
	}

	/// Executes `orders` as one atomic unit.
	///
	/// Any failure, in any order or in the fill contract, reverts every
	/// transfer, nonce and event of the whole batch.
	pub fn execute_batch(
		&self,
		chain: &mut Chain,
		call: CallContext,
		orders: &[SignedOrder],
		fill_contract: Address,
		fill_data: &[u8],
	) -> Result<(), ReactorError> {
		let _entered = EntryGuard::enter(&self.entered)?;

		let result = chain.atomically(|chain| self.settle(chain, call, orders, fill_contract, fill_data));
		match &result {
			Ok(()) => info!(
				reactor = %self.address,
				filler = %call.sender,
				orders = orders.len(),
				"batch executed"
			),
			Err(e) => warn!(
				reactor = %self.address,
				filler = %call.sender,
				error = %e,
				"batch reverted"
			),
		}
		result
	}

	fn settle(
		&self,
		chain: &mut Chain,
		call: CallContext,
		orders: &[SignedOrder],
		fill_contract: Address,
		fill_data: &[u8],
	) -> Result<(), ReactorError> {
		if !call.value.is_zero() {
			chain.transfer(NATIVE, call.sender, self.address, call.value)?;
		}

		let direct = fill_contract == DIRECT_FILL;
		let input_recipient = if direct { call.sender } else { fill_contract };

		let mut resolved = Vec::with_capacity(orders.len());
		for signed in orders {
			let order = self.prepare(chain, signed, call.sender)?;
			self.transfer_input(chain, &order, input_recipient)?;
			chain.emit(ReactorEvent::Fill {
				order_hash: order.hash,
				filler: call.sender,
				offerer: order.info.offerer,
				nonce: order.info.nonce,
			});
			resolved.push(order);
		}

		if direct {
			self.fill_direct(chain, call, &resolved)?;
		} else {
			let contract = chain
				.fill_contract(fill_contract)
				.ok_or(ReactorError::UnknownFillContract(fill_contract))?;
			let tracker = ExpectedBalanceTracker::snapshot(chain, &resolved);
			contract.reactor_callback(chain, &resolved, call.sender, fill_data)?;
			tracker.check(chain)?;
		}

		self.refund_native(chain, call.sender)
	}

	/// Resolves, charges fees on and validates one order.
	fn prepare(
		&self,
		chain: &Chain,
		signed: &SignedOrder,
		filler: Address,
	) -> Result<ResolvedOrder, ReactorError> {
		let mut order = self.resolver.resolve(chain, signed)?;
		self.fees.take_fees(&mut order)?;
		self.validator.validate(chain, &order, filler)?;
		debug!(
			order_hash = %order.hash,
			input = %order.input.amount,
			outputs = order.outputs.len(),
			"order prepared"
		);
		Ok(order)
	}

	fn transfer_input(
		&self,
		chain: &mut Chain,
		order: &ResolvedOrder,
		to: Address,
	) -> Result<(), ReactorError> {
		self.permit2.permit_witness_transfer_from(
			chain,
			self.address,
			&PermitTransferFrom::for_order(order),
			TransferDetails {
				to,
				requested_amount: order.input.amount,
			},
			order.info.offerer,
			order.hash,
			&order.sig,
		)?;
		Ok(())
	}

	/// Pays every output from the caller. Native outputs are paid from the
	/// value sent with the call.
	fn fill_direct(
		&self,
		chain: &mut Chain,
		call: CallContext,
		orders: &[ResolvedOrder],
	) -> Result<(), ReactorError> {
		let mut native_left = call.value;
		for output in orders.iter().flat_map(|order| &order.outputs) {
			if is_native(output.token) {
				if output.amount > native_left {
					return Err(ReactorError::InsufficientEth {
						needed: output.amount,
						available: native_left,
					});
				}
				native_left -= output.amount;
				chain.transfer(NATIVE, self.address, output.recipient, output.amount)?;
			} else {
				chain.transfer(output.token, call.sender, output.recipient, output.amount)?;
			}
		}
		Ok(())
	}

	fn refund_native(&self, chain: &mut Chain, to: Address) -> Result<(), ReactorError> {
		let balance = chain.balance_of(NATIVE, self.address);
		if balance > U256::ZERO {
			debug!(%to, amount = %balance, "refunding native balance");
			chain.transfer(NATIVE, self.address, to, balance)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::implementations::bps_fee::BpsFeeController;
	use crate::{FeeError, ValidationError};
	use alloy_primitives::{Bytes, B256};
	use reactor_chain::{ContractError, ReactorCallback, ValidationHook};
	use reactor_order::abi::{
		DutchInput, DutchLimitOrder, DutchOutput, InputTokenData, LimitOrder, OrderInfoData,
		OutputTokenData,
	};
	use reactor_order::{DutchLimitOrderResolver, LimitOrderResolver};
	use reactor_permit::{LocalPermitSigner, Permit2, PermitError};
	use reactor_types::OutputToken;

	const CHAIN_ID: u64 = 1;
	const START: u64 = 1_000;
	const REACTOR: Address = Address::repeat_byte(0xee);
	const PERMIT2: Address = Address::repeat_byte(0x02);
	const FILLER: Address = Address::repeat_byte(0xf1);
	const FILL_CONTRACT: Address = Address::repeat_byte(0xfc);
	const SHORT_FILL_CONTRACT: Address = Address::repeat_byte(0xfd);
	const FEE_RECIPIENT: Address = Address::repeat_byte(0xfe);
	const TOKEN_IN: Address = Address::repeat_byte(0x10);
	const TOKEN_OUT: Address = Address::repeat_byte(0x20);

	/// Delivers every output from its own balance, minus `shortfall`.
	struct PayOutputs {
		address: Address,
		shortfall: U256,
	}

	impl ReactorCallback for PayOutputs {
		fn reactor_callback(
			&self,
			chain: &mut Chain,
			orders: &[ResolvedOrder],
			_filler: Address,
			_fill_data: &[u8],
		) -> Result<(), ContractError> {
			for output in orders.iter().flat_map(|order| &order.outputs) {
				chain.transfer(
					output.token,
					self.address,
					output.recipient,
					output.amount.saturating_sub(self.shortfall),
				)?;
			}
			Ok(())
		}
	}

	/// Delivers the outputs of the first order only.
	struct PayFirstOrder(Address);

	impl ReactorCallback for PayFirstOrder {
		fn reactor_callback(
			&self,
			chain: &mut Chain,
			orders: &[ResolvedOrder],
			_filler: Address,
			_fill_data: &[u8],
		) -> Result<(), ContractError> {
			for output in orders.iter().take(1).flat_map(|order| &order.outputs) {
				chain.transfer(output.token, self.0, output.recipient, output.amount)?;
			}
			Ok(())
		}
	}

	/// Calls back into the reactor from inside the fill callback.
	struct Reenter {
		reactor: Arc<SettlementReactor<LimitOrderResolver>>,
		order: SignedOrder,
	}

	impl ReactorCallback for Reenter {
		fn reactor_callback(
			&self,
			chain: &mut Chain,
			_orders: &[ResolvedOrder],
			filler: Address,
			_fill_data: &[u8],
		) -> Result<(), ContractError> {
			self.reactor
				.execute(chain, CallContext::new(filler), &self.order, DIRECT_FILL, &[])
				.map_err(|e| ContractError::Reverted(e.to_string()))
		}
	}

	struct AllowFiller(Address);

	impl ValidationHook for AllowFiller {
		fn validate(&self, filler: Address, _order: &ResolvedOrder) -> bool {
			filler == self.0
		}
	}

	struct StaticFees(Vec<OutputToken>);

	impl FeeController for StaticFees {
		fn get_fee_outputs(&self, _order: &ResolvedOrder) -> Vec<OutputToken> {
			self.0.clone()
		}
	}

	struct Env {
		chain: Chain,
		permit2: Arc<Permit2>,
		offerer: LocalPermitSigner,
	}

	impl Env {
		fn new() -> Self {
			let offerer = LocalPermitSigner::from_bytes(B256::repeat_byte(0x42)).unwrap();
			let mut chain = Chain::new(CHAIN_ID, START);
			let fund = U256::from(1_000_000);
			chain.mint(TOKEN_IN, offerer.address(), fund).unwrap();
			chain.mint(TOKEN_OUT, FILLER, fund).unwrap();
			chain.mint(TOKEN_OUT, FILL_CONTRACT, fund).unwrap();
			chain.mint(TOKEN_OUT, SHORT_FILL_CONTRACT, fund).unwrap();
			chain.mint(NATIVE, FILLER, U256::from(10_000)).unwrap();
			chain.deploy_fill_contract(
				FILL_CONTRACT,
				Arc::new(PayOutputs {
					address: FILL_CONTRACT,
					shortfall: U256::ZERO,
				}),
			);
			chain.deploy_fill_contract(
				SHORT_FILL_CONTRACT,
				Arc::new(PayOutputs {
					address: SHORT_FILL_CONTRACT,
					shortfall: U256::from(1),
				}),
			);
			Self {
				chain,
				permit2: Arc::new(Permit2::new(PERMIT2)),
				offerer,
			}
		}

		fn reactor(&self) -> SettlementReactor<LimitOrderResolver> {
			SettlementReactor::new(REACTOR, LimitOrderResolver, self.permit2.clone())
		}

		fn order(&self, nonce: u64) -> LimitOrder {
			LimitOrder {
				info: OrderInfoData {
					reactor: REACTOR,
					offerer: self.offerer.address(),
					nonce: U256::from(nonce),
					deadline: U256::from(START + 100),
					validationContract: Address::ZERO,
					validationData: Bytes::new(),
				},
				input: InputTokenData {
					token: TOKEN_IN,
					amount: U256::from(1_000),
				},
				outputs: vec![OutputTokenData {
					token: TOKEN_OUT,
					amount: U256::from(2_000),
					recipient: self.offerer.address(),
					isFeeOutput: false,
				}],
			}
		}

		fn sign_permit(&self, token: Address, amount: U256, info: &OrderInfoData, hash: B256) -> Bytes {
			let permit = PermitTransferFrom {
				token,
				amount,
				nonce: info.nonce,
				deadline: info.deadline.saturating_to(),
			};
			let digest = self.permit2.permit_digest(CHAIN_ID, REACTOR, &permit, hash);
			self.offerer.sign_digest(&digest).unwrap()
		}

		fn sign(&self, order: &LimitOrder) -> SignedOrder {
			let sig = self.sign_permit(order.input.token, order.input.amount, &order.info, order.hash());
			SignedOrder::new(order.encode(), sig)
		}

		fn balance(&self, token: Address, owner: Address) -> U256 {
			self.chain.balance_of(token, owner)
		}
	}

	#[test]
	fn test_direct_fill_moves_exact_amounts() {
		let mut env = Env::new();
		let reactor = env.reactor();
		let order = env.order(0);
		let signed = env.sign(&order);
		let offerer = env.offerer.address();

		reactor
			.execute(&mut env.chain, CallContext::new(FILLER), &signed, DIRECT_FILL, &[])
			.unwrap();

		assert_eq!(env.balance(TOKEN_IN, offerer), U256::from(999_000));
		assert_eq!(env.balance(TOKEN_IN, FILLER), U256::from(1_000));
		assert_eq!(env.balance(TOKEN_OUT, offerer), U256::from(2_000));
		assert_eq!(env.balance(TOKEN_OUT, FILLER), U256::from(998_000));
		assert_eq!(
			env.chain.events(),
			&[ReactorEvent::Fill {
				order_hash: order.hash(),
				filler: FILLER,
				offerer,
				nonce: U256::ZERO,
			}]
		);
	}

	#[test]
	fn test_callback_fill_routes_input_to_fill_contract() {
		let mut env = Env::new();
		let reactor = env.reactor();
		let signed = env.sign(&env.order(0));
		let offerer = env.offerer.address();

		reactor
			.execute(&mut env.chain, CallContext::new(FILLER), &signed, FILL_CONTRACT, b"route")
			.unwrap();

		assert_eq!(env.balance(TOKEN_IN, FILL_CONTRACT), U256::from(1_000));
		assert_eq!(env.balance(TOKEN_IN, FILLER), U256::ZERO);
		assert_eq!(env.balance(TOKEN_OUT, offerer), U256::from(2_000));
		assert_eq!(env.balance(TOKEN_OUT, FILLER), U256::from(1_000_000));
		assert_eq!(env.chain.events().len(), 1);
	}

	#[test]
	fn test_replayed_order_rejected() {
		let mut env = Env::new();
		let reactor = env.reactor();
		let signed = env.sign(&env.order(3));
		let call = CallContext::new(FILLER);

		reactor
			.execute(&mut env.chain, call, &signed, DIRECT_FILL, &[])
			.unwrap();
		let err = reactor
			.execute(&mut env.chain, call, &signed, DIRECT_FILL, &[])
			.unwrap_err();

		assert_eq!(err, ReactorError::Permit(PermitError::InvalidNonce));
		assert_eq!(env.balance(TOKEN_IN, FILLER), U256::from(1_000));
		assert_eq!(env.chain.events().len(), 1);
	}

	#[test]
	fn test_signature_covers_every_order_field() {
		let mut env = Env::new();
		let reactor = env.reactor();
		let order = env.order(0);
		let sig = env.sign(&order).sig;
		let call = CallContext::new(FILLER);

		// A permissive hook, so the changed validation contract reaches the
		// signature check.
		let hook = Address::repeat_byte(0x77);
		env.chain
			.deploy_validation_hook(hook, Arc::new(AllowFiller(FILLER)));
		let mut with_hook = order.clone();
		with_hook.info.validationContract = hook;
		let err = reactor
			.execute(
				&mut env.chain,
				call,
				&SignedOrder::new(with_hook.encode(), sig.clone()),
				DIRECT_FILL,
				&[],
			)
			.unwrap_err();
		assert_eq!(err, ReactorError::Permit(PermitError::InvalidSigner));

		let mut flagged = order.clone();
		flagged.outputs[0].isFeeOutput = true;
		let err = reactor
			.execute(
				&mut env.chain,
				call,
				&SignedOrder::new(flagged.encode(), sig.clone()),
				DIRECT_FILL,
				&[],
			)
			.unwrap_err();
		assert_eq!(err, ReactorError::Permit(PermitError::InvalidSigner));

		let mut smaller = order.clone();
		smaller.outputs[0].amount = U256::from(1);
		let err = reactor
			.execute(
				&mut env.chain,
				call,
				&SignedOrder::new(smaller.encode(), sig),
				DIRECT_FILL,
				&[],
			)
			.unwrap_err();
		assert_eq!(err, ReactorError::Permit(PermitError::InvalidSigner));
		assert!(env.chain.events().is_empty());
	}

	#[test]
	fn test_order_for_other_reactor_rejected() {
		let mut env = Env::new();
		let reactor = env.reactor();
		let mut order = env.order(0);
		order.info.reactor = Address::repeat_byte(0xef);
		let signed = env.sign(&order);

		let err = reactor
			.execute(&mut env.chain, CallContext::new(FILLER), &signed, DIRECT_FILL, &[])
			.unwrap_err();

		assert!(matches!(
			err,
			ReactorError::Validation(ValidationError::InvalidReactor { .. })
		));
	}

	#[test]
	fn test_expired_order_rejected() {
		let mut env = Env::new();
		let reactor = env.reactor();
		let signed = env.sign(&env.order(0));
		env.chain.advance(101);

		let err = reactor
			.execute(&mut env.chain, CallContext::new(FILLER), &signed, DIRECT_FILL, &[])
			.unwrap_err();

		assert_eq!(
			err,
			ReactorError::Validation(ValidationError::DeadlinePassed {
				deadline: START + 100,
				now: START + 101,
			})
		);
	}

	#[test]
	fn test_validation_contract_restricts_filler() {
		let mut env = Env::new();
		let reactor = env.reactor();
		let hook = Address::repeat_byte(0x77);
		env.chain
			.deploy_validation_hook(hook, Arc::new(AllowFiller(FILLER)));
		let mut order = env.order(0);
		order.info.validationContract = hook;
		let signed = env.sign(&order);

		let other = Address::repeat_byte(0xf2);
		let err = reactor
			.execute(&mut env.chain, CallContext::new(other), &signed, DIRECT_FILL, &[])
			.unwrap_err();
		assert_eq!(
			err,
			ReactorError::Validation(ValidationError::ValidationFailed)
		);

		reactor
			.execute(&mut env.chain, CallContext::new(FILLER), &signed, DIRECT_FILL, &[])
			.unwrap();
	}

	#[test]
	fn test_protocol_fee_paid_alongside_outputs() {
		let mut env = Env::new();
		let reactor = env
			.reactor()
			.with_fee_controller(Arc::new(BpsFeeController::new(FEE_RECIPIENT).with_default_bps(5)));
		let signed = env.sign(&env.order(0));

		reactor
			.execute(&mut env.chain, CallContext::new(FILLER), &signed, FILL_CONTRACT, &[])
			.unwrap();

		assert_eq!(env.balance(TOKEN_OUT, env.offerer.address()), U256::from(2_000));
		assert_eq!(env.balance(TOKEN_OUT, FEE_RECIPIENT), U256::from(1));
	}

	#[test]
	fn test_oversized_fee_reverts() {
		let mut env = Env::new();
		let reactor = env.reactor().with_fee_controller(Arc::new(StaticFees(vec![OutputToken {
			token: TOKEN_OUT,
			amount: U256::from(2),
			recipient: FEE_RECIPIENT,
			is_fee_output: false,
			chain_id: CHAIN_ID,
		}])));
		let signed = env.sign(&env.order(0));

		let err = reactor
			.execute(&mut env.chain, CallContext::new(FILLER), &signed, DIRECT_FILL, &[])
			.unwrap_err();

		assert_eq!(
			err,
			ReactorError::Fee(FeeError::FeeTooLarge {
				token: TOKEN_OUT,
				amount: U256::from(2),
				max: U256::from(1),
			})
		);
		assert!(!env.permit2.is_nonce_used(&env.chain, env.offerer.address(), U256::ZERO));
	}

	#[test]
	fn test_batch_is_all_or_nothing() {
		let mut env = Env::new();
		let reactor = env.reactor();
		let first = env.sign(&env.order(1));
		let mut late = env.order(2);
		late.info.deadline = U256::from(START - 1);
		let late = env.sign(&late);
		let offerer = env.offerer.address();

		let err = reactor
			.execute_batch(
				&mut env.chain,
				CallContext::new(FILLER),
				&[first.clone(), late],
				DIRECT_FILL,
				&[],
			)
			.unwrap_err();

		assert!(matches!(
			err,
			ReactorError::Validation(ValidationError::DeadlinePassed { .. })
		));
		assert_eq!(env.balance(TOKEN_IN, offerer), U256::from(1_000_000));
		assert_eq!(env.balance(TOKEN_IN, FILLER), U256::ZERO);
		assert!(env.chain.events().is_empty());
		assert!(!env.permit2.is_nonce_used(&env.chain, offerer, U256::from(1)));

		reactor
			.execute(&mut env.chain, CallContext::new(FILLER), &first, DIRECT_FILL, &[])
			.unwrap();
	}

	#[test]
	fn test_batch_aggregates_outputs_per_recipient() {
		let mut env = Env::new();
		let reactor = env.reactor();
		let orders = [env.sign(&env.order(1)), env.sign(&env.order(2))];

		reactor
			.execute_batch(&mut env.chain, CallContext::new(FILLER), &orders, FILL_CONTRACT, &[])
			.unwrap();

		assert_eq!(env.balance(TOKEN_OUT, env.offerer.address()), U256::from(4_000));
		assert_eq!(env.balance(TOKEN_IN, FILL_CONTRACT), U256::from(2_000));
		assert_eq!(env.chain.events().len(), 2);
	}

	#[test]
	fn test_short_delivery_reverts_batch() {
		let mut env = Env::new();
		let reactor = env.reactor();
		let signed = env.sign(&env.order(0));
		let offerer = env.offerer.address();

		let err = reactor
			.execute(&mut env.chain, CallContext::new(FILLER), &signed, SHORT_FILL_CONTRACT, &[])
			.unwrap_err();

		assert_eq!(
			err,
			ReactorError::InsufficientOutput {
				recipient: offerer,
				token: TOKEN_OUT,
				expected: U256::from(2_000),
				received: U256::from(1_999),
			}
		);
		assert_eq!(env.balance(TOKEN_OUT, offerer), U256::ZERO);
		assert_eq!(env.balance(TOKEN_IN, SHORT_FILL_CONTRACT), U256::ZERO);
	}

	#[test]
	fn test_undelivered_order_reverts_whole_batch() {
		let mut env = Env::new();
		let reactor = env.reactor();
		let partial = Address::repeat_byte(0xcc);
		let other_recipient = Address::repeat_byte(0xbb);
		env.chain
			.mint(TOKEN_OUT, partial, U256::from(1_000_000))
			.unwrap();
		env.chain
			.deploy_fill_contract(partial, Arc::new(PayFirstOrder(partial)));
		let mut second = env.order(2);
		second.outputs[0].recipient = other_recipient;
		let orders = [env.sign(&env.order(1)), env.sign(&second)];
		let offerer = env.offerer.address();

		let err = reactor
			.execute_batch(&mut env.chain, CallContext::new(FILLER), &orders, partial, &[])
			.unwrap_err();

		assert_eq!(
			err,
			ReactorError::InsufficientOutput {
				recipient: other_recipient,
				token: TOKEN_OUT,
				expected: U256::from(2_000),
				received: U256::ZERO,
			}
		);
		assert_eq!(env.balance(TOKEN_OUT, offerer), U256::ZERO);
		assert_eq!(env.balance(TOKEN_IN, partial), U256::ZERO);
		assert_eq!(env.balance(TOKEN_IN, offerer), U256::from(1_000_000));
		assert!(env.chain.events().is_empty());
		assert!(!env.permit2.is_nonce_used(&env.chain, offerer, U256::from(1)));
		assert!(!env.permit2.is_nonce_used(&env.chain, offerer, U256::from(2)));
	}

	#[test]
	fn test_unknown_fill_contract_rejected() {
		let mut env = Env::new();
		let reactor = env.reactor();
		let signed = env.sign(&env.order(0));
		let nowhere = Address::repeat_byte(0x99);

		let err = reactor
			.execute(&mut env.chain, CallContext::new(FILLER), &signed, nowhere, &[])
			.unwrap_err();

		assert_eq!(err, ReactorError::UnknownFillContract(nowhere));
		assert_eq!(env.balance(TOKEN_IN, nowhere), U256::ZERO);
	}

	#[test]
	fn test_native_outputs_paid_from_value_and_excess_refunded() {
		let mut env = Env::new();
		let reactor = env.reactor();
		let mut order = env.order(0);
		order.outputs[0].token = NATIVE;
		order.outputs[0].amount = U256::from(500);
		let signed = env.sign(&order);
		let offerer = env.offerer.address();

		let err = reactor
			.execute(
				&mut env.chain,
				CallContext::new(FILLER).with_value(U256::from(400)),
				&signed,
				DIRECT_FILL,
				&[],
			)
			.unwrap_err();
		assert_eq!(
			err,
			ReactorError::InsufficientEth {
				needed: U256::from(500),
				available: U256::from(400),
			}
		);
		assert_eq!(env.balance(NATIVE, FILLER), U256::from(10_000));

		reactor
			.execute(
				&mut env.chain,
				CallContext::new(FILLER).with_value(U256::from(700)),
				&signed,
				DIRECT_FILL,
				&[],
			)
			.unwrap();
		assert_eq!(env.balance(NATIVE, offerer), U256::from(500));
		assert_eq!(env.balance(NATIVE, FILLER), U256::from(9_500));
		assert_eq!(env.balance(NATIVE, REACTOR), U256::ZERO);
	}

	#[test]
	fn test_reentrant_execute_rejected() {
		let mut env = Env::new();
		let reactor = Arc::new(env.reactor());
		let reentrant = Address::repeat_byte(0xfb);
		let inner = env.sign(&env.order(9));
		env.chain.deploy_fill_contract(
			reentrant,
			Arc::new(Reenter {
				reactor: reactor.clone(),
				order: inner,
			}),
		);
		let signed = env.sign(&env.order(0));

		let err = reactor
			.execute(&mut env.chain, CallContext::new(FILLER), &signed, reentrant, &[])
			.unwrap_err();

		assert_eq!(
			err,
			ReactorError::Callback(ContractError::Reverted(
				ReactorError::ReentrantCall.to_string()
			))
		);
		// The guard is released once the outer call unwinds.
		reactor
			.execute(&mut env.chain, CallContext::new(FILLER), &signed, DIRECT_FILL, &[])
			.unwrap();
	}

	#[test]
	fn test_dutch_reactor_pulls_decayed_input() {
		let mut env = Env::new();
		let reactor = SettlementReactor::new(REACTOR, DutchLimitOrderResolver, env.permit2.clone());
		let offerer = env.offerer.address();
		let order = DutchLimitOrder {
			info: OrderInfoData {
				reactor: REACTOR,
				offerer,
				nonce: U256::from(1),
				deadline: U256::from(START + 200),
				validationContract: Address::ZERO,
				validationData: Bytes::new(),
			},
			decayStartTime: U256::from(START),
			decayEndTime: U256::from(START + 100),
			input: DutchInput {
				token: TOKEN_IN,
				startAmount: U256::from(1_000),
				endAmount: U256::from(1_500),
			},
			outputs: vec![DutchOutput {
				token: TOKEN_OUT,
				startAmount: U256::from(2_000),
				endAmount: U256::from(1_000),
				recipient: offerer,
				isFeeOutput: false,
			}],
		};
		let sig = env.sign_permit(TOKEN_IN, U256::from(1_500), &order.info, order.hash());
		let signed = SignedOrder::new(order.encode(), sig);
		env.chain.advance(50);

		reactor
			.execute(&mut env.chain, CallContext::new(FILLER), &signed, DIRECT_FILL, &[])
			.unwrap();

		assert_eq!(env.balance(TOKEN_IN, FILLER), U256::from(1_250));
		assert_eq!(env.balance(TOKEN_OUT, offerer), U256::from(1_500));
	}
}
