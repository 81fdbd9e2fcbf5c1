use std::collections::HashMap;

use alloy_primitives::{Address, I256, U256};
use ruint::uint;

use crate::liquidity_math::liquidity_for_amounts;
use crate::pool::{Pool, PoolHost};
use crate::tick_math::sqrt_ratio_at_tick;

/// Tick holding the ETH/USDC fixture price of 5000.
pub const TICK_5000: i32 = 85176;

/// The fixture pool's initial sqrt price, derived from its tick so the two
/// always form a consistent pair.
pub fn sqrt_p_5000() -> U256 {
    sqrt_ratio_at_tick(TICK_5000).unwrap()
}

pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * uint!(1000000000000000000_U256)
}

/// In-memory two-token ledger standing in for the external asset ledgers,
/// doubling as the pool caller. Deposits requested through the callbacks are
/// funded from `user` unless `shortchange` is set.
pub struct LedgerHarness {
    pub token0: Address,
    pub token1: Address,
    pub user: Address,
    pub shortchange: bool,
    pool_balances: HashMap<Address, U256>,
    user_balances: HashMap<(Address, Address), U256>,
}

impl LedgerHarness {
    pub fn new() -> Self {
        let token0 = Address::repeat_byte(0xee);
        let token1 = Address::repeat_byte(0xcc);
        let user = Address::repeat_byte(0xab);

        let mut user_balances = HashMap::new();
        let funding = U256::from(1u64) << 128;
        user_balances.insert((token0, user), funding);
        user_balances.insert((token1, user), funding);

        Self {
            token0,
            token1,
            user,
            shortchange: false,
            pool_balances: HashMap::new(),
            user_balances,
        }
    }

    pub fn pool_balance(&self, token: Address) -> U256 {
        self.pool_balances.get(&token).copied().unwrap_or_default()
    }

    pub fn user_balance(&self, token: Address, holder: Address) -> U256 {
        self.user_balances
            .get(&(token, holder))
            .copied()
            .unwrap_or_default()
    }

    fn fund_pool(&mut self, token: Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        let from = (token, self.user);
        let available = self.user_balance(token, self.user);
        assert!(available >= amount, "test user out of funds");
        self.user_balances.insert(from, available - amount);
        let pool = self.pool_balance(token);
        self.pool_balances.insert(token, pool + amount);
    }
}

impl PoolHost for LedgerHarness {
    fn balance_of(&self, token: Address) -> U256 {
        self.pool_balance(token)
    }

    fn pay(&mut self, token: Address, to: Address, amount: U256) {
        let pool = self.pool_balance(token);
        assert!(pool >= amount, "pool overdrawn");
        self.pool_balances.insert(token, pool - amount);
        let held = self.user_balance(token, to);
        self.user_balances.insert((token, to), held + amount);
    }

    fn on_mint_owed(&mut self, amount0_owed: U256, amount1_owed: U256, _data: &[u8]) {
        if self.shortchange {
            return;
        }
        let (token0, token1) = (self.token0, self.token1);
        self.fund_pool(token0, amount0_owed);
        self.fund_pool(token1, amount1_owed);
    }

    fn on_swap_deltas(&mut self, amount0: I256, amount1: I256, _data: &[u8]) {
        if self.shortchange {
            return;
        }
        let (token0, token1) = (self.token0, self.token1);
        if amount0.is_positive() {
            self.fund_pool(token0, amount0.unsigned_abs());
        }
        if amount1.is_positive() {
            self.fund_pool(token1, amount1.unsigned_abs());
        }
    }
}

/// Mints a range funded with the given token amounts at the pool's current
/// price and returns the minted liquidity.
pub fn mint_range(
    pool: &mut Pool,
    harness: &mut LedgerHarness,
    lower_tick: i32,
    upper_tick: i32,
    amount0: U256,
    amount1: U256,
) -> u128 {
    let liquidity = liquidity_for_amounts(
        pool.slot0.sqrt_price_x96,
        sqrt_ratio_at_tick(lower_tick).unwrap(),
        sqrt_ratio_at_tick(upper_tick).unwrap(),
        amount0,
        amount1,
    )
    .unwrap();

    let owner = harness.user;
    pool.mint(harness, owner, lower_tick, upper_tick, liquidity, b"")
        .unwrap();
    liquidity
}
