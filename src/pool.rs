use alloy_primitives::{Address, B256, I256, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::PoolError;
use crate::liquidity_math::add_delta;
use crate::position::{position_key, Positions};
use crate::sqrt_price_math::{amount0_delta, amount1_delta};
use crate::swap_math::compute_swap_step;
use crate::tick::{TickInfo, Ticks};
use crate::tick_bitmap::TickBitmap;
use crate::tick_math::{sqrt_ratio_at_tick, tick_at_sqrt_ratio, MAX_TICK, MIN_TICK};

/// Everything the pool needs from the outside world: the two asset ledgers
/// and the caller's settlement callbacks. The opaque `data` blob passed into
/// an operation is threaded through to its callback unchanged.
pub trait PoolHost {
    /// The pool's own balance of `token`.
    fn balance_of(&self, token: Address) -> U256;

    /// Move `amount` of `token` out of the pool to `to`.
    fn pay(&mut self, token: Address, to: Address, amount: U256);

    /// Deliver at least the owed amount of each token to the pool before
    /// returning.
    fn on_mint_owed(&mut self, amount0_owed: U256, amount1_owed: U256, data: &[u8]);

    /// Settle a swap. A positive delta is owed to the pool; a negative delta
    /// has already been paid out.
    fn on_swap_deltas(&mut self, amount0: I256, amount1: I256, data: &[u8]);
}

/// The pool's price point: current sqrt price and the tick it falls in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot0 {
    pub sqrt_price_x96: U256,
    pub tick: i32,
}

/// A two-asset concentrated-liquidity pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pool {
    pub token0: Address,
    pub token1: Address,
    pub slot0: Slot0,
    /// Liquidity of the ranges covering the current tick.
    pub liquidity: u128,
    pub ticks: Ticks,
    pub tick_bitmap: TickBitmap,
    pub positions: Positions,
}

// A liquidity change staged against a range, committed only once the
// operation can no longer fail.
struct RangeChange {
    lower_tick: i32,
    upper_tick: i32,
    lower: TickInfo,
    lower_flipped: bool,
    upper: TickInfo,
    upper_flipped: bool,
    key: B256,
    position_liquidity: u128,
    pool_liquidity: u128,
    amount0: U256,
    amount1: U256,
}

#[derive(Default)]
struct StepComputations {
    sqrt_price_start_x96: U256,
    next_tick: i32,
    initialized: bool,
    sqrt_price_next_x96: U256,
    amount_in: U256,
    amount_out: U256,
}

impl Pool {
    /// A fresh pool at the given price point. The caller supplies a
    /// consistent (sqrt price, tick) pair; no cross-check is performed.
    pub fn new(token0: Address, token1: Address, sqrt_price_x96: U256, tick: i32) -> Self {
        Self {
            token0,
            token1,
            slot0: Slot0 { sqrt_price_x96, tick },
            liquidity: 0,
            ticks: Ticks::default(),
            tick_bitmap: TickBitmap::default(),
            positions: Positions::default(),
        }
    }

    /// Deposits `amount` of liquidity into `[lower_tick, upper_tick)` for
    /// `owner` and returns the token amounts owed to the pool.
    ///
    /// The host's `on_mint_owed` must make the pool's balance of each token
    /// grow by at least the owed amount; otherwise the whole mint fails with
    /// `InsufficientInputAmount` and no state changes.
    pub fn mint<H: PoolHost>(
        &mut self,
        host: &mut H,
        owner: Address,
        lower_tick: i32,
        upper_tick: i32,
        amount: u128,
        data: &[u8],
    ) -> Result<(U256, U256), PoolError> {
        if amount == 0 {
            return Err(PoolError::ZeroLiquidity);
        }
        let liquidity_delta = i128::try_from(amount).map_err(|_| PoolError::Overflow)?;
        let change = self.plan_range_change(owner, lower_tick, upper_tick, liquidity_delta)?;

        debug!(
            owner = %owner,
            lower_tick,
            upper_tick,
            amount = %amount,
            amount0 = %change.amount0,
            amount1 = %change.amount1,
            "mint"
        );

        let balance0_before = host.balance_of(self.token0);
        let balance1_before = host.balance_of(self.token1);
        host.on_mint_owed(change.amount0, change.amount1, data);

        let need0 = balance0_before
            .checked_add(change.amount0)
            .ok_or(PoolError::Overflow)?;
        let need1 = balance1_before
            .checked_add(change.amount1)
            .ok_or(PoolError::Overflow)?;
        if host.balance_of(self.token0) < need0 || host.balance_of(self.token1) < need1 {
            return Err(PoolError::InsufficientInputAmount);
        }

        self.commit_range_change(&change);
        Ok((change.amount0, change.amount1))
    }

    /// Withdraws `amount` of liquidity from `owner`'s position on
    /// `[lower_tick, upper_tick)`, paying the freed token amounts out to
    /// `owner` and returning them.
    pub fn burn<H: PoolHost>(
        &mut self,
        host: &mut H,
        owner: Address,
        lower_tick: i32,
        upper_tick: i32,
        amount: u128,
    ) -> Result<(U256, U256), PoolError> {
        if amount == 0 {
            return Err(PoolError::ZeroLiquidity);
        }
        let liquidity_delta = i128::try_from(amount).map_err(|_| PoolError::Overflow)?;
        let change = self.plan_range_change(owner, lower_tick, upper_tick, -liquidity_delta)?;

        debug!(
            owner = %owner,
            lower_tick,
            upper_tick,
            amount = %amount,
            amount0 = %change.amount0,
            amount1 = %change.amount1,
            "burn"
        );

        self.commit_range_change(&change);
        if !change.amount0.is_zero() {
            host.pay(self.token0, owner, change.amount0);
        }
        if !change.amount1.is_zero() {
            host.pay(self.token1, owner, change.amount1);
        }
        Ok((change.amount0, change.amount1))
    }

    /// Swaps exactly `amount_specified` of the input token (token0 when
    /// `zero_for_one`, token1 otherwise) for as much of the other token as
    /// the liquidity book allows, sending the output to `recipient`.
    ///
    /// Returns the signed pool-perspective deltas: positive amounts flow in,
    /// negative amounts were paid out. The host's `on_swap_deltas` must
    /// transfer the positive delta in; the negative delta is paid before the
    /// callback runs.
    pub fn swap<H: PoolHost>(
        &mut self,
        host: &mut H,
        recipient: Address,
        zero_for_one: bool,
        amount_specified: U256,
        data: &[u8],
    ) -> Result<(I256, I256), PoolError> {
        if amount_specified.is_zero() {
            return Ok((I256::ZERO, I256::ZERO));
        }

        let slot0_start = self.slot0;
        let mut sqrt_price_x96 = slot0_start.sqrt_price_x96;
        let mut tick = slot0_start.tick;
        let mut liquidity = self.liquidity;
        let mut amount_specified_remaining = amount_specified;
        let mut amount_calculated = U256::ZERO;

        while !amount_specified_remaining.is_zero() {
            let before = (sqrt_price_x96, tick, liquidity, amount_specified_remaining);

            let mut step = StepComputations {
                sqrt_price_start_x96: sqrt_price_x96,
                ..Default::default()
            };
            (step.next_tick, step.initialized) = self
                .tick_bitmap
                .next_initialized_tick_within_one_word(tick, zero_for_one);
            // the bitmap is unaware of the tick range; never step past it
            step.next_tick = step.next_tick.clamp(MIN_TICK, MAX_TICK);
            step.sqrt_price_next_x96 = sqrt_ratio_at_tick(step.next_tick)?;

            (sqrt_price_x96, step.amount_in, step.amount_out) = compute_swap_step(
                sqrt_price_x96,
                step.sqrt_price_next_x96,
                liquidity,
                amount_specified_remaining,
            )?;

            amount_specified_remaining =
                amount_specified_remaining.saturating_sub(step.amount_in);
            amount_calculated = amount_calculated
                .checked_add(step.amount_out)
                .ok_or(PoolError::Overflow)?;

            if sqrt_price_x96 == step.sqrt_price_next_x96 {
                // landed on the boundary; take its liquidity change and step
                // over it in the travel direction
                if step.initialized {
                    let mut liquidity_net = self.ticks.cross(step.next_tick);
                    if zero_for_one {
                        liquidity_net = -liquidity_net;
                    }
                    liquidity = add_delta(liquidity, liquidity_net)?;
                    trace!(tick = step.next_tick, liquidity = %liquidity, "crossed tick");
                }
                tick = if zero_for_one {
                    step.next_tick - 1
                } else {
                    step.next_tick
                };
            } else if sqrt_price_x96 != step.sqrt_price_start_x96 {
                // stopped between ticks with the budget spent
                tick = tick_at_sqrt_ratio(sqrt_price_x96)?;
                break;
            }

            if (sqrt_price_x96, tick, liquidity, amount_specified_remaining) == before {
                break;
            }
            if liquidity == 0 && !amount_specified_remaining.is_zero() {
                return Err(PoolError::NotEnoughLiquidity);
            }
        }

        let amount_in = to_int256(amount_specified - amount_specified_remaining)?;
        let amount_out = to_int256(amount_calculated)?;
        let (amount0, amount1) = if zero_for_one {
            (amount_in, -amount_out)
        } else {
            (-amount_out, amount_in)
        };

        debug!(
            zero_for_one,
            amount_specified = %amount_specified,
            amount0 = %amount0,
            amount1 = %amount1,
            end_tick = tick,
            "swap"
        );

        let (token_in, token_out, input_delta, output_delta) = if zero_for_one {
            (self.token0, self.token1, amount0, amount1)
        } else {
            (self.token1, self.token0, amount1, amount0)
        };

        if output_delta.is_negative() {
            host.pay(token_out, recipient, output_delta.unsigned_abs());
        }
        let balance_before = host.balance_of(token_in);
        host.on_swap_deltas(amount0, amount1, data);
        let need = balance_before
            .checked_add(input_delta.unsigned_abs())
            .ok_or(PoolError::Overflow)?;
        if host.balance_of(token_in) < need {
            return Err(PoolError::InsufficientInputAmount);
        }

        if tick != slot0_start.tick || sqrt_price_x96 != slot0_start.sqrt_price_x96 {
            self.slot0 = Slot0 { sqrt_price_x96, tick };
        }

        Ok((amount0, amount1))
    }

    fn plan_range_change(
        &self,
        owner: Address,
        lower_tick: i32,
        upper_tick: i32,
        liquidity_delta: i128,
    ) -> Result<RangeChange, PoolError> {
        if lower_tick >= upper_tick || lower_tick < MIN_TICK || upper_tick > MAX_TICK {
            return Err(PoolError::InvalidTickRange);
        }

        let (lower, lower_flipped) = self.ticks.get(lower_tick).update(liquidity_delta, false)?;
        let (upper, upper_flipped) = self.ticks.get(upper_tick).update(liquidity_delta, true)?;

        let key = position_key(owner, lower_tick, upper_tick);
        let position_liquidity = add_delta(self.positions.get(key), liquidity_delta)?;

        // deposits round up, withdrawals round down
        let round_up = liquidity_delta > 0;
        let liquidity = liquidity_delta.unsigned_abs();
        let sqrt_ratio_lower = sqrt_ratio_at_tick(lower_tick)?;
        let sqrt_ratio_upper = sqrt_ratio_at_tick(upper_tick)?;

        let (amount0, amount1, pool_liquidity) = if self.slot0.tick < lower_tick {
            (
                amount0_delta(sqrt_ratio_lower, sqrt_ratio_upper, liquidity, round_up)?,
                U256::ZERO,
                self.liquidity,
            )
        } else if self.slot0.tick < upper_tick {
            (
                amount0_delta(self.slot0.sqrt_price_x96, sqrt_ratio_upper, liquidity, round_up)?,
                amount1_delta(sqrt_ratio_lower, self.slot0.sqrt_price_x96, liquidity, round_up)?,
                add_delta(self.liquidity, liquidity_delta)?,
            )
        } else {
            (
                U256::ZERO,
                amount1_delta(sqrt_ratio_lower, sqrt_ratio_upper, liquidity, round_up)?,
                self.liquidity,
            )
        };

        Ok(RangeChange {
            lower_tick,
            upper_tick,
            lower,
            lower_flipped,
            upper,
            upper_flipped,
            key,
            position_liquidity,
            pool_liquidity,
            amount0,
            amount1,
        })
    }

    fn commit_range_change(&mut self, change: &RangeChange) {
        self.ticks.set(change.lower_tick, change.lower);
        self.ticks.set(change.upper_tick, change.upper);
        if change.lower_flipped {
            self.tick_bitmap.flip(change.lower_tick);
        }
        if change.upper_flipped {
            self.tick_bitmap.flip(change.upper_tick);
        }
        self.positions.set(change.key, change.position_liquidity);
        self.liquidity = change.pool_liquidity;
    }
}

fn to_int256(value: U256) -> Result<I256, PoolError> {
    if value > I256::MAX.into_raw() {
        return Err(PoolError::Overflow);
    }
    Ok(I256::from_raw(value))
}
