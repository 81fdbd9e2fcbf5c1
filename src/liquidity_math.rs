use alloy_primitives::U256;

use crate::error::PoolError;
use crate::fixed_point_96::Q96;
use crate::full_math::mul_div;

/// Applies a signed liquidity delta to an unsigned amount.
pub fn add_delta(x: u128, y: i128) -> Result<u128, PoolError> {
    if y < 0 {
        x.checked_sub(y.unsigned_abs())
            .ok_or(PoolError::LiquidityUnderflow)
    } else {
        x.checked_add(y as u128).ok_or(PoolError::Overflow)
    }
}

/// Largest liquidity funded by `amount0` of token0 across a price range:
/// floor(amount0 * (lower * upper / Q96) / (upper - lower)).
pub fn liquidity_for_amount0(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount0: U256,
) -> Result<u128, PoolError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    let intermediate = mul_div(sqrt_ratio_lower, sqrt_ratio_upper, Q96)?;
    let liquidity = mul_div(amount0, intermediate, sqrt_ratio_upper - sqrt_ratio_lower)?;
    u128::try_from(liquidity).map_err(|_| PoolError::Overflow)
}

/// Largest liquidity funded by `amount1` of token1 across a price range:
/// floor(amount1 * Q96 / (upper - lower)).
pub fn liquidity_for_amount1(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount1: U256,
) -> Result<u128, PoolError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    let liquidity = mul_div(amount1, Q96, sqrt_ratio_upper - sqrt_ratio_lower)?;
    u128::try_from(liquidity).map_err(|_| PoolError::Overflow)
}

/// Largest liquidity funded by both token amounts given the current price.
/// Below the range only token0 counts, above it only token1, inside it the
/// binding constraint wins.
pub fn liquidity_for_amounts(
    sqrt_ratio_x96: U256,
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount0: U256,
    amount1: U256,
) -> Result<u128, PoolError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_ratio_x96 <= sqrt_ratio_lower {
        liquidity_for_amount0(sqrt_ratio_lower, sqrt_ratio_upper, amount0)
    } else if sqrt_ratio_x96 < sqrt_ratio_upper {
        let liquidity0 = liquidity_for_amount0(sqrt_ratio_x96, sqrt_ratio_upper, amount0)?;
        let liquidity1 = liquidity_for_amount1(sqrt_ratio_lower, sqrt_ratio_x96, amount1)?;
        Ok(liquidity0.min(liquidity1))
    } else {
        liquidity_for_amount1(sqrt_ratio_lower, sqrt_ratio_upper, amount1)
    }
}

fn sorted(a: U256, b: U256) -> (U256, U256) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}
