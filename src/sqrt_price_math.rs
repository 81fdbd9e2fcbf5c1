use alloy_primitives::U256;

use crate::error::PoolError;
use crate::fixed_point_96::{Q96, RESOLUTION};
use crate::full_math::{div_rounding_up, mul_div, mul_div_rounding_up};

/// Largest value that fits the 160-bit sqrt price encoding.
pub const MAX_U160: U256 =
    U256::from_limbs([18446744073709551615, 18446744073709551615, 4294967295, 0]);

/// Amount of token0 between two sqrt prices at the given liquidity:
/// liquidity * 2^96 * (upper - lower) / (upper * lower).
pub fn amount0_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, PoolError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if sqrt_ratio_lower.is_zero() {
        return Err(PoolError::Overflow);
    }

    let numerator_1 = U256::from(liquidity) << RESOLUTION;
    let numerator_2 = sqrt_ratio_upper - sqrt_ratio_lower;

    if round_up {
        Ok(div_rounding_up(
            mul_div_rounding_up(numerator_1, numerator_2, sqrt_ratio_upper)?,
            sqrt_ratio_lower,
        ))
    } else {
        Ok(mul_div(numerator_1, numerator_2, sqrt_ratio_upper)? / sqrt_ratio_lower)
    }
}

/// Amount of token1 between two sqrt prices at the given liquidity:
/// liquidity * (upper - lower) / 2^96.
pub fn amount1_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, PoolError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    let diff = sqrt_ratio_upper - sqrt_ratio_lower;

    if round_up {
        mul_div_rounding_up(U256::from(liquidity), diff, Q96)
    } else {
        mul_div(U256::from(liquidity), diff, Q96)
    }
}

/// Sqrt price after spending `amount_in` of the input token against
/// `liquidity` at `sqrt_price_x96`. Token0 input pushes the price down,
/// token1 input pushes it up; both round against the swapper.
pub fn next_sqrt_price_from_input(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> Result<U256, PoolError> {
    if sqrt_price_x96.is_zero() || liquidity == 0 {
        return Err(PoolError::Overflow);
    }

    if zero_for_one {
        next_sqrt_price_from_amount0_rounding_up(sqrt_price_x96, liquidity, amount_in)
    } else {
        next_sqrt_price_from_amount1_rounding_down(sqrt_price_x96, liquidity, amount_in)
    }
}

// ceil(liquidity * Q96 * sqrtP / (liquidity * Q96 + amount * sqrtP)), taking
// the exact path while the denominator fits 256 bits.
fn next_sqrt_price_from_amount0_rounding_up(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount: U256,
) -> Result<U256, PoolError> {
    if amount.is_zero() {
        return Ok(sqrt_price_x96);
    }

    let numerator_1 = U256::from(liquidity) << RESOLUTION;
    let product = amount.wrapping_mul(sqrt_price_x96);

    if product.wrapping_div(amount) == sqrt_price_x96 {
        let denominator = numerator_1.wrapping_add(product);
        if denominator >= numerator_1 {
            return mul_div_rounding_up(numerator_1, sqrt_price_x96, denominator);
        }
    }

    Ok(div_rounding_up(
        numerator_1,
        (numerator_1 / sqrt_price_x96).wrapping_add(amount),
    ))
}

// sqrtP + floor(amount * Q96 / liquidity); the result must still fit the
// 160-bit price encoding.
fn next_sqrt_price_from_amount1_rounding_down(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount: U256,
) -> Result<U256, PoolError> {
    let quotient = if amount <= MAX_U160 {
        (amount << RESOLUTION) / U256::from(liquidity)
    } else {
        mul_div(amount, Q96, U256::from(liquidity))?
    };

    let next = sqrt_price_x96
        .checked_add(quotient)
        .ok_or(PoolError::Overflow)?;
    if next > MAX_U160 {
        return Err(PoolError::Overflow);
    }
    Ok(next)
}

fn sorted(a: U256, b: U256) -> (U256, U256) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}
