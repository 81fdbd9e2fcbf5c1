use alloy_primitives::{U256, U512};

use crate::error::PoolError;

const ONE: U256 = U256::from_limbs([1, 0, 0, 0]);

fn widen(x: U256) -> U512 {
    let limbs = x.as_limbs();
    U512::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3], 0, 0, 0, 0])
}

fn narrow(x: U512) -> Result<U256, PoolError> {
    let limbs = x.as_limbs();
    if limbs[4] | limbs[5] | limbs[6] | limbs[7] != 0 {
        return Err(PoolError::Overflow);
    }
    Ok(U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

/// floor(a * b / denominator), computed with a full 512-bit intermediate.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, PoolError> {
    if denominator.is_zero() {
        return Err(PoolError::Overflow);
    }
    narrow(widen(a) * widen(b) / widen(denominator))
}

/// ceil(a * b / denominator), computed with a full 512-bit intermediate.
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, PoolError> {
    if denominator.is_zero() {
        return Err(PoolError::Overflow);
    }
    let (quotient, remainder) = (widen(a) * widen(b)).div_rem(widen(denominator));
    narrow(if remainder.is_zero() {
        quotient
    } else {
        quotient + U512::from_limbs([1, 0, 0, 0, 0, 0, 0, 0])
    })
}

/// ceil(a / b). Callers must have excluded b == 0.
pub fn div_rounding_up(a: U256, b: U256) -> U256 {
    let (quotient, remainder) = a.div_rem(b);
    if remainder.is_zero() {
        quotient
    } else {
        quotient + ONE
    }
}
