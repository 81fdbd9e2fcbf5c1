use alloy_primitives::U256;

use crate::error::PoolError;
use crate::sqrt_price_math::{amount0_delta, amount1_delta, next_sqrt_price_from_input};

/// One step of a swap: moves the price from `sqrt_ratio_current_x96` toward
/// `sqrt_ratio_target_x96` at constant `liquidity`, consuming at most
/// `amount_remaining` of the input token.
///
/// Direction follows from the operand order: a target below the current price
/// means token0 is the input. Returns the realized price together with the
/// input consumed (rounded up) and the output produced (rounded down).
pub fn compute_swap_step(
    sqrt_ratio_current_x96: U256,
    sqrt_ratio_target_x96: U256,
    liquidity: u128,
    amount_remaining: U256,
) -> Result<(U256, U256, U256), PoolError> {
    let zero_for_one = sqrt_ratio_current_x96 >= sqrt_ratio_target_x96;

    let amount_in_to_target = if zero_for_one {
        amount0_delta(sqrt_ratio_target_x96, sqrt_ratio_current_x96, liquidity, true)?
    } else {
        amount1_delta(sqrt_ratio_current_x96, sqrt_ratio_target_x96, liquidity, true)?
    };

    let (sqrt_ratio_next_x96, amount_in) = if amount_remaining >= amount_in_to_target {
        (sqrt_ratio_target_x96, amount_in_to_target)
    } else {
        let next = next_sqrt_price_from_input(
            sqrt_ratio_current_x96,
            liquidity,
            amount_remaining,
            zero_for_one,
        )?;
        // the realized interval is smaller than the budget implies; charge
        // for what was actually traversed
        let consumed = if zero_for_one {
            amount0_delta(next, sqrt_ratio_current_x96, liquidity, true)?
        } else {
            amount1_delta(sqrt_ratio_current_x96, next, liquidity, true)?
        };
        (next, consumed)
    };

    let amount_out = if zero_for_one {
        amount1_delta(sqrt_ratio_next_x96, sqrt_ratio_current_x96, liquidity, false)?
    } else {
        amount0_delta(sqrt_ratio_current_x96, sqrt_ratio_next_x96, liquidity, false)?
    };

    Ok((sqrt_ratio_next_x96, amount_in, amount_out))
}

#[cfg(test)]
mod test {
    use super::*;
    use ruint::uint;

    const PRICE_1: U256 = uint!(79228162514264337593543950336_U256);

    #[test]
    fn step_capped_at_the_target_price() {
        // plenty of budget: the step lands exactly on the target
        let target = uint!(79623317895830914510639640423_U256);
        let (next, amount_in, amount_out) =
            compute_swap_step(PRICE_1, target, 2e18 as u128, uint!(1000000000000000000_U256))
                .unwrap();

        assert_eq!(next, target);
        assert_eq!(amount_in, uint!(9975124224178055_U256));
        assert_eq!(amount_out, uint!(9925619580021728_U256));
    }

    #[test]
    fn step_exhausts_the_budget_before_the_target() {
        // 0.1 token1 cannot reach a 10x price target
        let target = PRICE_1 * U256::from(10u64);
        let budget = uint!(100000000000000000_U256);
        let (next, amount_in, amount_out) =
            compute_swap_step(PRICE_1, target, 1e18 as u128, budget).unwrap();

        assert_eq!(next, uint!(87150978765690771352898345369_U256));
        assert!(next < target);
        assert!(amount_in <= budget);
        assert!(amount_out < amount_in);
    }

    #[test]
    fn zero_liquidity_moves_the_price_for_free() {
        let target = PRICE_1 * U256::from(2u64);
        let (next, amount_in, amount_out) =
            compute_swap_step(PRICE_1, target, 0, uint!(1000000_U256)).unwrap();

        assert_eq!(next, target);
        assert_eq!(amount_in, U256::ZERO);
        assert_eq!(amount_out, U256::ZERO);
    }

    #[test]
    fn zero_for_one_direction_is_inferred() {
        let target = uint!(78228162514264337593543950336_U256);
        let (next, amount_in, amount_out) =
            compute_swap_step(PRICE_1, target, 2e18 as u128, uint!(1000000000000000000_U256))
                .unwrap();

        assert_eq!(next, target);
        assert!(next < PRICE_1);
        // token0 in, token1 out; below price 1 the output is the smaller leg
        assert!(!amount_out.is_zero());
        assert!(amount_out < amount_in);
    }

    #[test]
    fn rounding_favors_the_pool() {
        let target = PRICE_1 * U256::from(2u64);
        let budget = uint!(333333333333_U256);
        let (next, amount_in, amount_out) =
            compute_swap_step(PRICE_1, target, 1e18 as u128, budget).unwrap();

        // the consumed input always covers the traversed interval
        assert_eq!(
            amount_in,
            amount1_delta(PRICE_1, next, 1e18 as u128, true).unwrap()
        );
        assert_eq!(
            amount_out,
            amount0_delta(PRICE_1, next, 1e18 as u128, false).unwrap()
        );
    }
}
