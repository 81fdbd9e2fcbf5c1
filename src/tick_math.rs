use alloy_primitives::{I256, U256};
use ruint::uint;

use crate::error::PoolError;

/// Lowest tick with a representable sqrt price, i.e. price 2^-128.
pub const MIN_TICK: i32 = -887272;
/// Highest tick with a representable sqrt price, i.e. price 2^128.
pub const MAX_TICK: i32 = -MIN_TICK;

/// sqrt_ratio_at_tick(MIN_TICK).
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);
/// sqrt_ratio_at_tick(MAX_TICK). Prices never reach this value.
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([6743328256752651558, 17280870778742802505, 4294805859, 0]);

const ONE: U256 = U256::from_limbs([1, 0, 0, 0]);

/// sqrt(1.0001^tick) * 2^96 as a Q64.96, the least value that maps back to
/// `tick` under [`tick_at_sqrt_ratio`].
///
/// Multiplies out sqrt(1.0001)^-(2^i) factors for each set bit of |tick| in
/// Q128.128, inverts for positive ticks, then narrows to Q64.96 rounding up.
pub fn sqrt_ratio_at_tick(tick: i32) -> Result<U256, PoolError> {
    let abs_tick = tick.unsigned_abs();
    if abs_tick > MAX_TICK as u32 {
        return Err(PoolError::TickOutOfRange);
    }

    let mut ratio = if abs_tick & 0x1 != 0 {
        uint!(0xfffcb933bd6fad37aa2d162d1a594001_U256)
    } else {
        uint!(0x100000000000000000000000000000000_U256)
    };
    if abs_tick & 0x2 != 0 {
        ratio = (ratio * uint!(0xfff97272373d413259a46990580e213a_U256)) >> 128;
    }
    if abs_tick & 0x4 != 0 {
        ratio = (ratio * uint!(0xfff2e50f5f656932ef12357cf3c7fdcc_U256)) >> 128;
    }
    if abs_tick & 0x8 != 0 {
        ratio = (ratio * uint!(0xffe5caca7e10e4e61c3624eaa0941cd0_U256)) >> 128;
    }
    if abs_tick & 0x10 != 0 {
        ratio = (ratio * uint!(0xffcb9843d60f6159c9db58835c926644_U256)) >> 128;
    }
    if abs_tick & 0x20 != 0 {
        ratio = (ratio * uint!(0xff973b41fa98c081472e6896dfb254c0_U256)) >> 128;
    }
    if abs_tick & 0x40 != 0 {
        ratio = (ratio * uint!(0xff2ea16466c96a3843ec78b326b52861_U256)) >> 128;
    }
    if abs_tick & 0x80 != 0 {
        ratio = (ratio * uint!(0xfe5dee046a99a2a811c461f1969c3053_U256)) >> 128;
    }
    if abs_tick & 0x100 != 0 {
        ratio = (ratio * uint!(0xfcbe86c7900a88aedcffc83b479aa3a4_U256)) >> 128;
    }
    if abs_tick & 0x200 != 0 {
        ratio = (ratio * uint!(0xf987a7253ac413176f2b074cf7815e54_U256)) >> 128;
    }
    if abs_tick & 0x400 != 0 {
        ratio = (ratio * uint!(0xf3392b0822b70005940c7a398e4b70f3_U256)) >> 128;
    }
    if abs_tick & 0x800 != 0 {
        ratio = (ratio * uint!(0xe7159475a2c29b7443b29c7fa6e889d9_U256)) >> 128;
    }
    if abs_tick & 0x1000 != 0 {
        ratio = (ratio * uint!(0xd097f3bdfd2022b8845ad8f792aa5825_U256)) >> 128;
    }
    if abs_tick & 0x2000 != 0 {
        ratio = (ratio * uint!(0xa9f746462d870fdf8a65dc1f90e061e5_U256)) >> 128;
    }
    if abs_tick & 0x4000 != 0 {
        ratio = (ratio * uint!(0x70d869a156d2a1b890bb3df62baf32f7_U256)) >> 128;
    }
    if abs_tick & 0x8000 != 0 {
        ratio = (ratio * uint!(0x31be135f97d08fd981231505542fcfa6_U256)) >> 128;
    }
    if abs_tick & 0x10000 != 0 {
        ratio = (ratio * uint!(0x9aa508b5b7a84e1c677de54f3e99bc9_U256)) >> 128;
    }
    if abs_tick & 0x20000 != 0 {
        ratio = (ratio * uint!(0x5d6af8dedb81196699c329225ee604_U256)) >> 128;
    }
    if abs_tick & 0x40000 != 0 {
        ratio = (ratio * uint!(0x2216e584f5fa1ea926041bedfe98_U256)) >> 128;
    }
    if abs_tick & 0x80000 != 0 {
        ratio = (ratio * uint!(0x48a170391f7dc42444e8fa2_U256)) >> 128;
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up so the bijection with
    // tick_at_sqrt_ratio holds at range endpoints.
    Ok((ratio >> 32)
        + if (ratio % (ONE << 32u32)).is_zero() {
            U256::ZERO
        } else {
            ONE
        })
}

/// Greatest tick whose sqrt ratio is <= `sqrt_price_x96`.
///
/// Binary log2 of the input refined bit by bit, scaled into tick space with
/// log2(sqrt(1.0001)) in Q64.64, then corrected between the two candidate
/// ticks the approximation error allows.
pub fn tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32, PoolError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(PoolError::TickOutOfRange);
    }

    let ratio: U256 = sqrt_price_x96 << 32u32;

    let msb = 255 - ratio.leading_zeros();
    let mut r = if msb >= 128 {
        ratio >> (msb - 127)
    } else {
        ratio << (127 - msb)
    };

    // log2 of the ratio in signed Q64.64, accumulated as raw two's complement
    let mut log_2 = U256::from(msb as u64).wrapping_sub(U256::from(128u64)) << 64;

    for i in (51..=63usize).rev() {
        r = (r * r) >> 127;
        let f: U256 = r >> 128;
        log_2 |= f << i;
        r >>= f.to::<usize>();
    }
    r = (r * r) >> 127;
    log_2 |= (r >> 128) << 50;

    // change of base to log_sqrt(1.0001), multiplier in Q64.64 as well
    let log_sqrt10001 =
        I256::from_raw(log_2) * I256::from_raw(uint!(255738958999603826347141_U256));

    let tick_low = low_i32(
        (log_sqrt10001 - I256::from_raw(uint!(3402992956809132418596140100660247210_U256)))
            .asr(128),
    );
    let tick_high = low_i32(
        (log_sqrt10001 + I256::from_raw(uint!(291339464771989622907027621153398088495_U256)))
            .asr(128),
    );

    Ok(if tick_low == tick_high {
        tick_low
    } else if sqrt_ratio_at_tick(tick_high)? <= sqrt_price_x96 {
        tick_high
    } else {
        tick_low
    })
}

// Two's-complement truncation; the quotient always fits a tick.
fn low_i32(x: I256) -> i32 {
    x.into_raw().as_limbs()[0] as i32
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_out_of_range_ticks() {
        assert_eq!(sqrt_ratio_at_tick(MIN_TICK - 1), Err(PoolError::TickOutOfRange));
        assert_eq!(sqrt_ratio_at_tick(MAX_TICK + 1), Err(PoolError::TickOutOfRange));
        assert_eq!(sqrt_ratio_at_tick(i32::MIN), Err(PoolError::TickOutOfRange));
    }

    #[test]
    fn range_endpoints() {
        assert_eq!(sqrt_ratio_at_tick(MIN_TICK).unwrap(), MIN_SQRT_RATIO);
        assert_eq!(sqrt_ratio_at_tick(MAX_TICK).unwrap(), MAX_SQRT_RATIO);
        assert_eq!(
            sqrt_ratio_at_tick(MIN_TICK + 1).unwrap(),
            U256::from(4295343490u64)
        );
        assert_eq!(
            sqrt_ratio_at_tick(MAX_TICK - 1).unwrap(),
            uint!(1461373636630004318706518188784493106690254656249_U256)
        );
        assert_eq!(sqrt_ratio_at_tick(0).unwrap(), uint!(79228162514264337593543950336_U256));
    }

    #[test]
    fn known_ratios() {
        // values cross-checked against the solidity reference
        assert_eq!(
            sqrt_ratio_at_tick(50).unwrap(),
            U256::from(79426470787362580746886972461u128)
        );
        assert_eq!(
            sqrt_ratio_at_tick(100).unwrap(),
            U256::from(79625275426524748796330556128u128)
        );
        assert_eq!(
            sqrt_ratio_at_tick(1000).unwrap(),
            U256::from(83290069058676223003182343270u128)
        );
        assert_eq!(
            sqrt_ratio_at_tick(150000).unwrap(),
            U256::from(143194173941309278083010301478497u128)
        );
        assert_eq!(
            sqrt_ratio_at_tick(500000).unwrap(),
            uint!(5697689776495288729098254600827762987878_U256)
        );
        assert_eq!(
            sqrt_ratio_at_tick(250000).unwrap(),
            U256::from(21246587762933397357449903968194344u128)
        );
    }

    #[test]
    fn rejects_out_of_range_ratios() {
        assert_eq!(
            tick_at_sqrt_ratio(MIN_SQRT_RATIO - U256::from(1u64)),
            Err(PoolError::TickOutOfRange)
        );
        // the max ratio itself is excluded
        assert_eq!(tick_at_sqrt_ratio(MAX_SQRT_RATIO), Err(PoolError::TickOutOfRange));
    }

    #[test]
    fn ratio_endpoints() {
        assert_eq!(tick_at_sqrt_ratio(MIN_SQRT_RATIO).unwrap(), MIN_TICK);
        assert_eq!(
            tick_at_sqrt_ratio(U256::from(4295343490u64)).unwrap(),
            MIN_TICK + 1
        );
        assert_eq!(
            tick_at_sqrt_ratio(MAX_SQRT_RATIO - U256::from(1u64)).unwrap(),
            MAX_TICK - 1
        );
    }

    #[test]
    fn floor_semantics_between_ticks() {
        let at_1000 = sqrt_ratio_at_tick(1000).unwrap();
        assert_eq!(tick_at_sqrt_ratio(at_1000).unwrap(), 1000);
        assert_eq!(tick_at_sqrt_ratio(at_1000 + U256::from(1u64)).unwrap(), 1000);
        assert_eq!(tick_at_sqrt_ratio(at_1000 - U256::from(1u64)).unwrap(), 999);
    }

    proptest! {
        #[test]
        fn round_trips(tick in MIN_TICK..=MAX_TICK) {
            let ratio = sqrt_ratio_at_tick(tick).unwrap();
            prop_assert_eq!(tick_at_sqrt_ratio(ratio).unwrap(), tick);
        }

        #[test]
        fn strictly_monotonic(tick in MIN_TICK..MAX_TICK) {
            prop_assert!(sqrt_ratio_at_tick(tick).unwrap() < sqrt_ratio_at_tick(tick + 1).unwrap());
        }
    }
}
