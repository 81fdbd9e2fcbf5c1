use alloy_primitives::U256;

/// Index of the highest set bit. `x` must be non-zero.
pub fn most_significant_bit(x: U256) -> u8 {
    debug_assert!(!x.is_zero());
    (255 - x.leading_zeros()) as u8
}

/// Index of the lowest set bit. `x` must be non-zero.
pub fn least_significant_bit(x: U256) -> u8 {
    debug_assert!(!x.is_zero());
    x.trailing_zeros() as u8
}
