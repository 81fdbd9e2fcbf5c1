use alloy_primitives::U256;

/// 2^96, the scale of a Q64.96 fixed-point number.
pub const Q96: U256 = U256::from_limbs([0, 4294967296, 0, 0]);

pub const RESOLUTION: usize = 96;
