use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PoolError;
use crate::liquidity_math::add_delta;
use crate::tick_math::{MAX_TICK, MIN_TICK};

/// Cap on a single tick's gross liquidity so the sum over every possible
/// tick still fits in a u128.
pub const MAX_LIQUIDITY_PER_TICK: u128 = u128::MAX / ((MAX_TICK - MIN_TICK) as u128 + 1);

/// Book entry for one tick. `liquidity_gross` counts every position endpoint
/// referencing the tick; `liquidity_net` is the signed change to active
/// liquidity when the price crosses it moving up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInfo {
    pub initialized: bool,
    pub liquidity_gross: u128,
    pub liquidity_net: i128,
}

impl TickInfo {
    /// Applies a position endpoint's liquidity delta, returning the updated
    /// entry and whether its initialized state flipped.
    pub fn update(self, liquidity_delta: i128, upper: bool) -> Result<(TickInfo, bool), PoolError> {
        let gross_before = self.liquidity_gross;
        let gross_after = add_delta(gross_before, liquidity_delta)?;
        if gross_after > MAX_LIQUIDITY_PER_TICK {
            return Err(PoolError::LiquidityOverflow);
        }

        let flipped = (gross_after == 0) != (gross_before == 0);

        let net = if upper {
            self.liquidity_net.checked_sub(liquidity_delta)
        } else {
            self.liquidity_net.checked_add(liquidity_delta)
        }
        .ok_or(PoolError::Overflow)?;

        Ok((
            TickInfo {
                initialized: gross_after > 0,
                liquidity_gross: gross_after,
                liquidity_net: if gross_after == 0 { 0 } else { net },
            },
            flipped,
        ))
    }
}

/// The tick book. Only initialized ticks occupy storage; everything else
/// reads as the zeroed entry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Ticks {
    entries: BTreeMap<i32, TickInfo>,
}

impl Ticks {
    pub fn get(&self, tick: i32) -> TickInfo {
        self.entries.get(&tick).copied().unwrap_or_default()
    }

    /// Writes an entry back, dropping it once its gross liquidity is gone.
    pub fn set(&mut self, tick: i32, info: TickInfo) {
        if info.liquidity_gross == 0 {
            self.entries.remove(&tick);
        } else {
            self.entries.insert(tick, info);
        }
    }

    /// Net liquidity change when the price crosses `tick` moving up.
    pub fn cross(&self, tick: i32) -> i128 {
        self.get(tick).liquidity_net
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }
}
