use std::collections::HashMap;

use alloy_primitives::{keccak256, Address, B256};
use serde::{Deserialize, Serialize};

/// Stable digest identifying a position: keccak over the packed owner
/// address and the two ticks as 3-byte big-endian two's complement.
pub fn position_key(owner: Address, lower_tick: i32, upper_tick: i32) -> B256 {
    let mut packed = [0u8; 26];
    packed[..20].copy_from_slice(owner.as_slice());
    packed[20..23].copy_from_slice(&lower_tick.to_be_bytes()[1..]);
    packed[23..26].copy_from_slice(&upper_tick.to_be_bytes()[1..]);
    keccak256(packed)
}

/// The position book: liquidity per (owner, range) key.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Positions {
    entries: HashMap<B256, u128>,
}

impl Positions {
    pub fn get(&self, key: B256) -> u128 {
        self.entries.get(&key).copied().unwrap_or_default()
    }

    pub fn set(&mut self, key: B256, liquidity: u128) {
        if liquidity == 0 {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, liquidity);
        }
    }
}
