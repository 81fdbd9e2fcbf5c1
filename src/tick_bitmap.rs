use std::collections::BTreeMap;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::bit_math::{least_significant_bit, most_significant_bit};
use crate::tick_math::{MAX_TICK, MIN_TICK};

const ONE: U256 = U256::from_limbs([1, 0, 0, 0]);

/// Bitmap of initialized ticks, partitioned into 256-bit words keyed by
/// `tick >> 8`. Absent words read as zero.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TickBitmap {
    words: BTreeMap<i16, U256>,
}

// (word position, bit position) of a tick
fn position(tick: i32) -> (i16, u8) {
    ((tick >> 8) as i16, (tick & 0xff) as u8)
}

impl TickBitmap {
    pub fn word(&self, word_pos: i16) -> U256 {
        self.words.get(&word_pos).copied().unwrap_or_default()
    }

    /// Toggles a tick's bit.
    pub fn flip(&mut self, tick: i32) {
        debug_assert!((MIN_TICK..=MAX_TICK).contains(&tick));
        let (word_pos, bit_pos) = position(tick);
        let word = self.words.entry(word_pos).or_default();
        *word ^= ONE << (bit_pos as usize);
        if word.is_zero() {
            self.words.remove(&word_pos);
        }
    }

    /// Nearest initialized tick within the word holding `tick` (searching
    /// down, inclusive) or the word holding `tick + 1` (searching up). When
    /// the word holds no candidate, returns its boundary tick with `false` so
    /// the caller can resume from the adjacent word; this bounds the work per
    /// swap step to a single word.
    pub fn next_initialized_tick_within_one_word(&self, tick: i32, lte: bool) -> (i32, bool) {
        if lte {
            let (word_pos, bit_pos) = position(tick);
            // bits at or below bit_pos
            let mask = (ONE << (bit_pos as usize)) | ((ONE << (bit_pos as usize)) - ONE);
            let masked = self.word(word_pos) & mask;

            if masked.is_zero() {
                (tick - bit_pos as i32, false)
            } else {
                let msb = most_significant_bit(masked);
                (tick - (bit_pos as i32 - msb as i32), true)
            }
        } else {
            let (word_pos, bit_pos) = position(tick + 1);
            // bits at or above bit_pos
            let mask = !((ONE << (bit_pos as usize)) - ONE);
            let masked = self.word(word_pos) & mask;

            if masked.is_zero() {
                (tick + 1 + (255 - bit_pos as i32), false)
            } else {
                let lsb = least_significant_bit(masked);
                (tick + 1 + (lsb as i32 - bit_pos as i32), true)
            }
        }
    }
}
