use std::collections::HashMap;

use alloy_primitives::U256;

/// Bits per storage word.
pub const WORD_BITS: u64 = 256;

/// Packed claim flags: word `index / 256`, bit `index % 256`.
///
/// Words are created lazily, so memory grows with the number of distinct
/// 256-index ranges touched rather than with the size of the distribution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimedBitmap {
    words: HashMap<u64, U256>,
}

fn position(index: u64) -> (u64, usize) {
    (index / WORD_BITS, (index % WORD_BITS) as usize)
}

impl ClaimedBitmap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self, index: u64) -> bool {
        let (word_index, bit_index) = position(index);
        self.words
            .get(&word_index)
            .is_some_and(|word| word.bit(bit_index))
    }

    /// Sets the bit for `index`. Returns `false` if it was already set.
    pub fn set(&mut self, index: u64) -> bool {
        let (word_index, bit_index) = position(index);
        let word = self.words.entry(word_index).or_default();
        if word.bit(bit_index) {
            return false;
        }
        word.set_bit(bit_index, true);
        true
    }

    /// Clears a bit set earlier in the same, now aborted, call.
    pub(crate) fn revert(&mut self, index: u64) {
        let (word_index, bit_index) = position(index);
        if let Some(word) = self.words.get_mut(&word_index) {
            word.set_bit(bit_index, false);
            if word.is_zero() {
                self.words.remove(&word_index);
            }
        }
    }

    /// Raw storage word, zero if never written.
    pub fn word(&self, word_index: u64) -> U256 {
        self.words.get(&word_index).copied().unwrap_or_default()
    }

    /// Number of set bits.
    pub fn count(&self) -> u64 {
        self.words
            .values()
            .map(|word| word.count_ones() as u64)
            .sum()
    }
}
