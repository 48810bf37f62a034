// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use arrayvec::ArrayVec;

/// The number of readings averaged together.
pub const DEPTH: usize = 4;

/// `log2(DEPTH)`, so the average can be taken with a shift.
const DEPTH_SHIFT: u32 = DEPTH.trailing_zeros();

/// A fixed ring of the most recent magnitudes.
///
/// All slots start at zero and take part in the average whether or not they have been written
/// yet. Until [`DEPTH`] readings have been inserted the average is biased towards zero. This lag
/// is expected: the converter is slow, and this is how the moving average has always warmed up.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct History {
    slots: [u16; DEPTH],

    /// The next slot to be overwritten.
    cursor: usize,
}

impl History {
    pub const fn new() -> Self {
        Self {
            slots: [0; DEPTH],
            cursor: 0,
        }
    }

    /// Zero every slot and rewind the cursor.
    pub fn clear(&mut self) {
        self.slots = [0; DEPTH];
        self.cursor = 0;
    }

    /// Overwrite the oldest slot with a new magnitude.
    pub fn insert(&mut self, magnitude: u16) {
        self.slots[self.cursor] = magnitude;
        self.cursor = (self.cursor + 1) % DEPTH;
    }

    /// The sum of every slot, unwritten ones included.
    pub fn sum(&self) -> u32 {
        self.slots.iter().copied().map(u32::from).sum()
    }

    /// The mean of every slot, truncated.
    pub fn average(&self) -> u16 {
        // At most DEPTH * u16::MAX / DEPTH, so this always fits.
        (self.sum() >> DEPTH_SHIFT) as u16
    }

    /// The raw slots, in storage order.
    pub fn slots(&self) -> &[u16; DEPTH] {
        &self.slots
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    /// The slots ordered from the oldest to the most recent insertion.
    ///
    /// Slots that have never been written are included as zeros at the start.
    pub fn oldest_first(&self) -> ArrayVec<u16, DEPTH> {
        let (newest, oldest) = self.slots.split_at(self.cursor());
        oldest
            .iter()
            .chain(newest.iter())
            .copied()
            .collect()
    }
}
