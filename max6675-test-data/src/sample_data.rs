// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Raw bus words as a MAX6675 would clock them out.
//!
//! The 12-bit conversion result sits in bits 14 through 3, so a magnitude of `n` counts appears on
//! the bus as `n << 3`. Each count is a quarter of a degree Celsius.

/// Bit 2 of the output word, set by the converter when the thermocouple input is open.
pub const OPEN_THERMOCOUPLE_BIT: u16 = 0x0004;

/// Bit 1 of the output word. Always zero on real hardware.
pub const DEVICE_ID_BIT: u16 = 0x0002;

/// Bit 0 of the output word. The pin is three-stated, so it can read as either value.
pub const UNDEFINED_BIT: u16 = 0x0001;

/// Build the bus word for a 12-bit magnitude.
///
/// Magnitudes wider than 12 bits are truncated, as the converter can't produce them.
pub const fn raw_word(magnitude: u16) -> u16 {
    (magnitude & 0x0FFF) << 3
}

/// A bus word with the open thermocouple flag set.
pub const fn open_thermocouple_word(magnitude: u16) -> u16 {
    raw_word(magnitude) | OPEN_THERMOCOUPLE_BIT
}

/// 25.00 ℃
pub const ROOM_TEMPERATURE_WORD: u16 = raw_word(100);

/// 100.00 ℃
pub const BOILING_WORD: u16 = raw_word(400);

/// 1023.75 ℃, the top of the converter's range.
pub const FULL_SCALE_WORD: u16 = raw_word(0x0FFF);

/// A word with every bit set, including the reserved MSB that real hardware keeps low.
pub const ALL_ONES_WORD: u16 = 0xFFFF;

/// Five readings from a thermocouple being warmed, with the undefined bit floating around.
///
/// Decoded magnitudes are 100, 104, 111, 120 and 132 counts.
pub const WARMUP_SEQUENCE: [u16; 5] = [
    raw_word(100),
    raw_word(104) | UNDEFINED_BIT,
    raw_word(111),
    raw_word(120) | UNDEFINED_BIT,
    raw_word(132),
];

/// The decoded magnitudes of [`WARMUP_SEQUENCE`].
pub const WARMUP_MAGNITUDES: [u16; 5] = [100, 104, 111, 120, 132];
