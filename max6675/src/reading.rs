// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! The raw output word of the converter.
//!
//! Each conversion is clocked out as a single 16-bit word, most significant bit first:
//!
//! | Bit   | Meaning                                                           |
//! |-------|-------------------------------------------------------------------|
//! | 15    | Reserved, always 0 on a working device                            |
//! | 14..3 | 12-bit temperature magnitude, MSB first, 0.25 ℃ per count         |
//! | 2     | Set when the thermocouple input is open (nothing connected)       |
//! | 1     | Device ID, always 0                                               |
//! | 0     | Undefined, the output is three-stated during this bit             |

use num_enum::IntoPrimitive;

use crate::util::is_bit_set;

/// The number of low bits below the temperature magnitude.
pub const MAGNITUDE_SHIFT: u32 = 3;

/// The largest magnitude a well-formed word can hold (1023.75 ℃).
pub const MAX_MAGNITUDE: u16 = 0x0FFF;

/// Degrees Celsius per count of magnitude.
pub const DEGREES_PER_COUNT: f32 = 0.25;

/// Named bit positions in the output word, counted from the LSB.
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive)]
#[repr(u8)]
pub enum ReadingBit {
    Undefined = 0,
    DeviceId = 1,
    OpenThermocouple = 2,
    Reserved = 15,
}

/// A single word read from the converter.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading(u16);

impl Reading {
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// The word exactly as it came off the bus.
    pub const fn raw(&self) -> u16 {
        self.0
    }

    /// The temperature magnitude in counts of 0.25 ℃.
    ///
    /// This is only a shift, the reserved bit is *not* masked off. A well-formed word always has
    /// bit 15 clear so the result is within `0..=4095`, but a malformed word with bit 15 set comes
    /// out as `4096..=8191`. Averaging is defined over these unmasked values, so use
    /// [`Reading::is_well_formed`] to check the reserved bit separately.
    pub const fn magnitude(&self) -> u16 {
        self.0 >> MAGNITUDE_SHIFT
    }

    /// The magnitude converted to degrees Celsius, keeping the quarter degree resolution.
    pub fn celsius(&self) -> f32 {
        f32::from(self.magnitude()) * DEGREES_PER_COUNT
    }

    /// Whether the converter flagged the thermocouple input as open.
    ///
    /// While this is set the magnitude is meaningless.
    pub fn is_open_thermocouple(&self) -> bool {
        self.bit(ReadingBit::OpenThermocouple)
    }

    /// The device ID bit. The datasheet defines it as always 0.
    pub fn device_id(&self) -> bool {
        self.bit(ReadingBit::DeviceId)
    }

    /// The undefined, three-stated bit. It carries no information.
    pub fn undefined_bit(&self) -> bool {
        self.bit(ReadingBit::Undefined)
    }

    pub fn reserved_bit(&self) -> bool {
        self.bit(ReadingBit::Reserved)
    }

    /// True if the reserved and device ID bits have the values the datasheet guarantees.
    ///
    /// A bus with nothing attached (or a stuck data line) typically reads as all ones or all
    /// zeros; the all-ones case fails this check.
    pub fn is_well_formed(&self) -> bool {
        !self.reserved_bit() && !self.device_id()
    }

    fn bit(&self, bit: ReadingBit) -> bool {
        let index: u8 = bit.into();
        is_bit_set(self.0, index as usize)
    }
}

impl From<u16> for Reading {
    fn from(raw: u16) -> Self {
        Self::from_raw(raw)
    }
}

impl From<Reading> for u16 {
    fn from(reading: Reading) -> Self {
        reading.raw()
    }
}
