// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Conversion from averaged converter counts to whole degrees.
//!
//! The converter's 12-bit range spans 0 ℃ (all zeros) to 1023.75 ℃ (all ones), so each count is
//! 1023.75 / 4095 = 0.25 ℃. The driver reports whole degrees, truncating the quarter-degree
//! fraction rather than rounding it.

use crate::reading::DEGREES_PER_COUNT;

/// Scale an average magnitude to whole degrees Celsius.
///
/// The multiplication is done in `f32` and truncated towards zero. Every input is exactly
/// representable and 0.25 is a power of two, so the result matches [`counts_to_degrees_fixed`]
/// for all inputs.
pub fn counts_to_degrees(average: u16) -> u16 {
    (f32::from(average) * DEGREES_PER_COUNT) as u16
}

/// Integer-only version of [`counts_to_degrees`], for targets without an FPU.
pub const fn counts_to_degrees_fixed(average: u16) -> u16 {
    average >> 2
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn boundaries() {
        assert_eq!(counts_to_degrees(0), 0);
        assert_eq!(counts_to_degrees(4095), 1023);
        assert_eq!(counts_to_degrees(4092), 1023);
        assert_eq!(counts_to_degrees(4091), 1022);
    }

    #[test]
    fn truncates_fraction() {
        // 25.75 ℃
        assert_eq!(counts_to_degrees(103), 25);
        // 0.75 ℃
        assert_eq!(counts_to_degrees(3), 0);
    }

    #[test]
    fn fixed_point_matches_float() {
        // Every value a four slot average of shift-decoded words can take, including those with
        // the reserved bit set.
        for average in 0..=8191u16 {
            assert_eq!(
                counts_to_degrees(average),
                counts_to_degrees_fixed(average),
                "mismatch for average {}",
                average
            );
        }
    }
}
