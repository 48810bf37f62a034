// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

/// Log at trace level through `defmt`, if it's enabled.
///
/// The arguments are not evaluated without the `defmt` feature, so they must not have side
/// effects.
macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::trace!($($arg)*);
    };
}

/// Log at warning level through `defmt`, if it's enabled.
macro_rules! warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::warn!($($arg)*);
    };
}

/// Check if the n-th bit is set.
///
/// Bits are 0-indexed, from the LSB.
pub(crate) fn is_bit_set<B>(value: B, index: usize) -> bool
where
    B: num_traits::PrimInt + num_traits::Unsigned,
{
    (value & (B::one() << index)) > B::zero()
}
