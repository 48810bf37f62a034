// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
#[cfg(feature = "std")]
extern crate std;

use core::fmt;

use embedded_hal::digital::v2::OutputPin;

use crate::transport::Transport;

pub enum Error<T, CS>
where
    T: Transport,
    CS: OutputPin,
{
    /// Errors originating from the bus while setting the transfer format or exchanging a word.
    Transport(T::Error),

    /// Errors originating from the chip-select pin.
    ChipSelect(CS::Error),
}

// Custom Debug implementation so that the bus and pin types don't need to implement Debug, only
// their errors.
impl<T, CS> fmt::Debug for Error<T, CS>
where
    T: Transport,
    T::Error: fmt::Debug,
    CS: OutputPin,
    CS::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(err) => f.debug_tuple("Error::Transport").field(err).finish(),
            Error::ChipSelect(err) => f.debug_tuple("Error::ChipSelect").field(err).finish(),
        }
    }
}

impl<T, CS> fmt::Display for Error<T, CS>
where
    T: Transport,
    T::Error: fmt::Debug,
    CS: OutputPin,
    CS::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(err) => write!(f, "SPI Error: {:?}", err),
            Error::ChipSelect(err) => write!(f, "Chip Select Error: {:?}", err),
        }
    }
}

// PartialEq by hand as well, for the same reason as Debug.
impl<T, CS> PartialEq for Error<T, CS>
where
    T: Transport,
    T::Error: PartialEq,
    CS: OutputPin,
    CS::Error: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Error::Transport(lhs), Error::Transport(rhs)) => lhs == rhs,
            (Error::ChipSelect(lhs), Error::ChipSelect(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

#[cfg(feature = "std")]
impl<T, CS> std::error::Error for Error<T, CS>
where
    T: Transport,
    T::Error: std::error::Error + 'static,
    CS: OutputPin,
    CS::Error: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(err) => Some(err),
            Error::ChipSelect(err) => Some(err),
        }
    }
}

#[cfg(feature = "defmt")]
impl<T, CS> defmt::Format for Error<T, CS>
where
    T: Transport,
    CS: OutputPin,
{
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Transport(_) => defmt::write!(f, "Transport"),
            Error::ChipSelect(_) => defmt::write!(f, "ChipSelect"),
        }
    }
}
