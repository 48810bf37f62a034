// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! The bus side of the driver.
//!
//! The converter only needs two things from a bus: a way to clock a single 16-bit word in and out
//! while the chip-select line is held low, and a way to set the frame format used for that word.
//! [`Transport`] captures exactly that, and adapters are provided for the `embedded-hal` blocking
//! SPI traits.
//!
//! Bus speed and pin assignment are left to the code that creates the bus; they're properties of
//! the board, not of the converter.

use embedded_hal::blocking::spi::Transfer;
use embedded_hal::spi::{Mode, Phase, Polarity};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The level the clock line rests at between transfers.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockPolarity {
    IdleLow,
    IdleHigh,
}

/// Which clock edge data is sampled on.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockPhase {
    CaptureOnFirstTransition,
    CaptureOnSecondTransition,
}

/// The order bits within a word are shifted out in.
///
/// The discriminants follow the common C SDK convention of `0` for LSB first and `1` for MSB
/// first, for when a bus is configured from a raw value.
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BitOrder {
    LsbFirst = 0,
    MsbFirst = 1,
}

/// The framing of a single transfer on the bus.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferFormat {
    pub bits_per_word: u8,
    pub polarity: ClockPolarity,
    pub phase: ClockPhase,
    pub bit_order: BitOrder,
}

impl TransferFormat {
    /// The clock polarity and phase as an `embedded-hal` SPI mode.
    pub fn mode(&self) -> Mode {
        Mode {
            polarity: match self.polarity {
                ClockPolarity::IdleLow => Polarity::IdleLow,
                ClockPolarity::IdleHigh => Polarity::IdleHigh,
            },
            phase: match self.phase {
                ClockPhase::CaptureOnFirstTransition => Phase::CaptureOnFirstTransition,
                ClockPhase::CaptureOnSecondTransition => Phase::CaptureOnSecondTransition,
            },
        }
    }
}

/// The format the MAX6675 is read with: one 16-bit word, MSB first, clock idling high and data
/// sampled on the second edge (SPI mode 3).
pub const MAX6675_FORMAT: TransferFormat = TransferFormat {
    bits_per_word: 16,
    polarity: ClockPolarity::IdleHigh,
    phase: ClockPhase::CaptureOnSecondTransition,
    bit_order: BitOrder::MsbFirst,
};

/// A bus capable of full-duplex, blocking 16-bit transfers.
///
/// Implementations must not touch any chip-select line themselves; the driver does that.
pub trait Transport {
    type Error;

    /// Set the framing used by subsequent calls to [`exchange16`][Transport::exchange16].
    fn set_transfer_format(&mut self, format: TransferFormat) -> Result<(), Self::Error>;

    /// Shift `word` out while shifting a word in, returning the received word.
    ///
    /// This blocks until the transfer is complete.
    fn exchange16(&mut self, word: u16) -> Result<u16, Self::Error>;
}

impl<T> Transport for &mut T
where
    T: Transport + ?Sized,
{
    type Error = T::Error;

    fn set_transfer_format(&mut self, format: TransferFormat) -> Result<(), Self::Error> {
        T::set_transfer_format(self, format)
    }

    fn exchange16(&mut self, word: u16) -> Result<u16, Self::Error> {
        T::exchange16(self, word)
    }
}

/// Adapts an `embedded-hal` SPI bus with 8-bit words.
///
/// Each 16-bit word is sent as two bytes, most significant first, which is identical on the wire
/// to a single 16-bit MSB-first frame. `embedded-hal` buses have their mode fixed when they're
/// created, so the requested format is only recorded. Use [`ByteTransport::transfer_format`] to
/// check it against how the bus was set up.
#[derive(Clone, Debug)]
pub struct ByteTransport<SPI> {
    spi: SPI,
    format: Option<TransferFormat>,
}

impl<SPI> ByteTransport<SPI>
where
    SPI: Transfer<u8>,
{
    pub fn new(spi: SPI) -> Self {
        Self { spi, format: None }
    }

    /// The format most recently requested, if any.
    pub fn transfer_format(&self) -> Option<TransferFormat> {
        self.format
    }

    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Transport for ByteTransport<SPI>
where
    SPI: Transfer<u8>,
{
    type Error = SPI::Error;

    fn set_transfer_format(&mut self, format: TransferFormat) -> Result<(), Self::Error> {
        self.format = Some(format);
        Ok(())
    }

    fn exchange16(&mut self, word: u16) -> Result<u16, Self::Error> {
        let mut buffer = word.to_be_bytes();
        self.spi.transfer(&mut buffer)?;
        Ok(u16::from_be_bytes(buffer))
    }
}

/// Adapts an `embedded-hal` SPI bus that natively transfers 16-bit words.
///
/// As with [`ByteTransport`], the requested format is recorded rather than applied.
#[derive(Clone, Debug)]
pub struct WordTransport<SPI> {
    spi: SPI,
    format: Option<TransferFormat>,
}

impl<SPI> WordTransport<SPI>
where
    SPI: Transfer<u16>,
{
    pub fn new(spi: SPI) -> Self {
        Self { spi, format: None }
    }

    pub fn transfer_format(&self) -> Option<TransferFormat> {
        self.format
    }

    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Transport for WordTransport<SPI>
where
    SPI: Transfer<u16>,
{
    type Error = SPI::Error;

    fn set_transfer_format(&mut self, format: TransferFormat) -> Result<(), Self::Error> {
        self.format = Some(format);
        Ok(())
    }

    fn exchange16(&mut self, word: u16) -> Result<u16, Self::Error> {
        let mut buffer = [word];
        self.spi.transfer(&mut buffer)?;
        Ok(buffer[0])
    }
}

#[cfg(feature = "linux-embedded-hal")]
mod linux {
    extern crate std;

    use std::io;

    use embedded_hal::blocking::spi::Transfer;
    use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
    use linux_embedded_hal::Spidev;

    use super::*;

    /// Linux `spidev` devices are driven with 8-bit words; a lot of controllers don't support
    /// 16-bit words, and the byte order of 16-bit words is host-dependent.
    impl Transport for Spidev {
        type Error = io::Error;

        fn set_transfer_format(&mut self, format: TransferFormat) -> Result<(), Self::Error> {
            if format.bits_per_word != 16 || format.bit_order != BitOrder::MsbFirst {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "only 16-bit MSB-first transfers are supported",
                ));
            }
            let mode = match (format.polarity, format.phase) {
                (ClockPolarity::IdleLow, ClockPhase::CaptureOnFirstTransition) => {
                    SpiModeFlags::SPI_MODE_0
                }
                (ClockPolarity::IdleLow, ClockPhase::CaptureOnSecondTransition) => {
                    SpiModeFlags::SPI_MODE_1
                }
                (ClockPolarity::IdleHigh, ClockPhase::CaptureOnFirstTransition) => {
                    SpiModeFlags::SPI_MODE_2
                }
                (ClockPolarity::IdleHigh, ClockPhase::CaptureOnSecondTransition) => {
                    SpiModeFlags::SPI_MODE_3
                }
            };
            let options = SpidevOptions::new()
                .bits_per_word(8)
                .lsb_first(false)
                .mode(mode)
                .build();
            self.0.configure(&options)
        }

        fn exchange16(&mut self, word: u16) -> Result<u16, Self::Error> {
            let mut buffer = word.to_be_bytes();
            Transfer::transfer(self, &mut buffer)?;
            Ok(u16::from_be_bytes(buffer))
        }
    }
}
