// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! A pure-Rust driver for the MAX6675 K-type thermocouple-to-digital converter.
//!
//! The MAX6675 digitizes a thermocouple voltage with cold-junction compensation and clocks the
//! result out over SPI as a single 16-bit word. The result is a 12-bit value covering 0 ℃ to
//! 1023.75 ℃ in quarter degree steps. There's nothing to configure on the device; reading it is
//! just a matter of asserting chip-select and clocking out a word.
//!
//! This library uses the [`embedded-hal`][embedded-hal] SPI and digital output traits, meaning you
//! should be able to use it on any platform with an `embedded-hal` implementation. It is also
//! `no_std` compatible and doesn't allocate.
//!
//! [embedded-hal]: https://docs.rs/embedded-hal/0.2/embedded_hal/
//!
//! # Example
//! ```no_run
//! use std::thread::sleep;
//! use std::time::Duration;
//! use linux_embedded_hal::spidev::{SpidevOptions, SpiModeFlags};
//! use linux_embedded_hal::sysfs_gpio::Direction;
//! use linux_embedded_hal::{Spidev, SysfsPin};
//! use max6675::{ByteTransport, Max6675};
//!
//! // Board setup: the bus speed and chip-select pin are up to you.
//! let mut spi = Spidev::open("/dev/spidev0.0")?;
//! spi.configure(
//!     &SpidevOptions::new()
//!         .max_speed_hz(1_000_000)
//!         .mode(SpiModeFlags::SPI_MODE_3)
//!         .build(),
//! )?;
//! let chip_select = SysfsPin::new(17);
//! chip_select.export()?;
//! chip_select.set_direction(Direction::High)?;
//!
//! let mut sensor = Max6675::new(ByteTransport::new(spi), chip_select)?;
//! loop {
//!     // The converter needs about 220ms to complete a conversion.
//!     sleep(Duration::from_secs(1));
//!     println!("Temperature = {}", sensor.read_temperature()?);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Averaging
//! [`Max6675::read_temperature`] doesn't return the latest reading directly. It keeps the last
//! four readings and returns their average, which steadies the converter's output but lags behind
//! the actual temperature. The history starts out zeroed, so the first three results after
//! [`Max6675::new`] or [`Max6675::initialize`] read low.
//!
//! The value returned is in whole degrees, truncated. The full resolution reading, along with the
//! open thermocouple flag, is available from [`Max6675::last_reading`].

#![no_std]

// Declared first so its logging macros are in scope for the other modules.
#[macro_use]
mod util;

pub mod calculations;
pub mod driver;
pub mod error;
pub mod history;
pub mod reading;
pub mod transport;

pub use driver::Max6675;
pub use error::Error;
pub use reading::Reading;
pub use transport::{ByteTransport, Transport, TransferFormat, WordTransport, MAX6675_FORMAT};
