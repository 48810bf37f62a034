// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

use embedded_hal::digital::v2::OutputPin;

use crate::calculations::counts_to_degrees;
use crate::error::Error;
use crate::history::History;
use crate::reading::Reading;
use crate::transport::{Transport, MAX6675_FORMAT};

/// The word shifted out while reading. The converter has no data input, so this is arbitrary.
const DUMMY_WORD: u16 = 0x0000;

/// Driver for a single MAX6675 thermocouple converter.
///
/// Every call to [`read_temperature`][Max6675::read_temperature] performs one conversion read and
/// returns the average of the four most recent readings, in whole degrees Celsius. The averaging
/// smooths out the converter's noise at the cost of lagging behind the thermocouple: the first
/// three readings after initialization are averaged against zeros.
///
/// # Sharing the bus
/// The driver holds no locks. Reads block for the length of one 16-bit transfer, and nothing
/// stops another user of the same bus from clocking it at the same time. If the bus is shared with
/// other devices, the transport given to the driver must make sure no other chip-select line is
/// asserted while this driver is reading. The same goes for sharing the chip-select line itself.
///
/// The driver doesn't time out transfers; if the bus hangs, so does the read.
#[derive(Clone, Debug)]
pub struct Max6675<T, CS> {
    /// The bus the converter is on.
    transport: T,

    /// Active-low chip-select for the converter.
    chip_select: CS,

    /// The magnitudes being averaged.
    history: History,

    /// The most recent word read from the converter.
    last_reading: Option<Reading>,
}

impl<T, CS> Max6675<T, CS>
where
    T: Transport,
    CS: OutputPin,
{
    /// Create and initialize a driver.
    ///
    /// The bus clock and pins must already be set up, and the chip-select pin must already be an
    /// output driven high. The transfer format is set here, as it's fixed by the converter.
    pub fn new(transport: T, chip_select: CS) -> Result<Self, Error<T, CS>> {
        let mut driver = Self {
            transport,
            chip_select,
            history: History::new(),
            last_reading: None,
        };
        driver.initialize()?;
        Ok(driver)
    }

    /// Reset the driver to the state it was in just after creation.
    ///
    /// The averaging history is zeroed and the transfer format is applied to the transport again.
    pub fn initialize(&mut self) -> Result<(), Error<T, CS>> {
        self.history.clear();
        self.last_reading = None;
        trace!("max6675: setting transfer format {}", MAX6675_FORMAT);
        self.transport
            .set_transfer_format(MAX6675_FORMAT)
            .map_err(Error::Transport)
    }

    /// Read the converter and return the moving average temperature in whole degrees Celsius.
    ///
    /// The result is in `0..=1023` for well-formed readings. The quarter degree fraction is
    /// truncated. The open thermocouple flag does not change the result; check
    /// [`last_reading`][Max6675::last_reading] for it.
    ///
    /// If the transfer fails, the history is left untouched and the error is returned. The
    /// chip-select line is deasserted either way.
    pub fn read_temperature(&mut self) -> Result<u16, Error<T, CS>> {
        let reading = self.read_word()?;
        if reading.is_open_thermocouple() {
            warn!("max6675: thermocouple input is open");
        }
        self.history.insert(reading.magnitude());
        self.last_reading = Some(reading);
        let average = self.history.average();
        trace!(
            "max6675: read {=u16:#x}, average {=u16} counts",
            reading.raw(),
            average
        );
        Ok(counts_to_degrees(average))
    }

    /// Perform a single transfer, framed by the chip-select line.
    fn read_word(&mut self) -> Result<Reading, Error<T, CS>> {
        self.chip_select.set_low().map_err(Error::ChipSelect)?;
        let exchanged = self.transport.exchange16(DUMMY_WORD);
        // Deassert before looking at the result, so a failed transfer doesn't leave the converter
        // selected.
        let deasserted = self.chip_select.set_high();
        let raw = exchanged.map_err(|err| {
            warn!("max6675: bus transfer failed");
            Error::Transport(err)
        })?;
        deasserted.map_err(Error::ChipSelect)?;
        Ok(Reading::from_raw(raw))
    }

    /// The word from the most recent successful read, or `None` if there hasn't been one since
    /// initialization.
    ///
    /// This exposes the status bits that don't factor into the temperature, like the open
    /// thermocouple flag.
    pub fn last_reading(&self) -> Option<Reading> {
        self.last_reading
    }

    /// The current moving average, in counts of 0.25 ℃.
    pub fn average_raw(&self) -> u16 {
        self.history.average()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Destroy the driver, returning the transport and chip-select pin.
    pub fn release(self) -> (T, CS) {
        (self.transport, self.chip_select)
    }
}

#[cfg(test)]
mod test {
    extern crate std;

    use std::vec::Vec;

    use max6675_test_data::*;

    use super::*;
    use crate::transport::ByteTransport;

    type MockDriver = Max6675<ByteTransport<MockSpiBus>, MockChipSelect>;

    fn driver_with_words(words: &[u16]) -> (MockDriver, MockSpiBus, MockChipSelect) {
        let (bus, chip_select) = mock_bus_with_words(words);
        let driver = Max6675::new(ByteTransport::new(bus.clone()), chip_select.clone())
            .expect("creating a driver on a mock bus to succeed");
        (driver, bus, chip_select)
    }

    /// `floor((sum / 4) * 0.25)`, counting missing slots as zero.
    fn expected_temperature(magnitudes: &[u16]) -> u16 {
        let sum: u32 = magnitudes.iter().copied().map(u32::from).sum();
        ((sum / 4) as f32 * 0.25) as u16
    }

    #[test]
    fn first_four_reads() {
        let (mut driver, _bus, _cs) = driver_with_words(&WARMUP_SEQUENCE[..4]);
        for count in 1..=4 {
            let temperature = driver.read_temperature().unwrap();
            assert_eq!(
                temperature,
                expected_temperature(&WARMUP_MAGNITUDES[..count]),
                "read {}",
                count
            );
        }
        // 100 + 104 + 111 + 120 = 435, 435 / 4 = 108, 108 * 0.25 = 27
        assert_eq!(driver.average_raw(), 108);
    }

    #[test]
    fn fifth_read_replaces_first() {
        let (mut driver, _bus, _cs) = driver_with_words(&WARMUP_SEQUENCE);
        for _ in 0..4 {
            driver.read_temperature().unwrap();
        }
        let fifth = driver.read_temperature().unwrap();
        assert_eq!(fifth, expected_temperature(&WARMUP_MAGNITUDES[1..5]));
        assert_eq!(driver.history().slots(), &[132, 104, 111, 120]);
        assert_eq!(driver.history().cursor(), 1);
    }

    #[test]
    fn scaling_boundaries() {
        let (mut driver, _bus, _cs) = driver_with_words(&[FULL_SCALE_WORD; 4]);
        let temperatures: Vec<u16> = (0..4)
            .map(|_| driver.read_temperature().unwrap())
            .collect();
        // 4095 / 4 = 1023 counts, 2047 / 4 = 511, etc.
        assert_eq!(temperatures, [255, 511, 767, 1023]);
        assert_eq!(driver.average_raw(), 4095);

        let (mut driver, _bus, _cs) = driver_with_words(&[0x0000; 4]);
        for _ in 0..4 {
            assert_eq!(driver.read_temperature().unwrap(), 0);
        }
    }

    #[test]
    fn reserved_bit_is_not_masked() {
        let (mut driver, _bus, _cs) = driver_with_words(&[ALL_ONES_WORD; 4]);
        for _ in 0..4 {
            driver.read_temperature().unwrap();
        }
        let reading = driver.last_reading().unwrap();
        assert_eq!(reading.magnitude(), 8191);
        assert!(!reading.is_well_formed());
        assert_eq!(driver.average_raw(), 8191);
    }

    #[test]
    fn open_thermocouple_does_not_change_temperature() {
        let (mut open_driver, _bus, _cs) = driver_with_words(&[open_thermocouple_word(400)]);
        let (mut closed_driver, _bus, _cs) = driver_with_words(&[raw_word(400)]);
        assert_eq!(
            open_driver.read_temperature().unwrap(),
            closed_driver.read_temperature().unwrap()
        );
        assert!(open_driver.last_reading().unwrap().is_open_thermocouple());
        assert!(!closed_driver.last_reading().unwrap().is_open_thermocouple());
    }

    #[test]
    fn chip_select_frames_each_exchange() {
        let (mut driver, bus, _cs) = driver_with_words(&WARMUP_SEQUENCE[..3]);
        assert_eq!(bus.chip_select_level(), PinLevel::High);
        // Initialization doesn't touch the bus.
        assert!(bus.events().is_empty());
        for _ in 0..3 {
            driver.read_temperature().unwrap();
            assert_eq!(bus.chip_select_level(), PinLevel::High);
        }
        let events = bus.events();
        assert_eq!(events.len(), 9);
        for (index, frame) in events.chunks_exact(3).enumerate() {
            assert_eq!(frame[0], BusEvent::ChipSelect(PinLevel::Low));
            assert_eq!(
                frame[1],
                BusEvent::Exchange {
                    sent: DUMMY_WORD,
                    received: WARMUP_SEQUENCE[index],
                    selected: true,
                }
            );
            assert_eq!(frame[2], BusEvent::ChipSelect(PinLevel::High));
        }
    }

    #[test]
    fn transfer_format_applied() {
        let (driver, _bus, _cs) = driver_with_words(&[]);
        let (transport, _chip_select) = driver.release();
        assert_eq!(transport.transfer_format(), Some(MAX6675_FORMAT));
    }

    #[test]
    fn reinitialize_matches_fresh_driver() {
        let (mut fresh, _bus, _cs) = driver_with_words(&WARMUP_SEQUENCE);
        let fresh_temperatures: Vec<u16> = (0..WARMUP_SEQUENCE.len())
            .map(|_| fresh.read_temperature().unwrap())
            .collect();

        let (mut reused, bus, _cs) = driver_with_words(&[BOILING_WORD, FULL_SCALE_WORD, 0x1000]);
        for _ in 0..3 {
            reused.read_temperature().unwrap();
        }
        reused.initialize().unwrap();
        assert_eq!(reused.history(), &History::new());
        assert_eq!(reused.last_reading(), None);
        bus.queue_words(&WARMUP_SEQUENCE);
        let reused_temperatures: Vec<u16> = (0..WARMUP_SEQUENCE.len())
            .map(|_| reused.read_temperature().unwrap())
            .collect();
        assert_eq!(fresh_temperatures, reused_temperatures);
    }

    #[test]
    fn initialize_twice() {
        let (mut driver, _bus, _cs) = driver_with_words(&[ROOM_TEMPERATURE_WORD]);
        driver.initialize().unwrap();
        driver.initialize().unwrap();
        assert_eq!(driver.read_temperature().unwrap(), expected_temperature(&[100]));
    }

    #[test]
    fn failed_exchange_leaves_history() {
        let (mut driver, bus, _cs) = driver_with_words(&[BOILING_WORD, BOILING_WORD]);
        driver.read_temperature().unwrap();
        let before = driver.history().clone();
        bus.clear_events();
        bus.fail_next_exchange();
        assert_eq!(
            driver.read_temperature(),
            Err(Error::Transport(MockError::Injected))
        );
        assert_eq!(
            &*bus.events(),
            &[
                BusEvent::ChipSelect(PinLevel::Low),
                BusEvent::FailedExchange { selected: true },
                BusEvent::ChipSelect(PinLevel::High),
            ]
        );
        assert_eq!(driver.history(), &before);
        assert_eq!(driver.last_reading(), Some(Reading::from_raw(BOILING_WORD)));
        // The bus recovers, and the next read carries on from where the history was.
        assert_eq!(driver.read_temperature().unwrap(), expected_temperature(&[400, 400]));
    }

    #[test]
    fn failed_deassert_discards_reading() {
        let (mut driver, bus, chip_select) =
            driver_with_words(&[ROOM_TEMPERATURE_WORD, ROOM_TEMPERATURE_WORD]);
        chip_select.fail_next_deassert();
        assert_eq!(
            driver.read_temperature(),
            Err(Error::ChipSelect(MockError::Injected))
        );
        // The exchange itself went through before the pin failed.
        assert_eq!(bus.exchange_count(), 1);
        assert_eq!(driver.history(), &History::new());
        assert_eq!(driver.history().cursor(), 0);
        assert_eq!(driver.last_reading(), None);
        // The next read starts from the same empty history.
        assert_eq!(driver.read_temperature().unwrap(), expected_temperature(&[100]));
        assert_eq!(bus.chip_select_level(), PinLevel::High);
        assert_eq!(driver.history().slots(), &[100, 0, 0, 0]);
    }

    #[test]
    fn failed_assert_skips_exchange() {
        let (mut driver, bus, chip_select) = driver_with_words(&[BOILING_WORD]);
        chip_select.fail_next_assert();
        assert_eq!(
            driver.read_temperature(),
            Err(Error::ChipSelect(MockError::Injected))
        );
        assert_eq!(bus.exchange_count(), 0);
        assert_eq!(bus.chip_select_level(), PinLevel::High);
        assert_eq!(driver.history(), &History::new());
    }
}
