// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use std::cell::{Ref, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::blocking::spi;
use embedded_hal::digital::v2::OutputPin;

/// The number of bytes in one MAX6675 output word.
const WORD_BYTES: usize = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PinLevel {
    Low,
    High,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusEvent {
    /// The chip-select line was driven to the given level.
    ChipSelect(PinLevel),

    /// A full word was clocked in and out.
    ///
    /// `selected` records whether chip-select was asserted while the clock was running.
    Exchange {
        sent: u16,
        received: u16,
        selected: bool,
    },

    /// An exchange was attempted but the bus reported an error.
    FailedExchange { selected: bool },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MockError {
    /// No response word was queued and no idle word was set.
    NoResponse,

    /// A failure requested through [`MockSpiBus::fail_next_exchange`],
    /// [`MockChipSelect::fail_next_assert`] or [`MockChipSelect::fail_next_deassert`].
    Injected,

    /// A byte-wide transfer that doesn't cover a whole number of 16-bit words. The value is the
    /// length of the buffer in bytes.
    PartialWord(usize),
}

#[derive(Debug)]
struct BusState {
    chip_select: PinLevel,
    responses: VecDeque<u16>,
    idle_word: Option<u16>,
    failing_exchanges: usize,
    failing_asserts: usize,
    failing_deasserts: usize,
    events: Vec<BusEvent>,
}

impl BusState {
    fn selected(&self) -> bool {
        self.chip_select == PinLevel::Low
    }

    fn exchange(&mut self, sent: u16) -> Result<u16, MockError> {
        let selected = self.selected();
        if self.failing_exchanges > 0 {
            self.failing_exchanges -= 1;
            self.events.push(BusEvent::FailedExchange { selected });
            return Err(MockError::Injected);
        }
        match self.responses.pop_front().or(self.idle_word) {
            Some(received) => {
                self.events.push(BusEvent::Exchange {
                    sent,
                    received,
                    selected,
                });
                Ok(received)
            }
            None => {
                self.events.push(BusEvent::FailedExchange { selected });
                Err(MockError::NoResponse)
            }
        }
    }
}

/// A fake SPI bus with a MAX6675 attached.
///
/// Clones share state, as does the [`MockChipSelect`] created alongside it, so a test can keep a
/// handle to inspect the bus after handing the first one to a driver.
#[derive(Clone, Debug)]
pub struct MockSpiBus {
    state: Rc<RefCell<BusState>>,
}

/// The chip-select line for a [`MockSpiBus`].
#[derive(Clone, Debug)]
pub struct MockChipSelect {
    state: Rc<RefCell<BusState>>,
}

/// Create a bus and chip-select pair. The chip-select line starts deasserted (high), the same as
/// board setup code is expected to leave it.
pub fn mock_bus() -> (MockSpiBus, MockChipSelect) {
    let state = Rc::new(RefCell::new(BusState {
        chip_select: PinLevel::High,
        responses: VecDeque::new(),
        idle_word: None,
        failing_exchanges: 0,
        failing_asserts: 0,
        failing_deasserts: 0,
        events: Vec::new(),
    }));
    (
        MockSpiBus {
            state: Rc::clone(&state),
        },
        MockChipSelect { state },
    )
}

/// Create a bus and chip-select pair with the given words queued as responses.
pub fn mock_bus_with_words(words: &[u16]) -> (MockSpiBus, MockChipSelect) {
    let (bus, chip_select) = mock_bus();
    bus.queue_words(words);
    (bus, chip_select)
}

impl MockSpiBus {
    pub fn queue_words(&self, words: &[u16]) {
        self.state
            .borrow_mut()
            .responses
            .extend(words.iter().copied());
    }

    /// Set the word returned once the queue is empty. `None` makes an empty queue an error.
    pub fn set_idle_word(&self, word: Option<u16>) {
        self.state.borrow_mut().idle_word = word;
    }

    /// Make the next exchange fail with [`MockError::Injected`].
    pub fn fail_next_exchange(&self) {
        self.state.borrow_mut().failing_exchanges += 1;
    }

    pub fn chip_select_level(&self) -> PinLevel {
        self.state.borrow().chip_select
    }

    /// Every chip-select change and exchange, oldest first.
    pub fn events(&self) -> Ref<'_, [BusEvent]> {
        Ref::map(self.state.borrow(), |state| &state.events[..])
    }

    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear()
    }

    /// The number of successful exchanges recorded.
    pub fn exchange_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, BusEvent::Exchange { .. }))
            .count()
    }
}

impl MockChipSelect {
    /// Make the next attempt to drive the line low fail with [`MockError::Injected`].
    pub fn fail_next_assert(&self) {
        self.state.borrow_mut().failing_asserts += 1;
    }

    /// Make the next attempt to drive the line high fail with [`MockError::Injected`]. The line
    /// stays at its current level.
    pub fn fail_next_deassert(&self) {
        self.state.borrow_mut().failing_deasserts += 1;
    }
}

impl spi::Transfer<u8> for MockSpiBus {
    type Error = MockError;

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], Self::Error> {
        if words.len() % WORD_BYTES != 0 {
            return Err(MockError::PartialWord(words.len()));
        }
        let mut state = self.state.borrow_mut();
        for chunk in words.chunks_exact_mut(WORD_BYTES) {
            let sent = u16::from_be_bytes([chunk[0], chunk[1]]);
            let received = state.exchange(sent)?;
            chunk.copy_from_slice(&received.to_be_bytes());
        }
        Ok(words)
    }
}

impl spi::Transfer<u16> for MockSpiBus {
    type Error = MockError;

    fn transfer<'w>(&mut self, words: &'w mut [u16]) -> Result<&'w [u16], Self::Error> {
        let mut state = self.state.borrow_mut();
        for word in words.iter_mut() {
            *word = state.exchange(*word)?;
        }
        Ok(words)
    }
}

impl OutputPin for MockChipSelect {
    type Error = MockError;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        if state.failing_asserts > 0 {
            state.failing_asserts -= 1;
            return Err(MockError::Injected);
        }
        state.chip_select = PinLevel::Low;
        state.events.push(BusEvent::ChipSelect(PinLevel::Low));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        if state.failing_deasserts > 0 {
            state.failing_deasserts -= 1;
            return Err(MockError::Injected);
        }
        state.chip_select = PinLevel::High;
        state.events.push(BusEvent::ChipSelect(PinLevel::High));
        Ok(())
    }
}
