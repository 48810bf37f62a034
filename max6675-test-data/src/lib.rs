// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
mod sample_data;
mod spi_mock;

pub use sample_data::*;
pub use spi_mock::{
    mock_bus, mock_bus_with_words, BusEvent, MockChipSelect, MockError, MockSpiBus, PinLevel,
};
