use std::env;
use std::thread::sleep;
use std::time::Duration;

use anyhow::Context;
use linux_embedded_hal::spidev::SpidevOptions;
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Spidev, SysfsPin};

use max6675::Max6675;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        println!("Two arguments required: <SPI device> <chip-select GPIO>");
        return Ok(());
    }
    let chip_select_number: u64 = args[2]
        .parse()
        .context("The chip-select GPIO should be an integer")?;

    // Board setup is our job, not the driver's: 1MHz clock, and a chip-select line that starts
    // deasserted.
    let mut spi = Spidev::open(&args[1]).context("The given path should be a spidev device")?;
    spi.configure(&SpidevOptions::new().max_speed_hz(1_000_000).build())?;
    let chip_select = SysfsPin::new(chip_select_number);
    chip_select.export()?;
    chip_select.set_direction(Direction::High)?;

    let mut sensor = Max6675::new(spi, chip_select)?;
    let delay = Duration::from_millis(1000);
    loop {
        sleep(delay);
        let temperature = sensor.read_temperature()?;
        println!("Temperature = {}", temperature);
        if let Some(reading) = sensor.last_reading() {
            if reading.is_open_thermocouple() {
                println!("  warning: no thermocouple connected");
            }
        }
    }
}
