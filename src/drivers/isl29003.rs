// HomeWatch — ISL29003 Ambient-Light Sensor Driver
//
// Register-level driver over the shared I2C bus. Provides lux readings
// plus the programmable alarm window behind the darkness hysteresis.

use crate::config::*;
use crate::drivers::SharedBus;

const REG_COMMAND: u8 = 0x00;
const REG_CONTROL: u8 = 0x01;
const REG_THRESH_HI: u8 = 0x02;
const REG_THRESH_LO: u8 = 0x03;
const REG_DATA_LSB: u8 = 0x04;

// ADC enabled, continuous ambient-light conversion.
const CMD_ENABLE: u8 = 0x80;
// Range 0..973 lux, interrupt persistence of a single conversion.
const CTRL_RANGE_973_PERSIST_1: u8 = 0x00;

const RANGE_LUX: u32 = 973;

pub struct Isl29003 {
    bus: SharedBus,
}

impl Isl29003 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    pub fn init(&mut self) -> anyhow::Result<()> {
        let mut bus = self.bus.lock().unwrap();
        bus.write(
            I2C_ADDR_LIGHT,
            &[REG_COMMAND, CMD_ENABLE],
            I2C_TIMEOUT_TICKS,
        )?;
        bus.write(
            I2C_ADDR_LIGHT,
            &[REG_CONTROL, CTRL_RANGE_973_PERSIST_1],
            I2C_TIMEOUT_TICKS,
        )?;
        log::info!("ISL29003 initialised (range 0..{} lux)", RANGE_LUX);
        Ok(())
    }

    /// Latest conversion converted to lux.
    pub fn read_lux(&mut self) -> anyhow::Result<u32> {
        let mut bus = self.bus.lock().unwrap();
        let mut raw = [0u8; 2];
        bus.write_read(
            I2C_ADDR_LIGHT,
            &[REG_DATA_LSB],
            &mut raw,
            I2C_TIMEOUT_TICKS,
        )?;
        let counts = u16::from_le_bytes(raw) as u32;
        Ok(counts * RANGE_LUX >> 16)
    }

    /// Arm the alarm window: the INT pin asserts when a conversion lands
    /// outside [lo, hi]. The registers hold the top 8 bits of the 16-bit
    /// count, so thresholds are quantised to ~4-lux steps.
    pub fn set_thresholds(&mut self, lo: u32, hi: u32) -> anyhow::Result<()> {
        let mut bus = self.bus.lock().unwrap();
        bus.write(
            I2C_ADDR_LIGHT,
            &[REG_THRESH_LO, lux_to_threshold(lo)],
            I2C_TIMEOUT_TICKS,
        )?;
        bus.write(
            I2C_ADDR_LIGHT,
            &[REG_THRESH_HI, lux_to_threshold(hi)],
            I2C_TIMEOUT_TICKS,
        )?;
        Ok(())
    }

    /// Acknowledge a fired alarm: rewriting the command register clears the
    /// interrupt flag and releases the INT pin.
    pub fn clear_alarm(&mut self) -> anyhow::Result<()> {
        let mut bus = self.bus.lock().unwrap();
        bus.write(
            I2C_ADDR_LIGHT,
            &[REG_COMMAND, CMD_ENABLE],
            I2C_TIMEOUT_TICKS,
        )?;
        Ok(())
    }
}

fn lux_to_threshold(lux: u32) -> u8 {
    (lux.min(RANGE_LUX) * 256 / RANGE_LUX).min(255) as u8
}
