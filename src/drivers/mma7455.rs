// HomeWatch — MMA7455 Accelerometer Driver
//
// 8-bit three-axis readings at ±2 g (64 counts per g) over the shared I2C
// bus. The control core works on deltas against the Monitor-entry offsets,
// so the coarse resolution is plenty.

use crate::config::*;
use crate::drivers::SharedBus;

const REG_XOUT8: u8 = 0x06; // X/Y/Z 8-bit outputs are consecutive
const REG_STATUS: u8 = 0x09;
const REG_MCTL: u8 = 0x16;

// Measurement mode, ±2 g (GLVL 01 -> 64 LSB/g).
const MCTL_MEASURE_2G: u8 = 0x05;

const STATUS_DRDY: u8 = 0x01;

pub struct Mma7455 {
    bus: SharedBus,
}

impl Mma7455 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    /// Verify the device is reachable on the I2C bus.
    pub fn is_connected(&self) -> bool {
        let mut bus = self.bus.lock().unwrap();
        let mut buf = [0u8; 1];
        bus.write_read(I2C_ADDR_ACCEL, &[REG_STATUS], &mut buf, I2C_TIMEOUT_TICKS)
            .is_ok()
    }

    /// Put the part in continuous measurement mode.
    pub fn init(&mut self) -> anyhow::Result<()> {
        let mut bus = self.bus.lock().unwrap();
        bus.write(
            I2C_ADDR_ACCEL,
            &[REG_MCTL, MCTL_MEASURE_2G],
            I2C_TIMEOUT_TICKS,
        )?;
        log::info!("MMA7455 initialised (±2g, 64 counts/g)");
        Ok(())
    }

    /// Burst-read the three 8-bit axes. Values are signed counts.
    pub fn read(&mut self) -> anyhow::Result<(i16, i16, i16)> {
        let mut bus = self.bus.lock().unwrap();
        let mut raw = [0u8; 3];
        bus.write_read(I2C_ADDR_ACCEL, &[REG_XOUT8], &mut raw, I2C_TIMEOUT_TICKS)?;
        Ok((
            raw[0] as i8 as i16,
            raw[1] as i8 as i16,
            raw[2] as i8 as i16,
        ))
    }

    /// True once a fresh conversion is available.
    #[allow(dead_code)]
    pub fn data_ready(&mut self) -> anyhow::Result<bool> {
        let mut bus = self.bus.lock().unwrap();
        let mut buf = [0u8; 1];
        bus.write_read(I2C_ADDR_ACCEL, &[REG_STATUS], &mut buf, I2C_TIMEOUT_TICKS)?;
        Ok(buf[0] & STATUS_DRDY != 0)
    }
}
