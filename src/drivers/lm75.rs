// HomeWatch — LM75 Temperature Sensor Driver

use crate::config::*;
use crate::drivers::SharedBus;

const REG_TEMP: u8 = 0x00;

pub struct Lm75 {
    bus: SharedBus,
}

impl Lm75 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    /// Latest reading in tenths of a degree Celsius. The part reports
    /// 9-bit halves of a degree, so results land on 5-tenth steps.
    pub fn read_tenths(&mut self) -> anyhow::Result<i32> {
        let mut bus = self.bus.lock().unwrap();
        let mut raw = [0u8; 2];
        bus.write_read(I2C_ADDR_TEMP, &[REG_TEMP], &mut raw, I2C_TIMEOUT_TICKS)?;
        let halves = (i16::from_be_bytes(raw) >> 7) as i32;
        Ok(halves * 5)
    }
}
