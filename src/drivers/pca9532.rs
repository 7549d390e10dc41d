// HomeWatch — PCA9532 LED-Array Driver
//
// 16-LED I2C port expander. The chip takes two bits per LED across four
// selector registers; a shadow of the pattern lets callers update a masked
// subset without re-deriving the rest.

use crate::config::*;
use crate::drivers::SharedBus;

const REG_LS0: u8 = 0x06;
const AUTO_INCREMENT: u8 = 0x10;

// Two-bit LED selector states.
const LED_OFF: u8 = 0b00;
const LED_ON: u8 = 0b01;

pub struct Pca9532 {
    bus: SharedBus,
    shadow: u16,
}

impl Pca9532 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus, shadow: 0 }
    }

    pub fn init(&mut self) -> anyhow::Result<()> {
        self.set_leds(0x0000, 0xFFFF)
    }

    /// Update the LEDs selected by `mask` to the states in `pattern`;
    /// unselected LEDs keep their shadowed state.
    pub fn set_leds(&mut self, pattern: u16, mask: u16) -> anyhow::Result<()> {
        self.shadow = (self.shadow & !mask) | (pattern & mask);

        let mut frame = [0u8; 5];
        frame[0] = AUTO_INCREMENT | REG_LS0;
        for led in 0..16 {
            let state = if self.shadow >> led & 1 != 0 { LED_ON } else { LED_OFF };
            frame[1 + led / 4] |= state << ((led % 4) * 2);
        }

        let mut bus = self.bus.lock().unwrap();
        bus.write(I2C_ADDR_LED_ARRAY, &frame, I2C_TIMEOUT_TICKS)?;
        Ok(())
    }
}
