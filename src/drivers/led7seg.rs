// HomeWatch — 7-Segment Status Digit Driver
//
// One glyph latched into an SPI shift register. Segment order is
// (dp)gfedcba, active high.

use esp_idf_hal::spi::{SpiDeviceDriver, SpiDriver};

pub struct Led7Seg<'d> {
    spi: SpiDeviceDriver<'d, SpiDriver<'d>>,
}

impl<'d> Led7Seg<'d> {
    pub fn new(spi: SpiDeviceDriver<'d, SpiDriver<'d>>) -> Self {
        Self { spi }
    }

    /// Latch a glyph. Unmapped characters (including `' '`) blank the
    /// digit.
    pub fn set_char(&mut self, glyph: char) -> anyhow::Result<()> {
        self.spi.write(&[segments_for(glyph)])?;
        Ok(())
    }
}

fn segments_for(glyph: char) -> u8 {
    match glyph {
        '0' => 0x3F,
        '1' => 0x06,
        '2' => 0x5B,
        '3' => 0x4F,
        '4' => 0x66,
        '5' => 0x6D,
        '6' => 0x7D,
        '7' => 0x07,
        '8' => 0x7F,
        '9' => 0x6F,
        'A' => 0x77,
        'B' => 0x7C,
        'C' => 0x39,
        'D' => 0x5E,
        'E' => 0x79,
        'F' => 0x71,
        _ => 0x00,
    }
}
