// HomeWatch — SSD1306 OLED Driver
//
// Framebuffer driver over the shared I2C bus. Text and primitives come
// from embedded-graphics; every drawing call pushes the buffer out
// immediately so drawing stays fire-and-forget for the caller.

use core::convert::Infallible;

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::MonoTextStyleBuilder;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use crate::config::*;
use crate::drivers::SharedBus;

// Control bytes preceding every I2C transfer.
const CTRL_COMMAND: u8 = 0x00;
const CTRL_DATA: u8 = 0x40;

pub struct OledDisplay {
    bus: SharedBus,
    buffer: [u8; DISPLAY_BUFFER_SIZE],
}

impl OledDisplay {
    pub fn new(bus: SharedBus) -> Self {
        Self {
            bus,
            buffer: [0; DISPLAY_BUFFER_SIZE],
        }
    }

    /// Verify the panel answers on the bus.
    pub fn is_connected(&self) -> bool {
        let mut bus = self.bus.lock().unwrap();
        bus.write(I2C_ADDR_OLED, &[CTRL_COMMAND, 0xE3], I2C_TIMEOUT_TICKS)
            .is_ok() // NOP
    }

    /// Standard 128x64 init: horizontal addressing, segment remap, charge
    /// pump on.
    pub fn init(&mut self) -> anyhow::Result<()> {
        self.command(&[
            0xAE, // display off
            0xD5, 0x80, // clock divide
            0xA8, 0x3F, // multiplex 64
            0xD3, 0x00, // no display offset
            0x40, // start line 0
            0x8D, 0x14, // charge pump on
            0x20, 0x00, // horizontal addressing
            0xA1, 0xC8, // remap segment/scan direction
            0xDA, 0x12, // COM pins
            0x81, 0xCF, // contrast
            0xD9, 0xF1, // pre-charge
            0xDB, 0x40, // VCOM deselect
            0xA4, 0xA6, // resume RAM, non-inverted
            0xAF, // display on
        ])?;
        self.clear()?;
        log::info!("SSD1306 initialised ({}x{})", SCREEN_WIDTH, SCREEN_HEIGHT);
        Ok(())
    }

    pub fn clear(&mut self) -> anyhow::Result<()> {
        self.buffer = [0; DISPLAY_BUFFER_SIZE];
        self.flush()
    }

    /// Draw `s` at (x, y). Size 1 is the 6x10 label font; anything larger
    /// uses the 10x20 value font. Glyph backgrounds are painted off so
    /// re-rendering overwrites stale characters.
    pub fn text(&mut self, x: i32, y: i32, s: &str, size: u8) -> anyhow::Result<()> {
        let style = if size > 1 {
            MonoTextStyleBuilder::new()
                .font(&FONT_10X20)
                .text_color(BinaryColor::On)
                .background_color(BinaryColor::Off)
                .build()
        } else {
            MonoTextStyleBuilder::new()
                .font(&FONT_6X10)
                .text_color(BinaryColor::On)
                .background_color(BinaryColor::Off)
                .build()
        };
        let _ = Text::with_baseline(s, Point::new(x, y), style, Baseline::Top).draw(self);
        self.flush()
    }

    /// Single-pixel rectangle outline between two corners.
    pub fn rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> anyhow::Result<()> {
        let _ = Rectangle::with_corners(Point::new(x0, y0), Point::new(x1, y1))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(self);
        self.flush()
    }

    fn command(&mut self, commands: &[u8]) -> anyhow::Result<()> {
        let mut bus = self.bus.lock().unwrap();
        for &c in commands {
            bus.write(I2C_ADDR_OLED, &[CTRL_COMMAND, c], I2C_TIMEOUT_TICKS)?;
        }
        Ok(())
    }

    /// Push the whole framebuffer. The window covers the full panel, so
    /// partial damage never leaves stale columns.
    fn flush(&mut self) -> anyhow::Result<()> {
        self.command(&[0x21, 0x00, 0x7F, 0x22, 0x00, 0x07])?;
        let mut bus = self.bus.lock().unwrap();
        let mut packet = [0u8; 65];
        packet[0] = CTRL_DATA;
        for chunk in self.buffer.chunks(64) {
            packet[1..=chunk.len()].copy_from_slice(chunk);
            bus.write(I2C_ADDR_OLED, &packet[..=chunk.len()], I2C_TIMEOUT_TICKS)?;
        }
        Ok(())
    }
}

impl OriginDimensions for OledDisplay {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for OledDisplay {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if (0..SCREEN_WIDTH as i32).contains(&point.x)
                && (0..SCREEN_HEIGHT as i32).contains(&point.y)
            {
                let idx = point.x as usize + (point.y as usize / 8) * SCREEN_WIDTH as usize;
                let bit = 1u8 << (point.y as usize % 8);
                match color {
                    BinaryColor::On => self.buffer[idx] |= bit,
                    BinaryColor::Off => self.buffer[idx] &= !bit,
                }
            }
        }
        Ok(())
    }
}
