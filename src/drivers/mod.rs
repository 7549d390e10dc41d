// HomeWatch — Peripheral Drivers (ESP-IDF only)
//
// Register-level drivers over one shared I2C bus, plus the SPI 7-segment
// latch. The control core never sees these directly: `main` wraps them in
// the `Board` implementation.

use std::sync::Mutex;

use esp_idf_hal::i2c::I2cDriver;

pub mod display;
pub mod isl29003;
pub mod led7seg;
pub mod lm75;
pub mod mma7455;
pub mod pca9532;

/// Thread-safe handle to the shared I2C bus.
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;
