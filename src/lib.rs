// HomeWatch — Environmental-Monitoring Appliance Control Core
//
// The hardware-independent half of the firmware: the cooperative control
// loop, the interrupt-to-loop flag bus, debounced navigation, the
// Passive/Monitor state machine, alert escalation and telemetry formatting.
// Everything here builds and tests on the host; the `drivers` module and
// the binary's hardware wiring exist only for the ESP-IDF target.

pub mod alerts;
pub mod config;
pub mod controller;
pub mod events;
pub mod hal;
pub mod input;
pub mod screens;
pub mod telemetry;

#[cfg(target_os = "espidf")]
pub mod drivers;
