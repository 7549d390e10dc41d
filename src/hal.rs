// HomeWatch — Peripheral Contracts
//
// The control core never touches hardware directly: everything it consumes
// is behind these traits. The ESP-IDF integration implements them over the
// real drivers; the test suite implements them over a recording mock.

/// Milliseconds since boot. Wraps at ~49 days — all comparisons use
/// wrapping arithmetic.
pub type Tick = u32;

/// Ambient-light alarm control. Split out of [`Board`] because the
/// interrupt front needs it too (the darkness hysteresis flips the armed
/// window from interrupt context).
pub trait LightAlarm {
    /// Re-arm the alarm window: the sensor interrupts when the reading
    /// leaves `[lo, hi]`.
    fn set_light_thresholds(&mut self, lo: u32, hi: u32);

    /// Acknowledge a fired alarm so the next crossing can interrupt again.
    fn clear_light_alarm(&mut self);
}

/// Everything the cooperative loop needs from the appliance hardware.
///
/// All operations are infallible from the core's perspective: sensor reads
/// return the last valid conversion, drawing primitives are idempotent,
/// actuator writes are fire-and-forget and transmission is best-effort.
/// The platform layer absorbs and logs bus errors.
pub trait Board: LightAlarm {
    fn now_ticks(&mut self) -> Tick;

    // ---- sensors ----
    fn read_light(&mut self) -> u32;
    /// Tenths of a degree Celsius.
    fn read_temperature(&mut self) -> i32;
    fn read_acceleration(&mut self) -> (i16, i16, i16);

    // ---- display ----
    fn clear_display(&mut self);
    fn render_text(&mut self, x: i32, y: i32, s: &str, size: u8);
    fn render_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32);

    // ---- actuators ----
    fn set_indicator_leds(&mut self, mask: u8);
    fn set_led_array(&mut self, pattern: u16, mask: u16);
    fn set_discrete_led(&mut self, on: bool);
    fn drive_siren(&mut self, on: bool);
    /// Show a glyph on the 7-segment status digit; `' '` blanks it.
    fn set_digit(&mut self, glyph: char);

    // ---- telemetry ----
    fn transmit_line(&mut self, line: &str);
}
