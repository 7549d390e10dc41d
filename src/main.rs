// HomeWatch — Firmware Entry Point
//
// Boot sequence (ESP-IDF target):
//   1. Bring up the shared I2C bus, the OLED, the sensors and the outputs.
//   2. Build the controller and its interrupt-front handles.
//   3. Spawn the input service thread: GPIO edge interrupts latch
//      pending-edge bits and wake it via a task notification; it feeds the
//      debouncer and the light-alarm hysteresis.
//   4. Start the two periodic timers (~0.33 s blink, ~1 s digit/sampling).
//   5. Enter the cooperative loop. It parks in Passive until the mode
//      switch flips the appliance into Monitor.
//
// Host builds keep only the control core; `cargo test` exercises it.

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    app::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("homewatch control core — host build");
    log::info!("hardware integration targets ESP-IDF; run `cargo test` to exercise the control loop");
    Ok(())
}

#[cfg(target_os = "espidf")]
mod app {
    use std::num::NonZeroU32;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    use esp_idf_hal::delay::BLOCK;
    use esp_idf_hal::gpio::{
        AnyIOPin, AnyInputPin, AnyOutputPin, Input, InputPin, InterruptType, Output, OutputPin,
        PinDriver, Pull,
    };
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;
    use esp_idf_hal::spi::{config::Config as SpiConfig, SpiDeviceDriver, SpiDriver, SpiDriverConfig};
    use esp_idf_hal::task::notification::Notification;
    use esp_idf_hal::uart::{config::Config as UartConfig, UartDriver};
    use esp_idf_svc::timer::EspTaskTimerService;

    use homewatch::alerts::{ALERT_DARK_MOVEMENT, ALERT_FIRE};
    use homewatch::config::*;
    use homewatch::controller::{Controller, IsrHandles};
    use homewatch::drivers::display::OledDisplay;
    use homewatch::drivers::isl29003::Isl29003;
    use homewatch::drivers::led7seg::Led7Seg;
    use homewatch::drivers::lm75::Lm75;
    use homewatch::drivers::mma7455::Mma7455;
    use homewatch::drivers::pca9532::Pca9532;
    use homewatch::drivers::SharedBus;
    use homewatch::hal::{Board, LightAlarm, Tick};
    use homewatch::input::{Button, RotaryChannel};

    /// Milliseconds since boot (wraps at ~49 days — fine for cooldowns).
    fn now_ms() -> Tick {
        unsafe { (esp_idf_sys::esp_timer_get_time() / 1000) as Tick }
    }

    // -----------------------------------------------------------------------
    // Pending-edge latch: GPIO ISRs set a bit and wake the input service.
    // -----------------------------------------------------------------------
    const EDGE_ROTARY_A: u32 = 1 << 0;
    const EDGE_ROTARY_B: u32 = 1 << 1;
    const EDGE_NAV_UP: u32 = 1 << 2;
    const EDGE_NAV_DOWN: u32 = 1 << 3;
    const EDGE_NAV_LEFT: u32 = 1 << 4;
    const EDGE_NAV_RIGHT: u32 = 1 << 5;
    const EDGE_NAV_CENTER: u32 = 1 << 6;
    const EDGE_LIGHT: u32 = 1 << 7;
    const EDGE_MODE: u32 = 1 << 8;

    static PENDING_EDGES: AtomicU32 = AtomicU32::new(0);

    pub fn run() -> anyhow::Result<()> {
        // Link esp-idf-sys runtime patches and initialise logging.
        esp_idf_svc::sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();
        log::info!("HomeWatch firmware starting…");

        let peripherals = Peripherals::take()?;

        // ---- I2C bus (OLED + sensors + LED array) -------------------------
        let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio21, // SDA
            peripherals.pins.gpio22, // SCL
            &i2c_config,
        )?;
        // SAFETY: The I2C peripheral is a singleton obtained from
        // `Peripherals::take()`. It lives for the entire programme duration
        // (the firmware never exits).
        let i2c_bus: SharedBus =
            Box::leak(Box::new(Mutex::new(unsafe { core::mem::transmute(i2c) })));

        // ---- I2C peripherals ----------------------------------------------
        let mut oled = OledDisplay::new(i2c_bus);
        oled.init()?;
        let mut light = Isl29003::new(i2c_bus);
        light.init()?;
        let mut accel = Mma7455::new(i2c_bus);
        accel.init()?;
        let temp = Lm75::new(i2c_bus);
        let mut array = Pca9532::new(i2c_bus);
        array.init()?;

        let oled_ok = oled.is_connected();
        let accel_ok = accel.is_connected();
        if !oled_ok || !accel_ok {
            log::error!("component check FAILED — OLED:{} ACCEL:{}", oled_ok, accel_ok);
            // Continue anyway so we can still debug via serial.
        }

        // ---- 7-segment status digit (SPI shift register) ------------------
        let spi = SpiDriver::new(
            peripherals.spi2,
            peripherals.pins.gpio18, // SCLK
            peripherals.pins.gpio23, // MOSI
            Option::<AnyIOPin>::None,
            &SpiDriverConfig::new(),
        )?;
        let sevenseg = Led7Seg::new(SpiDeviceDriver::new(
            spi,
            Some(peripherals.pins.gpio5), // latch
            &SpiConfig::new().baudrate(1u32.MHz().into()),
        )?);

        // ---- Telemetry UART -----------------------------------------------
        let uart = UartDriver::new(
            peripherals.uart1,
            peripherals.pins.gpio17, // TX
            peripherals.pins.gpio16, // RX (unused)
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &UartConfig::new().baudrate(Hertz(115_200)),
        )?;

        // ---- Discrete outputs ---------------------------------------------
        let board = EspBoard {
            oled,
            light,
            accel,
            temp,
            array,
            sevenseg,
            uart,
            siren: PinDriver::output(peripherals.pins.gpio13.downgrade_output())?,
            led_red: PinDriver::output(peripherals.pins.gpio14.downgrade_output())?,
            led_blue: PinDriver::output(peripherals.pins.gpio12.downgrade_output())?,
            led_aux: PinDriver::output(peripherals.pins.gpio15.downgrade_output())?,
            last_light: 0,
            last_temp: 0,
            last_acc: (0, 0, 0),
        };

        let (mut controller, handles) = Controller::new(board);

        // ---- Input service thread -----------------------------------------
        let input_pins = InputPins {
            rotary_a: PinDriver::input(peripherals.pins.gpio32.downgrade_input())?,
            rotary_b: PinDriver::input(peripherals.pins.gpio33.downgrade_input())?,
            up: PinDriver::input(peripherals.pins.gpio34.downgrade_input())?,
            down: PinDriver::input(peripherals.pins.gpio35.downgrade_input())?,
            left: PinDriver::input(peripherals.pins.gpio36.downgrade_input())?,
            right: PinDriver::input(peripherals.pins.gpio39.downgrade_input())?,
            center: PinDriver::input(peripherals.pins.gpio25.downgrade_input())?,
            mode: PinDriver::input(peripherals.pins.gpio26.downgrade_input())?,
            light: PinDriver::input(peripherals.pins.gpio27.downgrade_input())?,
        };
        let isr_handles = handles.clone();
        thread::Builder::new()
            .name("input".into())
            .stack_size(STACK_INPUT)
            .spawn(move || {
                if let Err(e) = input_service(input_pins, i2c_bus, isr_handles) {
                    log::error!("input service failed: {e}");
                }
            })?;

        // ---- Periodic sources ---------------------------------------------
        let timer_service = EspTaskTimerService::new()?;
        let fast_timer = {
            let h = handles.clone();
            timer_service.timer(move || h.on_fast_tick())?
        };
        fast_timer.every(Duration::from_millis(FAST_TICK_MS))?;
        let slow_timer = {
            let h = handles.clone();
            timer_service.timer(move || h.on_slow_tick())?
        };
        slow_timer.every(Duration::from_millis(SLOW_TICK_MS))?;

        log::info!("boot complete — entering control loop");
        controller.run_forever()
    }

    // -----------------------------------------------------------------------
    // Input service
    // -----------------------------------------------------------------------

    struct InputPins {
        rotary_a: PinDriver<'static, AnyInputPin, Input>,
        rotary_b: PinDriver<'static, AnyInputPin, Input>,
        up: PinDriver<'static, AnyInputPin, Input>,
        down: PinDriver<'static, AnyInputPin, Input>,
        left: PinDriver<'static, AnyInputPin, Input>,
        right: PinDriver<'static, AnyInputPin, Input>,
        center: PinDriver<'static, AnyInputPin, Input>,
        mode: PinDriver<'static, AnyInputPin, Input>,
        light: PinDriver<'static, AnyInputPin, Input>,
    }

    /// Latch `bit` and wake the input service on the configured edge.
    fn arm(
        pin: &mut PinDriver<'static, AnyInputPin, Input>,
        edge: InterruptType,
        pull: Option<Pull>,
        bit: u32,
        notification: &Notification,
    ) -> anyhow::Result<()> {
        if let Some(p) = pull {
            pin.set_pull(p)?;
        }
        pin.set_interrupt_type(edge)?;
        let notifier = notification.notifier();
        // SAFETY: the callback runs in ISR context and only touches an
        // atomic and the ISR-safe notifier.
        unsafe {
            pin.subscribe(move || {
                PENDING_EDGES.fetch_or(bit, Ordering::Relaxed);
                notifier.notify_and_yield(NonZeroU32::MIN);
            })?;
        }
        pin.enable_interrupt()?;
        Ok(())
    }

    /// Dedicated thread standing in for the edge-interrupt context: waits
    /// on the task notification, timestamps the latched edges and feeds
    /// them to the interrupt front, then re-arms the fired lines.
    fn input_service(
        mut pins: InputPins,
        bus: SharedBus,
        handles: IsrHandles,
    ) -> anyhow::Result<()> {
        let notification = Notification::new();

        // GPIO34..39 are input-only and rely on external pull-ups.
        arm(&mut pins.rotary_a, InterruptType::PosEdge, Some(Pull::Up), EDGE_ROTARY_A, &notification)?;
        arm(&mut pins.rotary_b, InterruptType::PosEdge, Some(Pull::Up), EDGE_ROTARY_B, &notification)?;
        arm(&mut pins.up, InterruptType::NegEdge, None, EDGE_NAV_UP, &notification)?;
        arm(&mut pins.down, InterruptType::NegEdge, None, EDGE_NAV_DOWN, &notification)?;
        arm(&mut pins.left, InterruptType::NegEdge, None, EDGE_NAV_LEFT, &notification)?;
        arm(&mut pins.right, InterruptType::NegEdge, None, EDGE_NAV_RIGHT, &notification)?;
        arm(&mut pins.center, InterruptType::NegEdge, Some(Pull::Up), EDGE_NAV_CENTER, &notification)?;
        arm(&mut pins.light, InterruptType::NegEdge, Some(Pull::Up), EDGE_LIGHT, &notification)?;

        // The mode switch flips the Passive/Monitor bit directly in its
        // ISR; the service thread only re-arms the line.
        {
            pins.mode.set_pull(Pull::Up)?;
            pins.mode.set_interrupt_type(InterruptType::NegEdge)?;
            let notifier = notification.notifier();
            let h = handles.clone();
            // SAFETY: as in `arm`; the mode toggle is a single atomic xor.
            unsafe {
                pins.mode.subscribe(move || {
                    h.on_mode_edge();
                    PENDING_EDGES.fetch_or(EDGE_MODE, Ordering::Relaxed);
                    notifier.notify_and_yield(NonZeroU32::MIN);
                })?;
            }
            pins.mode.enable_interrupt()?;
        }

        let mut light_ctl = LightAlarmPort {
            light: Isl29003::new(bus),
        };

        log::info!("input service started");
        loop {
            let _ = notification.wait(BLOCK);
            let pending = PENDING_EDGES.swap(0, Ordering::AcqRel);
            let now = now_ms();

            if pending & EDGE_ROTARY_A != 0 {
                handles.on_rotary_edge(RotaryChannel::A, now);
                pins.rotary_a.enable_interrupt()?;
            }
            if pending & EDGE_ROTARY_B != 0 {
                handles.on_rotary_edge(RotaryChannel::B, now);
                pins.rotary_b.enable_interrupt()?;
            }
            if pending & EDGE_NAV_UP != 0 {
                handles.on_button_edge(Button::Up, now);
                pins.up.enable_interrupt()?;
            }
            if pending & EDGE_NAV_DOWN != 0 {
                handles.on_button_edge(Button::Down, now);
                pins.down.enable_interrupt()?;
            }
            if pending & EDGE_NAV_LEFT != 0 {
                handles.on_button_edge(Button::Left, now);
                pins.left.enable_interrupt()?;
            }
            if pending & EDGE_NAV_RIGHT != 0 {
                handles.on_button_edge(Button::Right, now);
                pins.right.enable_interrupt()?;
            }
            if pending & EDGE_NAV_CENTER != 0 {
                handles.on_button_edge(Button::Center, now);
                pins.center.enable_interrupt()?;
            }
            if pending & EDGE_LIGHT != 0 {
                handles.on_light_alarm(&mut light_ctl);
                pins.light.enable_interrupt()?;
            }
            if pending & EDGE_MODE != 0 {
                pins.mode.enable_interrupt()?;
            }
        }
    }

    /// Light-alarm handle for the input service (separate driver instance
    /// over the same shared bus as the loop's).
    struct LightAlarmPort {
        light: Isl29003,
    }

    impl LightAlarm for LightAlarmPort {
        fn set_light_thresholds(&mut self, lo: u32, hi: u32) {
            if let Err(e) = self.light.set_thresholds(lo, hi) {
                log::warn!("light threshold write failed: {e}");
            }
        }

        fn clear_light_alarm(&mut self) {
            if let Err(e) = self.light.clear_alarm() {
                log::warn!("light alarm ack failed: {e}");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Board implementation
    // -----------------------------------------------------------------------

    /// The real appliance. Sensor faults are logged and the last good
    /// reading returned, so the loop never sees an error channel.
    struct EspBoard {
        oled: OledDisplay,
        light: Isl29003,
        accel: Mma7455,
        temp: Lm75,
        array: Pca9532,
        sevenseg: Led7Seg<'static>,
        uart: UartDriver<'static>,
        siren: PinDriver<'static, AnyOutputPin, Output>,
        led_red: PinDriver<'static, AnyOutputPin, Output>,
        led_blue: PinDriver<'static, AnyOutputPin, Output>,
        led_aux: PinDriver<'static, AnyOutputPin, Output>,
        last_light: u32,
        last_temp: i32,
        last_acc: (i16, i16, i16),
    }

    impl LightAlarm for EspBoard {
        fn set_light_thresholds(&mut self, lo: u32, hi: u32) {
            if let Err(e) = self.light.set_thresholds(lo, hi) {
                log::warn!("light threshold write failed: {e}");
            }
        }

        fn clear_light_alarm(&mut self) {
            if let Err(e) = self.light.clear_alarm() {
                log::warn!("light alarm ack failed: {e}");
            }
        }
    }

    impl Board for EspBoard {
        fn now_ticks(&mut self) -> Tick {
            now_ms()
        }

        fn read_light(&mut self) -> u32 {
            match self.light.read_lux() {
                Ok(v) => {
                    self.last_light = v;
                    v
                }
                Err(e) => {
                    log::warn!("light read failed: {e}");
                    self.last_light
                }
            }
        }

        fn read_temperature(&mut self) -> i32 {
            match self.temp.read_tenths() {
                Ok(v) => {
                    self.last_temp = v;
                    v
                }
                Err(e) => {
                    log::warn!("temperature read failed: {e}");
                    self.last_temp
                }
            }
        }

        fn read_acceleration(&mut self) -> (i16, i16, i16) {
            match self.accel.read() {
                Ok(v) => {
                    self.last_acc = v;
                    v
                }
                Err(e) => {
                    log::warn!("acceleration read failed: {e}");
                    self.last_acc
                }
            }
        }

        fn clear_display(&mut self) {
            if let Err(e) = self.oled.clear() {
                log::warn!("display clear failed: {e}");
            }
        }

        fn render_text(&mut self, x: i32, y: i32, s: &str, size: u8) {
            if let Err(e) = self.oled.text(x, y, s, size) {
                log::warn!("display write failed: {e}");
            }
        }

        fn render_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
            if let Err(e) = self.oled.rect(x0, y0, x1, y1) {
                log::warn!("display write failed: {e}");
            }
        }

        fn set_indicator_leds(&mut self, mask: u8) {
            let _ = if mask & ALERT_FIRE != 0 {
                self.led_red.set_high()
            } else {
                self.led_red.set_low()
            };
            let _ = if mask & ALERT_DARK_MOVEMENT != 0 {
                self.led_blue.set_high()
            } else {
                self.led_blue.set_low()
            };
        }

        fn set_led_array(&mut self, pattern: u16, mask: u16) {
            if let Err(e) = self.array.set_leds(pattern, mask) {
                log::warn!("LED array write failed: {e}");
            }
        }

        fn set_discrete_led(&mut self, on: bool) {
            let _ = if on {
                self.led_aux.set_high()
            } else {
                self.led_aux.set_low()
            };
        }

        fn drive_siren(&mut self, on: bool) {
            let _ = if on {
                self.siren.set_high()
            } else {
                self.siren.set_low()
            };
        }

        fn set_digit(&mut self, glyph: char) {
            if let Err(e) = self.sevenseg.set_char(glyph) {
                log::warn!("status digit write failed: {e}");
            }
        }

        fn transmit_line(&mut self, line: &str) {
            if let Err(e) = self.uart.write(line.as_bytes()) {
                log::warn!("telemetry transmit failed: {e}");
            }
        }
    }
}
