// HomeWatch — Cooperative Control Loop
//
// One loop owns every piece of appliance state. Interrupt context talks to
// it exclusively through the flag bus and the navigation queue (plus the
// documented mode bit), and each pass drains those in a fixed priority
// order, so no event is ever acted on twice and no field has two writers.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::alerts::{AlertState, DarknessWatch};
use crate::config::*;
use crate::events::{InputQueue, ModeSwitch, NavEvent, SensorSample, Signal, SignalBus};
use crate::hal::{Board, LightAlarm, Tick};
use crate::input::{Button, NavDecoder, RotaryChannel};
use crate::screens::{self, Function, Page};
use crate::telemetry::{self, Reporter};

// ---------------------------------------------------------------------------
// Interrupt Front
// ---------------------------------------------------------------------------

/// Entry points the platform layer wires to hardware vectors. Cheap to
/// clone; every method is callable from interrupt or polled context and
/// only touches atomics, the queue, and the decoder owned by the single
/// interrupt-front context.
#[derive(Clone)]
pub struct IsrHandles {
    bus: Arc<SignalBus>,
    input: Arc<InputQueue>,
    mode: Arc<ModeSwitch>,
    darkness: Arc<DarknessWatch>,
    nav: Arc<Mutex<NavDecoder>>,
}

impl IsrHandles {
    /// Fast periodic source (~0.33 s) expired.
    pub fn on_fast_tick(&self) {
        self.bus.raise(Signal::RgbToggleDue);
    }

    /// Slow periodic source (~1 s) expired.
    pub fn on_slow_tick(&self) {
        self.bus.raise(Signal::DigitAdvance);
    }

    /// Mode-switch edge: flip Passive <-> Monitor directly.
    pub fn on_mode_edge(&self) {
        self.mode.toggle();
    }

    /// Raw rotary-encoder edge at `now`. A full queue sheds the event.
    pub fn on_rotary_edge(&self, channel: RotaryChannel, now: Tick) {
        if let Some(event) = self.nav.lock().unwrap().rotary_edge(channel, now) {
            self.input.push(event);
        }
    }

    /// Debounced directional-button edge at `now`.
    pub fn on_button_edge(&self, button: Button, now: Tick) {
        if let Some(event) = self.nav.lock().unwrap().button_edge(button, now) {
            self.input.push(event);
        }
    }

    /// Ambient-light alarm edge: flip the darkness hysteresis.
    pub fn on_light_alarm(&self, ctl: &mut impl LightAlarm) {
        self.darkness.on_alarm(ctl);
    }

    pub fn is_monitor(&self) -> bool {
        self.mode.is_monitor()
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// The appliance state machine plus the board it drives.
pub struct Controller<B: Board> {
    board: B,
    bus: Arc<SignalBus>,
    input: Arc<InputQueue>,
    mode: Arc<ModeSwitch>,
    darkness: Arc<DarknessWatch>,
    reporter: Reporter,

    monitoring: bool,
    page: Page,
    selection: Function,
    alerts: AlertState,
    sample: SensorSample,
    prev_acc: (i16, i16, i16),
    digit_step: usize,
    blink_on: bool,
    siren_active: bool,
    siren_level: bool,
    last_siren_toggle: Tick,
    lights_on: bool,
    last_aux_refresh: Tick,
}

impl<B: Board> Controller<B> {
    /// Build the controller and the interrupt-front handles that feed it.
    pub fn new(board: B) -> (Self, IsrHandles) {
        let bus = Arc::new(SignalBus::new());
        let input = Arc::new(InputQueue::new());
        let mode = Arc::new(ModeSwitch::new());
        let darkness = Arc::new(DarknessWatch::new());

        let handles = IsrHandles {
            bus: Arc::clone(&bus),
            input: Arc::clone(&input),
            mode: Arc::clone(&mode),
            darkness: Arc::clone(&darkness),
            nav: Arc::new(Mutex::new(NavDecoder::new())),
        };

        let controller = Self {
            board,
            bus,
            input,
            mode,
            darkness,
            reporter: Reporter::new(),
            monitoring: false,
            page: Page::Overview,
            selection: Function::Siren,
            alerts: AlertState::new(),
            sample: SensorSample::default(),
            prev_acc: (0, 0, 0),
            digit_step: 0,
            blink_on: false,
            siren_active: false,
            siren_level: false,
            last_siren_toggle: 0,
            lights_on: false,
            last_aux_refresh: 0,
        };

        (controller, handles)
    }

    /// One-time reset into Passive. Call once before the first `poll`.
    pub fn init(&mut self) {
        self.enter_passive();
    }

    /// Run the cooperative loop. Never returns in normal operation.
    pub fn run_forever(&mut self) -> ! {
        self.init();
        loop {
            self.poll();
            thread::sleep(Duration::from_millis(LOOP_IDLE_MS));
        }
    }

    /// One non-blocking pass: service a pending mode transition, then — in
    /// Monitor only — run one drain pass. In Passive nothing but the mode
    /// bit is watched.
    pub fn poll(&mut self) {
        match (self.monitoring, self.mode.is_monitor()) {
            (false, true) => self.enter_monitor(),
            (true, false) => self.enter_passive(),
            (true, true) => self.step(),
            (false, false) => {}
        }
    }

    // ---- mode transitions -------------------------------------------------

    /// Silence every output and drop all derived state. The telemetry
    /// sequence counter deliberately survives.
    fn enter_passive(&mut self) {
        log::info!("entering passive mode");

        self.board.clear_display();
        self.board.set_digit(' ');
        self.board.set_indicator_leds(0);
        self.board.set_led_array(0x0000, LED_ARRAY_ALL_MASK);
        self.board.set_discrete_led(false);
        self.board.drive_siren(false);

        self.digit_step = 0;
        self.blink_on = false;
        self.siren_active = false;
        self.siren_level = false;
        self.lights_on = false;
        self.page = Page::Overview;
        self.selection = Function::Siren;
        self.alerts.reset();
        self.darkness.rearm(&mut self.board);

        self.bus.clear_all();
        self.input.clear();
        self.monitoring = false;
    }

    /// Capture acceleration offsets, redraw page 0, take one immediate
    /// sample and announce the transition.
    fn enter_monitor(&mut self) {
        log::info!("entering monitor mode");

        // Stale signals raised while Passive must not replay.
        self.bus.clear_all();
        self.input.clear();

        let now = self.board.now_ticks();
        let raw = self.board.read_acceleration();
        self.sample.offset = raw;
        self.sample.acc = raw;
        self.prev_acc = raw;

        screens::draw_chrome(&mut self.board, self.page, self.selection);
        self.show_digit();
        self.sample_all(now);
        screens::draw_values(&mut self.board, self.page, &self.sample);
        self.board.transmit_line(telemetry::MONITOR_ENTERED);

        self.last_aux_refresh = now;
        self.monitoring = true;
    }

    // ---- one drain pass ---------------------------------------------------

    /// Drain the flag bus in fixed priority order: navigation events, digit
    /// advance, full redraw, sampling, alert recompute (incl. indicator
    /// blink), selection arrow, function execute, siren drive, telemetry.
    fn step(&mut self) {
        let now = self.board.now_ticks();

        while let Some(event) = self.input.pop() {
            self.apply_nav(event);
        }

        if self.bus.drain(Signal::DigitAdvance) {
            // The sub-phase is the digit step about to be shown: 3 samples
            // and 1 transmission per 16-step cycle.
            if SAMPLE_PHASES.contains(&self.digit_step) {
                self.bus.raise(Signal::SampleDue);
            }
            if self.digit_step == TELEMETRY_PHASE {
                self.bus.raise(Signal::TelemetrySendDue);
            }
            self.show_digit();
        }

        let redrew = self.bus.drain(Signal::FullRedraw);
        if redrew {
            screens::draw_chrome(&mut self.board, self.page, self.selection);
        }

        if self.bus.drain(Signal::SampleDue) {
            self.sample_all(now);
            if !redrew {
                screens::draw_values(&mut self.board, self.page, &self.sample);
            }
        } else if now.wrapping_sub(self.last_aux_refresh) > AUX_REFRESH_TICKS {
            // Keep the fast-changing values current between sampling ticks
            // without touching the alarm-driven light sensor.
            self.sample.temperature = self.board.read_temperature();
            let raw = self.board.read_acceleration();
            self.observe_motion(raw, now);
            self.last_aux_refresh = now;
        }

        self.alerts.on_temperature(self.sample.temperature);
        self.alerts.poll_motion(now, self.darkness.is_dark());
        if self.bus.drain(Signal::RgbToggleDue) {
            self.blink_indicators();
        }

        if self.bus.drain(Signal::SelectionChanged) && self.page == Page::FunctionSelect {
            screens::draw_selection_arrow(&mut self.board, self.selection);
        }

        if self.bus.drain(Signal::ExecuteRequested) && self.page == Page::FunctionSelect {
            self.execute_function();
        }

        if self.siren_active {
            self.drive_siren_wave(now);
        }

        if self.bus.drain(Signal::TelemetrySendDue) {
            self.send_telemetry();
        }
    }

    // ---- navigation -------------------------------------------------------

    fn apply_nav(&mut self, event: NavEvent) {
        match event {
            NavEvent::PageNext => {
                self.page = self.page.next();
                self.bus.raise(Signal::FullRedraw);
            }
            NavEvent::PagePrev => {
                self.page = self.page.prev();
                self.bus.raise(Signal::FullRedraw);
            }
            NavEvent::SelectNext if self.page == Page::FunctionSelect => {
                self.selection = self.selection.next();
                self.bus.raise(Signal::SelectionChanged);
            }
            NavEvent::SelectPrev if self.page == Page::FunctionSelect => {
                self.selection = self.selection.prev();
                self.bus.raise(Signal::SelectionChanged);
            }
            NavEvent::Activate if self.page == Page::FunctionSelect => {
                self.bus.raise(Signal::ExecuteRequested);
            }
            // Selection/activate input outside the function page is noise.
            NavEvent::SelectNext | NavEvent::SelectPrev | NavEvent::Activate => {}
        }
    }

    // ---- periodic work ----------------------------------------------------

    /// Show the current glyph of the 16-step hex cycle and advance.
    fn show_digit(&mut self) {
        self.board.set_digit(DIGIT_GLYPHS[self.digit_step]);
        self.digit_step = (self.digit_step + 1) % DIGIT_GLYPHS.len();
    }

    fn sample_all(&mut self, now: Tick) {
        self.sample.light = self.board.read_light();
        let raw = self.board.read_acceleration();
        self.observe_motion(raw, now);
        self.sample.temperature = self.board.read_temperature();
    }

    /// Compare against the previous reading and arm the motion window on a
    /// per-axis delta above the threshold.
    fn observe_motion(&mut self, raw: (i16, i16, i16), now: Tick) {
        let moved = (raw.0 - self.prev_acc.0).abs() > MOTION_DELTA
            || (raw.1 - self.prev_acc.1).abs() > MOTION_DELTA
            || (raw.2 - self.prev_acc.2).abs() > MOTION_DELTA;
        if moved {
            self.alerts.on_motion(now);
        }
        self.prev_acc = raw;
        self.sample.acc = raw;
    }

    /// Alternate the indicator LEDs between the alert mask and dark while
    /// any alert is active; force them off otherwise.
    fn blink_indicators(&mut self) {
        if self.alerts.is_active() {
            self.blink_on = !self.blink_on;
            let mask = if self.blink_on { self.alerts.mask() } else { 0 };
            self.board.set_indicator_leds(mask);
        } else if self.blink_on {
            self.blink_on = false;
            self.board.set_indicator_leds(0);
        }
    }

    /// Square-wave the siren output: one level flip per elapsed tick.
    fn drive_siren_wave(&mut self, now: Tick) {
        if now != self.last_siren_toggle {
            self.siren_level = !self.siren_level;
            self.board.drive_siren(self.siren_level);
            self.last_siren_toggle = now;
        }
    }

    // ---- actions ----------------------------------------------------------

    fn execute_function(&mut self) {
        match self.selection {
            Function::Siren => {
                self.siren_active = !self.siren_active;
                if !self.siren_active {
                    // Silence immediately, not on the next drive tick.
                    self.siren_level = false;
                    self.board.drive_siren(false);
                }
                log::info!("siren {}", if self.siren_active { "armed" } else { "silenced" });
            }
            Function::Assistance => {
                let line = telemetry::assistance_line();
                self.board.transmit_line(&line);
                log::info!("assistance requested");
            }
            Function::Lights => {
                self.lights_on = !self.lights_on;
                let pattern = if self.lights_on { LED_ARRAY_LIT_PATTERN } else { 0x0000 };
                self.board.set_led_array(pattern, LED_ARRAY_ALL_MASK);
                self.board.set_discrete_led(self.lights_on);
                log::info!("lights {}", if self.lights_on { "on" } else { "off" });
            }
            Function::Reserved => {}
        }
    }

    fn send_telemetry(&mut self) {
        if self.alerts.fire() {
            self.board.transmit_line(telemetry::FIRE_ALERT);
        }
        if self.alerts.dark_movement() {
            self.board.transmit_line(telemetry::DARKNESS_ALERT);
        }
        let line = self.reporter.status_line(&self.sample);
        self.board.transmit_line(&line);
    }

    // ---- observers (host tests & simulation) ------------------------------

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn selection(&self) -> Function {
        self.selection
    }

    pub fn alert_mask(&self) -> u8 {
        self.alerts.mask()
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring
    }

    pub fn sample(&self) -> &SensorSample {
        &self.sample
    }
}
