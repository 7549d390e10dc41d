// End-to-end scenarios for the cooperative control loop, driven through
// the same interrupt-front entry points the hardware uses, against a
// recording mock board.

use homewatch::alerts::{ALERT_DARK_MOVEMENT, ALERT_FIRE};
use homewatch::config::*;
use homewatch::controller::{Controller, IsrHandles};
use homewatch::hal::{Board, LightAlarm, Tick};
use homewatch::input::{Button, RotaryChannel};
use homewatch::screens::{Function, Page};
use homewatch::telemetry;

// ---------------------------------------------------------------------------
// Mock board
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockBoard {
    now: Tick,
    light: u32,
    temp: i32,
    acc: (i16, i16, i16),

    texts: Vec<(i32, i32, String, u8)>,
    rects: usize,
    clears: usize,
    digits: Vec<char>,
    lines: Vec<String>,
    led_masks: Vec<u8>,
    array_writes: Vec<(u16, u16)>,
    discrete_writes: Vec<bool>,
    siren_writes: Vec<bool>,
    thresholds: Vec<(u32, u32)>,
    light_reads: usize,
}

impl LightAlarm for MockBoard {
    fn set_light_thresholds(&mut self, lo: u32, hi: u32) {
        self.thresholds.push((lo, hi));
    }
    fn clear_light_alarm(&mut self) {}
}

impl Board for MockBoard {
    fn now_ticks(&mut self) -> Tick {
        self.now
    }
    fn read_light(&mut self) -> u32 {
        self.light_reads += 1;
        self.light
    }
    fn read_temperature(&mut self) -> i32 {
        self.temp
    }
    fn read_acceleration(&mut self) -> (i16, i16, i16) {
        self.acc
    }
    fn clear_display(&mut self) {
        self.clears += 1;
    }
    fn render_text(&mut self, x: i32, y: i32, s: &str, size: u8) {
        self.texts.push((x, y, s.to_string(), size));
    }
    fn render_rect(&mut self, _x0: i32, _y0: i32, _x1: i32, _y1: i32) {
        self.rects += 1;
    }
    fn set_indicator_leds(&mut self, mask: u8) {
        self.led_masks.push(mask);
    }
    fn set_led_array(&mut self, pattern: u16, mask: u16) {
        self.array_writes.push((pattern, mask));
    }
    fn set_discrete_led(&mut self, on: bool) {
        self.discrete_writes.push(on);
    }
    fn drive_siren(&mut self, on: bool) {
        self.siren_writes.push(on);
    }
    fn set_digit(&mut self, glyph: char) {
        self.digits.push(glyph);
    }
    fn transmit_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

impl MockBoard {
    fn text_shown(&self, needle: &str) -> bool {
        self.texts.iter().any(|(_, _, s, _)| s.contains(needle))
    }

    fn lines_containing(&self, needle: &str) -> usize {
        self.lines.iter().filter(|l| l.contains(needle)).count()
    }
}

/// Separate light-alarm handle, as the input service owns on hardware.
#[derive(Default)]
struct AlarmCtl {
    thresholds: Vec<(u32, u32)>,
}

impl LightAlarm for AlarmCtl {
    fn set_light_thresholds(&mut self, lo: u32, hi: u32) {
        self.thresholds.push((lo, hi));
    }
    fn clear_light_alarm(&mut self) {}
}

// ---------------------------------------------------------------------------
// Harness helpers
// ---------------------------------------------------------------------------

fn boot() -> (Controller<MockBoard>, IsrHandles) {
    let mut board = MockBoard::default();
    board.light = 200;
    board.temp = 250;
    board.acc = (10, -4, 62);
    board.now = 10_000;
    let (mut ctl, handles) = Controller::new(board);
    ctl.init();
    (ctl, handles)
}

fn into_monitor(ctl: &mut Controller<MockBoard>, handles: &IsrHandles) {
    handles.on_mode_edge();
    ctl.poll();
    assert!(ctl.is_monitoring());
}

/// Fire the slow periodic source `n` times, polling after each.
fn slow_ticks(ctl: &mut Controller<MockBoard>, handles: &IsrHandles, n: usize) {
    for _ in 0..n {
        handles.on_slow_tick();
        ctl.poll();
    }
}

/// One confirmed anti-clockwise rotary transition (B edge, then A).
fn acw_turn(handles: &IsrHandles, now: Tick) {
    handles.on_rotary_edge(RotaryChannel::B, now);
    handles.on_rotary_edge(RotaryChannel::A, now);
}

// ---------------------------------------------------------------------------
// Mode machine
// ---------------------------------------------------------------------------

#[test]
fn monitor_entry_redraws_samples_and_announces() {
    let (mut ctl, handles) = boot();
    let clears_after_init = ctl.board().clears;

    into_monitor(&mut ctl, &handles);

    let board = ctl.board();
    assert!(board.clears > clears_after_init, "full redraw clears first");
    assert!(board.text_shown("MODE: MONITOR"));
    assert_eq!(board.light_reads, 1, "one immediate sample");
    assert_eq!(board.lines, vec![telemetry::MONITOR_ENTERED.to_string()]);
    assert_eq!(board.digits.last(), Some(&'0'));
    // Offsets captured at entry: relative values start at zero.
    assert_eq!(ctl.sample().rel_acc(), (0, 0, 0));
}

#[test]
fn passive_exit_resets_page_selection_and_alerts() {
    let (mut ctl, handles) = boot();
    ctl.board_mut().temp = 460;
    into_monitor(&mut ctl, &handles);
    ctl.poll(); // alert recompute picks up the hot sample
    assert_eq!(ctl.alert_mask(), ALERT_FIRE);

    // Navigate off page 0 and move the selection.
    handles.on_button_edge(Button::Left, 20_000);
    ctl.poll();
    assert_eq!(ctl.page(), Page::FunctionSelect);
    handles.on_button_edge(Button::Up, 20_001);
    ctl.poll();
    assert_eq!(ctl.selection(), Function::Assistance);

    // Mode exit: everything derived resets, outputs silenced.
    handles.on_mode_edge();
    ctl.poll();
    assert!(!ctl.is_monitoring());
    assert_eq!(ctl.page(), Page::Overview);
    assert_eq!(ctl.selection(), Function::Siren);
    assert_eq!(ctl.alert_mask(), 0);
    let board = ctl.board();
    assert_eq!(board.digits.last(), Some(&' '));
    assert_eq!(board.led_masks.last(), Some(&0));
    assert_eq!(board.siren_writes.last(), Some(&false));
    assert_eq!(board.array_writes.last(), Some(&(0x0000, LED_ARRAY_ALL_MASK)));
    // Darkness detection re-armed for the next session.
    assert_eq!(
        board.thresholds.last(),
        Some(&(DARKNESS_ARM_LO, DARKNESS_ARM_HI))
    );
}

#[test]
fn passive_polls_do_no_work() {
    let (mut ctl, handles) = boot();
    let reads_before = ctl.board().light_reads;
    // Periodic sources keep firing while Passive.
    for _ in 0..20 {
        handles.on_slow_tick();
        handles.on_fast_tick();
        ctl.poll();
    }
    let board = ctl.board();
    assert_eq!(board.light_reads, reads_before);
    assert_eq!(board.lines.len(), 0);
    // Stale coalesced signals do not replay into Monitor entry.
    into_monitor(&mut ctl, &handles);
    assert_eq!(ctl.board().digits.iter().filter(|&&d| d == '0').count(), 1);
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[test]
fn eleven_acw_turns_reach_function_select() {
    let (mut ctl, handles) = boot();
    into_monitor(&mut ctl, &handles);

    for _ in 0..=ROTARY_CONFIRM_COUNT {
        acw_turn(&handles, 20_000);
    }
    ctl.poll();

    assert_eq!(ctl.page(), Page::FunctionSelect);
    assert!(ctl.board().text_shown("Select Function:"));
}

#[test]
fn ten_acw_turns_are_not_enough() {
    let (mut ctl, handles) = boot();
    into_monitor(&mut ctl, &handles);

    for _ in 0..ROTARY_CONFIRM_COUNT {
        acw_turn(&handles, 20_000);
    }
    ctl.poll();
    assert_eq!(ctl.page(), Page::Overview);
}

#[test]
fn button_paging_round_trips() {
    let (mut ctl, handles) = boot();
    into_monitor(&mut ctl, &handles);

    let mut now = 20_000;
    for _ in 0..3 {
        handles.on_button_edge(Button::Right, now);
        now += PAGE_CHANGE_COOLDOWN_TICKS + 1;
        ctl.poll();
    }
    assert_eq!(ctl.page(), Page::AccelX);
    for _ in 0..3 {
        handles.on_button_edge(Button::Left, now);
        now += PAGE_CHANGE_COOLDOWN_TICKS + 1;
        ctl.poll();
    }
    assert_eq!(ctl.page(), Page::Overview);
}

#[test]
fn selection_input_ignored_off_function_page() {
    let (mut ctl, handles) = boot();
    into_monitor(&mut ctl, &handles);

    handles.on_button_edge(Button::Up, 20_000);
    handles.on_button_edge(Button::Center, 20_001);
    ctl.poll();

    assert_eq!(ctl.selection(), Function::Siren);
    assert_eq!(ctl.board().lines_containing("assistance"), 0);
    assert_eq!(ctl.board().siren_writes.len(), 1, "only the passive reset");
}

// ---------------------------------------------------------------------------
// Function executor
// ---------------------------------------------------------------------------

#[test]
fn assistance_emits_exactly_one_line_and_nothing_else() {
    let (mut ctl, handles) = boot();
    into_monitor(&mut ctl, &handles);

    handles.on_button_edge(Button::Left, 20_000); // Overview -> FunctionSelect
    ctl.poll();
    handles.on_button_edge(Button::Up, 20_001); // Siren -> Assistance
    ctl.poll();
    assert_eq!(ctl.selection(), Function::Assistance);
    handles.on_button_edge(Button::Center, 20_002);
    ctl.poll();

    let board = ctl.board();
    assert_eq!(board.lines_containing("requested for assistance"), 1);
    assert_eq!(board.lines.last(), Some(&telemetry::assistance_line()));
    assert_eq!(board.siren_writes, vec![false], "siren untouched");
    assert_eq!(board.array_writes.len(), 1, "array untouched past reset");
    assert_eq!(board.discrete_writes, vec![false]);
}

#[test]
fn selection_changes_alone_never_execute() {
    let (mut ctl, handles) = boot();
    into_monitor(&mut ctl, &handles);

    handles.on_button_edge(Button::Left, 20_000);
    ctl.poll();
    for i in 0..8u32 {
        handles.on_button_edge(Button::Up, 20_001 + i);
        ctl.poll();
    }
    let board = ctl.board();
    assert_eq!(board.lines_containing("requested for assistance"), 0);
    assert_eq!(board.siren_writes, vec![false]);
    assert_eq!(board.array_writes.len(), 1);
}

#[test]
fn siren_toggles_and_silences_immediately() {
    let (mut ctl, handles) = boot();
    into_monitor(&mut ctl, &handles);

    handles.on_button_edge(Button::Left, 20_000);
    ctl.poll();
    assert_eq!(ctl.selection(), Function::Siren);
    handles.on_button_edge(Button::Center, 20_001);
    ctl.poll();

    // Armed: the arming pass drove the first high level, and every pass
    // with a fresh tick flips it.
    assert_eq!(ctl.board().siren_writes.last(), Some(&true));
    let writes_before = ctl.board().siren_writes.len();
    for i in 1..=4 {
        ctl.board_mut().now = 20_010 + i;
        ctl.poll();
    }
    let wave: Vec<bool> = ctl.board().siren_writes[writes_before..].to_vec();
    assert_eq!(wave, vec![false, true, false, true]);

    // Toggled off: forced low at once, no further drive activity.
    handles.on_button_edge(Button::Center, 21_000);
    ctl.poll();
    assert_eq!(ctl.board().siren_writes.last(), Some(&false));
    let writes_after = ctl.board().siren_writes.len();
    ctl.board_mut().now = 21_500;
    ctl.poll();
    assert_eq!(ctl.board().siren_writes.len(), writes_after);
}

#[test]
fn lights_toggle_pairs_array_and_discrete_led() {
    let (mut ctl, handles) = boot();
    into_monitor(&mut ctl, &handles);

    handles.on_button_edge(Button::Left, 20_000);
    ctl.poll();
    handles.on_button_edge(Button::Up, 20_001);
    handles.on_button_edge(Button::Up, 20_002);
    ctl.poll();
    assert_eq!(ctl.selection(), Function::Lights);

    handles.on_button_edge(Button::Center, 20_003);
    ctl.poll();
    let board = ctl.board();
    assert_eq!(
        board.array_writes.last(),
        Some(&(LED_ARRAY_LIT_PATTERN, LED_ARRAY_ALL_MASK))
    );
    assert_eq!(board.discrete_writes.last(), Some(&true));

    handles.on_button_edge(Button::Center, 20_004);
    ctl.poll();
    let board = ctl.board();
    assert_eq!(board.array_writes.last(), Some(&(0x0000, LED_ARRAY_ALL_MASK)));
    assert_eq!(board.discrete_writes.last(), Some(&false));
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[test]
fn overtemp_sets_bit_blinks_and_clears_on_cool_sample() {
    let (mut ctl, handles) = boot();
    ctl.board_mut().temp = 460;
    into_monitor(&mut ctl, &handles);
    ctl.poll();
    assert_eq!(ctl.alert_mask(), ALERT_FIRE);

    // Fast ticks alternate the indicators between mask and dark.
    handles.on_fast_tick();
    ctl.poll();
    assert_eq!(ctl.board().led_masks.last(), Some(&ALERT_FIRE));
    handles.on_fast_tick();
    ctl.poll();
    assert_eq!(ctl.board().led_masks.last(), Some(&0));

    // A cool sample clears the level on the next sampling tick.
    ctl.board_mut().temp = 440;
    slow_ticks(&mut ctl, &handles, 5); // digit steps 1..5, sampling at 5
    assert_eq!(ctl.alert_mask(), 0);
}

#[test]
fn motion_in_darkness_asserts_holds_and_clears_with_light() {
    let (mut ctl, handles) = boot();
    into_monitor(&mut ctl, &handles);
    let mut alarm = AlarmCtl::default();

    // Nightfall.
    handles.on_light_alarm(&mut alarm);
    assert_eq!(alarm.thresholds.last(), Some(&(LIGHT_ARM_LO, LIGHT_ARM_HI)));

    // Motion picked up by the between-samples refresh.
    ctl.board_mut().acc = (30, -4, 62);
    ctl.board_mut().now = 10_000 + AUX_REFRESH_TICKS + 1;
    ctl.poll();

    // Window expires while darkness persists: alert asserted and held.
    ctl.board_mut().now = 10_000 + AUX_REFRESH_TICKS + MOTION_HOLD_TICKS + 2;
    ctl.poll();
    assert_eq!(ctl.alert_mask(), ALERT_DARK_MOVEMENT);
    ctl.board_mut().now += 1_000;
    ctl.poll();
    assert_eq!(ctl.alert_mask(), ALERT_DARK_MOVEMENT, "held without fresh motion");

    // Daybreak: the expired window may now clear the alert.
    handles.on_light_alarm(&mut alarm);
    assert_eq!(
        alarm.thresholds.last(),
        Some(&(DARKNESS_ARM_LO, DARKNESS_ARM_HI))
    );
    ctl.poll();
    assert_eq!(ctl.alert_mask(), 0);
}

#[test]
fn motion_in_daylight_never_alerts() {
    let (mut ctl, handles) = boot();
    into_monitor(&mut ctl, &handles);

    ctl.board_mut().acc = (30, -4, 62);
    ctl.board_mut().now = 10_000 + AUX_REFRESH_TICKS + 1;
    ctl.poll();
    ctl.board_mut().now += MOTION_HOLD_TICKS + 100;
    ctl.poll();
    assert_eq!(ctl.alert_mask(), 0);
}

// ---------------------------------------------------------------------------
// Telemetry
// ---------------------------------------------------------------------------

#[test]
fn telemetry_fires_at_digit_phase_15_with_status_format() {
    let (mut ctl, handles) = boot();
    into_monitor(&mut ctl, &handles);

    slow_ticks(&mut ctl, &handles, 14);
    assert_eq!(ctl.board().lines_containing("_-_"), 0);
    slow_ticks(&mut ctl, &handles, 1); // digit step 15
    let board = ctl.board();
    assert_eq!(board.lines_containing("_-_"), 1);
    assert_eq!(
        board.lines.last(),
        Some(&"000_-_T-25.00_L-200_AX.0_AY.0_AZ.0\r\n".to_string())
    );
}

#[test]
fn alert_lines_precede_the_status_line() {
    let (mut ctl, handles) = boot();
    ctl.board_mut().temp = 470;
    into_monitor(&mut ctl, &handles);

    slow_ticks(&mut ctl, &handles, 15);
    let board = ctl.board();
    let n = board.lines.len();
    assert_eq!(board.lines[n - 2], telemetry::FIRE_ALERT);
    assert!(board.lines[n - 1].starts_with("000_-_T-47.00_"));
}

#[test]
fn sequence_number_survives_mode_transitions() {
    let (mut ctl, handles) = boot();
    into_monitor(&mut ctl, &handles);
    slow_ticks(&mut ctl, &handles, 15);
    assert_eq!(ctl.board().lines_containing("000_-_"), 1);

    handles.on_mode_edge();
    ctl.poll(); // back to Passive
    handles.on_mode_edge();
    ctl.poll(); // and into Monitor again

    slow_ticks(&mut ctl, &handles, 15);
    assert_eq!(ctl.board().lines_containing("001_-_"), 1);
}

// ---------------------------------------------------------------------------
// Status digit
// ---------------------------------------------------------------------------

#[test]
fn digit_walks_the_hex_cycle() {
    let (mut ctl, handles) = boot();
    into_monitor(&mut ctl, &handles);

    slow_ticks(&mut ctl, &handles, 16);
    let shown: String = ctl
        .board()
        .digits
        .iter()
        .skip_while(|&&d| d == ' ')
        .collect();
    assert_eq!(shown, "0123456789ABCDEF0");
}
