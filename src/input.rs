// HomeWatch — Rotary & Button Debouncer
//
// Pure state machine: feed it raw edges plus the current tick, get back
// zero-or-one confirmed navigation event. It has no dependency on running
// in interrupt context, so the same code serves the edge-interrupt service
// path on hardware and direct calls in tests.

use crate::config::*;
use crate::events::NavEvent;
use crate::hal::Tick;

/// The two quadrature channels of the rotary encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotaryChannel {
    A,
    B,
}

/// Directional buttons. Left/right page, up/down move the function
/// selection, center activates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Center,
}

/// Debounce state for the rotary encoder and the directional buttons.
///
/// Rotary: a direction is confirmed when one channel's edge arrives while
/// the other channel's edge is still pending (A-after-B = anti-clockwise,
/// B-after-A = clockwise). Confirmation resets both edge flags and bumps a
/// per-direction run counter; navigation only fires once the run exceeds
/// [`ROTARY_CONFIRM_COUNT`] AND the direction-specific cooldown since the
/// last page navigation has elapsed. The clockwise cooldown is twice the
/// anti-clockwise one — reference behavior, kept on purpose.
///
/// Buttons: left/right share the page-navigation cooldown (no run-count
/// requirement); up/down/center are ungated.
pub struct NavDecoder {
    edge_a: bool,
    edge_b: bool,
    cw_run: u8,
    acw_run: u8,
    last_page_nav: Tick,
}

impl Default for NavDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl NavDecoder {
    pub fn new() -> Self {
        Self {
            edge_a: false,
            edge_b: false,
            cw_run: 0,
            acw_run: 0,
            last_page_nav: 0,
        }
    }

    /// Feed one raw rotary edge observed at `now`.
    pub fn rotary_edge(&mut self, channel: RotaryChannel, now: Tick) -> Option<NavEvent> {
        match channel {
            RotaryChannel::A => {
                self.edge_a = true;
                if self.edge_b {
                    // B preceded A: anti-clockwise transition confirmed.
                    self.edge_a = false;
                    self.edge_b = false;
                    self.acw_run = self.acw_run.saturating_add(1);
                    if self.acw_run > ROTARY_CONFIRM_COUNT
                        && now.wrapping_sub(self.last_page_nav) > PAGE_CHANGE_COOLDOWN_TICKS
                    {
                        self.acw_run = 0;
                        self.last_page_nav = now;
                        return Some(NavEvent::PagePrev);
                    }
                }
                None
            }
            RotaryChannel::B => {
                self.edge_b = true;
                if self.edge_a {
                    // A preceded B: clockwise transition confirmed.
                    self.edge_a = false;
                    self.edge_b = false;
                    self.cw_run = self.cw_run.saturating_add(1);
                    if self.cw_run > ROTARY_CONFIRM_COUNT
                        && now.wrapping_sub(self.last_page_nav) > PAGE_CHANGE_COOLDOWN_CW_TICKS
                    {
                        self.cw_run = 0;
                        self.last_page_nav = now;
                        return Some(NavEvent::PageNext);
                    }
                }
                None
            }
        }
    }

    /// Feed one debounced button edge observed at `now`.
    pub fn button_edge(&mut self, button: Button, now: Tick) -> Option<NavEvent> {
        match button {
            Button::Right => self.gated_page_nav(NavEvent::PageNext, now),
            Button::Left => self.gated_page_nav(NavEvent::PagePrev, now),
            Button::Up => Some(NavEvent::SelectNext),
            Button::Down => Some(NavEvent::SelectPrev),
            Button::Center => Some(NavEvent::Activate),
        }
    }

    fn gated_page_nav(&mut self, event: NavEvent, now: Tick) -> Option<NavEvent> {
        if now.wrapping_sub(self.last_page_nav) > PAGE_CHANGE_COOLDOWN_TICKS {
            self.last_page_nav = now;
            Some(event)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One confirmed anti-clockwise transition: B then A.
    fn acw_confirm(d: &mut NavDecoder, now: Tick) -> Option<NavEvent> {
        assert_eq!(d.rotary_edge(RotaryChannel::B, now), None);
        d.rotary_edge(RotaryChannel::A, now)
    }

    /// One confirmed clockwise transition: A then B.
    fn cw_confirm(d: &mut NavDecoder, now: Tick) -> Option<NavEvent> {
        assert_eq!(d.rotary_edge(RotaryChannel::A, now), None);
        d.rotary_edge(RotaryChannel::B, now)
    }

    #[test]
    fn rotary_fires_only_above_confirm_count() {
        let mut d = NavDecoder::new();
        let now = 10_000;
        for _ in 0..ROTARY_CONFIRM_COUNT {
            assert_eq!(acw_confirm(&mut d, now), None);
        }
        // The 11th confirmed transition crosses the run threshold.
        assert_eq!(acw_confirm(&mut d, now), Some(NavEvent::PagePrev));
    }

    #[test]
    fn rotary_run_resets_after_firing() {
        let mut d = NavDecoder::new();
        let mut now = 10_000;
        for _ in 0..ROTARY_CONFIRM_COUNT {
            assert_eq!(acw_confirm(&mut d, now), None);
        }
        assert_eq!(acw_confirm(&mut d, now), Some(NavEvent::PagePrev));
        // Counter started over: the next confirm alone cannot fire.
        now += PAGE_CHANGE_COOLDOWN_TICKS + 1;
        assert_eq!(acw_confirm(&mut d, now), None);
    }

    #[test]
    fn rotary_respects_cooldown() {
        let mut d = NavDecoder::new();
        // Within the cooldown of tick 0, even a long run stays quiet.
        for _ in 0..30 {
            assert_eq!(acw_confirm(&mut d, PAGE_CHANGE_COOLDOWN_TICKS), None);
        }
        // One tick past the window it fires immediately (run is long since
        // the counter kept accumulating).
        assert_eq!(
            acw_confirm(&mut d, PAGE_CHANGE_COOLDOWN_TICKS + 1),
            Some(NavEvent::PagePrev)
        );
    }

    #[test]
    fn clockwise_cooldown_is_twice_anticlockwise() {
        let at = PAGE_CHANGE_COOLDOWN_TICKS + 1; // past ACW window, inside CW window

        let mut acw = NavDecoder::new();
        for _ in 0..ROTARY_CONFIRM_COUNT {
            assert_eq!(acw_confirm(&mut acw, at), None);
        }
        assert_eq!(acw_confirm(&mut acw, at), Some(NavEvent::PagePrev));

        let mut cw = NavDecoder::new();
        for _ in 0..ROTARY_CONFIRM_COUNT + 5 {
            assert_eq!(cw_confirm(&mut cw, at), None);
        }
        // Same instant, same run length: clockwise still gated.
        assert_eq!(cw_confirm(&mut cw, PAGE_CHANGE_COOLDOWN_CW_TICKS), None);
        assert_eq!(
            cw_confirm(&mut cw, PAGE_CHANGE_COOLDOWN_CW_TICKS + 1),
            Some(NavEvent::PageNext)
        );
    }

    #[test]
    fn interleaved_directions_keep_separate_runs() {
        let mut d = NavDecoder::new();
        let now = 10_000;
        for _ in 0..6 {
            assert_eq!(acw_confirm(&mut d, now), None);
            assert_eq!(cw_confirm(&mut d, now), None);
        }
        // Neither run reached the threshold despite 12 total confirms.
        assert_eq!(acw_confirm(&mut d, now), None);
    }

    #[test]
    fn repeated_same_channel_edges_do_not_confirm() {
        let mut d = NavDecoder::new();
        for _ in 0..50 {
            assert_eq!(d.rotary_edge(RotaryChannel::A, 10_000), None);
        }
    }

    #[test]
    fn paging_buttons_share_the_cooldown() {
        let mut d = NavDecoder::new();
        assert_eq!(
            d.button_edge(Button::Right, PAGE_CHANGE_COOLDOWN_TICKS + 1),
            Some(NavEvent::PageNext)
        );
        // Second press inside the window is swallowed.
        assert_eq!(
            d.button_edge(Button::Left, PAGE_CHANGE_COOLDOWN_TICKS + 10),
            None
        );
        assert_eq!(
            d.button_edge(Button::Left, 2 * PAGE_CHANGE_COOLDOWN_TICKS + 2),
            Some(NavEvent::PagePrev)
        );
    }

    #[test]
    fn button_nav_also_cools_down_the_rotary() {
        let mut d = NavDecoder::new();
        let t0 = PAGE_CHANGE_COOLDOWN_TICKS + 1;
        assert_eq!(d.button_edge(Button::Right, t0), Some(NavEvent::PageNext));
        // Rotary run completed just after the button press: gated by the
        // shared timestamp.
        for _ in 0..ROTARY_CONFIRM_COUNT + 1 {
            assert_eq!(acw_confirm(&mut d, t0 + 1), None);
        }
    }

    #[test]
    fn selection_and_activate_are_ungated() {
        let mut d = NavDecoder::new();
        assert_eq!(d.button_edge(Button::Up, 1), Some(NavEvent::SelectNext));
        assert_eq!(d.button_edge(Button::Down, 2), Some(NavEvent::SelectPrev));
        assert_eq!(d.button_edge(Button::Center, 3), Some(NavEvent::Activate));
        // Immediately again — no cooldown applies.
        assert_eq!(d.button_edge(Button::Up, 3), Some(NavEvent::SelectNext));
    }
}
