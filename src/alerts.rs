// HomeWatch — Alert Escalation
//
// Two independent alert bits drive the indicator blink and the outbound
// alert lines: over-temperature (a level recomputed from every sample) and
// motion-in-darkness (motion window crossed while the darkness flag holds).
// Darkness itself is tracked by a hysteretic light-sensor alarm that flips
// its armed window after every crossing.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::*;
use crate::hal::{LightAlarm, Tick};

/// Over-temperature bit — mapped onto the red indicator channel.
pub const ALERT_FIRE: u8 = 0x01;
/// Motion-in-darkness bit — mapped onto the blue indicator channel.
pub const ALERT_DARK_MOVEMENT: u8 = 0x02;

// ---------------------------------------------------------------------------
// Alert State
// ---------------------------------------------------------------------------

/// The two-bit alert mask plus the motion window behind the darkness bit.
/// Owned by the loop; everything here is recomputed or advanced once per
/// cooperative pass.
#[derive(Default)]
pub struct AlertState {
    mask: u8,
    motion_pending: bool,
    last_motion: Tick,
}

impl AlertState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track the over-temperature level from the latest sample. Set iff the
    /// reading is at or above the threshold, re-evaluated every pass.
    pub fn on_temperature(&mut self, tenths: i32) {
        if tenths >= TEMP_ALERT_THRESHOLD {
            self.mask |= ALERT_FIRE;
        } else {
            self.mask &= !ALERT_FIRE;
        }
    }

    /// Record observed motion at `now`. Re-arms the window while darkness
    /// persists, keeping the alert held.
    pub fn on_motion(&mut self, now: Tick) {
        self.motion_pending = true;
        self.last_motion = now;
    }

    /// Advance the motion window. Once [`MOTION_HOLD_TICKS`] pass without
    /// fresh motion: in darkness the alert bit is asserted and held, in
    /// light both the pending flag and the bit clear.
    pub fn poll_motion(&mut self, now: Tick, dark: bool) {
        if self.motion_pending && now.wrapping_sub(self.last_motion) > MOTION_HOLD_TICKS {
            if dark {
                self.mask |= ALERT_DARK_MOVEMENT;
            } else {
                self.motion_pending = false;
                self.mask &= !ALERT_DARK_MOVEMENT;
            }
        }
    }

    pub fn mask(&self) -> u8 {
        self.mask
    }

    pub fn fire(&self) -> bool {
        self.mask & ALERT_FIRE != 0
    }

    pub fn dark_movement(&self) -> bool {
        self.mask & ALERT_DARK_MOVEMENT != 0
    }

    pub fn is_active(&self) -> bool {
        self.mask != 0
    }

    /// Mode exit: drop everything.
    pub fn reset(&mut self) {
        self.mask = 0;
        self.motion_pending = false;
        self.last_motion = 0;
    }
}

// ---------------------------------------------------------------------------
// Darkness Hysteresis
// ---------------------------------------------------------------------------

/// Darkness flag flipped by the ambient-light alarm. After each crossing
/// the sensor is re-armed for the opposite transition, so the boundary
/// cannot storm the interrupt line. Written from interrupt context, read
/// by the loop.
#[derive(Default)]
pub struct DarknessWatch {
    dark: AtomicBool,
}

impl DarknessWatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dark(&self) -> bool {
        self.dark.load(Ordering::Acquire)
    }

    /// Service one light-alarm edge: acknowledge it, flip the darkness
    /// flag, and arm the window that detects the opposite transition.
    pub fn on_alarm(&self, ctl: &mut impl LightAlarm) {
        ctl.clear_light_alarm();
        if self.dark.load(Ordering::Acquire) {
            // Light returned: watch for darkness again.
            ctl.set_light_thresholds(DARKNESS_ARM_LO, DARKNESS_ARM_HI);
            self.dark.store(false, Ordering::Release);
        } else {
            // Darkness fell: watch for light.
            ctl.set_light_thresholds(LIGHT_ARM_LO, LIGHT_ARM_HI);
            self.dark.store(true, Ordering::Release);
        }
    }

    /// Mode reset: assume lit and arm the darkness-detect window so the
    /// flag and the sensor agree.
    pub fn rearm(&self, ctl: &mut impl LightAlarm) {
        ctl.clear_light_alarm();
        ctl.set_light_thresholds(DARKNESS_ARM_LO, DARKNESS_ARM_HI);
        self.dark.store(false, Ordering::Release);
    }
}
