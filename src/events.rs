// HomeWatch — Flag Bus, Navigation Queue & Shared Signals
//
// The only communication between interrupt context and the cooperative loop
// happens here: a one-word atomic flag bus for coalescing unit signals, a
// bounded lock-free SPSC ring for confirmed navigation events, and the one
// directly-shared mode bit.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, AtomicUsize, Ordering};

// ---------------------------------------------------------------------------
// Sensor Sample
// ---------------------------------------------------------------------------

/// Last-read sensor values plus the acceleration offsets captured on
/// Monitor entry. Acceleration is always reported relative to the offsets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorSample {
    pub light: u32,
    /// Tenths of a degree Celsius.
    pub temperature: i32,
    pub acc: (i16, i16, i16),
    pub offset: (i16, i16, i16),
}

impl SensorSample {
    pub fn rel_acc(&self) -> (i16, i16, i16) {
        (
            self.acc.0 - self.offset.0,
            self.acc.1 - self.offset.1,
            self.acc.2 - self.offset.2,
        )
    }
}

// ---------------------------------------------------------------------------
// Flag Bus
// ---------------------------------------------------------------------------

/// Unit signals handed from interrupt context (or the loop itself) to the
/// loop. Raising a pending signal is a no-op: bursts coalesce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Signal {
    /// Slow periodic source expired: advance the 7-segment status digit.
    DigitAdvance = 0,
    /// Current page needs its static chrome redrawn from scratch.
    FullRedraw = 1,
    /// Sample all sensors and refresh the dynamic display fields.
    SampleDue = 2,
    /// Emit the periodic status (and any alert) lines.
    TelemetrySendDue = 3,
    /// Fast periodic source expired: service the indicator-LED blink.
    RgbToggleDue = 4,
    /// Function selection moved: repaint the selection arrow.
    SelectionChanged = 5,
    /// Confirmed activation on the function-select page.
    ExecuteRequested = 6,
}

impl Signal {
    const fn mask(self) -> u32 {
        1 << (self as u32)
    }
}

/// All signals in one atomic word. `raise` may be called from any context;
/// `drain` only from the loop, and atomically read-and-clears so every
/// raised event is consumed at most once.
#[derive(Default)]
pub struct SignalBus {
    bits: AtomicU32,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self, signal: Signal) {
        self.bits.fetch_or(signal.mask(), Ordering::AcqRel);
    }

    /// Clear `signal` and report whether it had been pending.
    pub fn drain(&self, signal: Signal) -> bool {
        self.bits.fetch_and(!signal.mask(), Ordering::AcqRel) & signal.mask() != 0
    }

    /// Discard everything pending. Used on mode transitions so stale
    /// coalesced signals do not replay into the new mode.
    pub fn clear_all(&self) {
        self.bits.store(0, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Navigation Event Queue
// ---------------------------------------------------------------------------

/// Confirmed, debounced navigation events produced by the interrupt front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NavEvent {
    PageNext = 0,
    PagePrev = 1,
    SelectNext = 2,
    SelectPrev = 3,
    Activate = 4,
}

fn nav_event_from_u8(raw: u8) -> Option<NavEvent> {
    match raw {
        0 => Some(NavEvent::PageNext),
        1 => Some(NavEvent::PagePrev),
        2 => Some(NavEvent::SelectNext),
        3 => Some(NavEvent::SelectPrev),
        4 => Some(NavEvent::Activate),
        _ => None,
    }
}

const NAV_QUEUE_CAP: usize = 16;

/// Bounded lock-free ring buffer, single producer (interrupt front) and
/// single consumer (the loop). A full queue drops the event rather than
/// blocking — navigation input is safe to shed under bursts.
pub struct InputQueue {
    head: AtomicUsize,
    tail: AtomicUsize,
    slots: [AtomicU8; NAV_QUEUE_CAP],
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            slots: std::array::from_fn(|_| AtomicU8::new(0)),
        }
    }

    /// Producer side. Returns `false` if the queue was full.
    pub fn push(&self, event: NavEvent) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        let next = (head + 1) % NAV_QUEUE_CAP;
        if next == tail {
            return false; // Full — drop.
        }
        self.slots[head].store(event as u8, Ordering::Release);
        self.head.store(next, Ordering::Release);
        true
    }

    /// Consumer side. Returns `None` when empty.
    pub fn pop(&self) -> Option<NavEvent> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if tail == head {
            return None;
        }
        let raw = self.slots[tail].load(Ordering::Acquire);
        self.tail.store((tail + 1) % NAV_QUEUE_CAP, Ordering::Release);
        nav_event_from_u8(raw)
    }

    /// Consumer side: discard everything pending.
    pub fn clear(&self) {
        while self.pop().is_some() {}
    }

    pub fn is_empty(&self) -> bool {
        self.tail.load(Ordering::Relaxed) == self.head.load(Ordering::Acquire)
    }
}

// ---------------------------------------------------------------------------
// Mode Switch
// ---------------------------------------------------------------------------

/// The Passive/Monitor bit. This is the one field written from interrupt
/// context (the mode-switch edge handler) and read continuously by the
/// loop as a guard condition, so it lives in an atomic rather than the
/// queue.
#[derive(Default)]
pub struct ModeSwitch {
    monitor: AtomicBool,
}

impl ModeSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip Passive <-> Monitor. Called from the mode-switch edge handler.
    pub fn toggle(&self) {
        self.monitor.fetch_xor(true, Ordering::AcqRel);
    }

    pub fn is_monitor(&self) -> bool {
        self.monitor.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_then_drain_consumes_once() {
        let bus = SignalBus::new();
        bus.raise(Signal::SampleDue);
        assert!(bus.drain(Signal::SampleDue));
        assert!(!bus.drain(Signal::SampleDue));
    }

    #[test]
    fn repeated_raises_coalesce() {
        let bus = SignalBus::new();
        bus.raise(Signal::TelemetrySendDue);
        bus.raise(Signal::TelemetrySendDue);
        bus.raise(Signal::TelemetrySendDue);
        assert!(bus.drain(Signal::TelemetrySendDue));
        assert!(!bus.drain(Signal::TelemetrySendDue));
    }

    #[test]
    fn signals_are_independent() {
        let bus = SignalBus::new();
        bus.raise(Signal::DigitAdvance);
        bus.raise(Signal::FullRedraw);
        assert!(bus.drain(Signal::FullRedraw));
        assert!(bus.drain(Signal::DigitAdvance));
        assert!(!bus.drain(Signal::RgbToggleDue));
    }

    #[test]
    fn clear_all_discards_pending() {
        let bus = SignalBus::new();
        bus.raise(Signal::ExecuteRequested);
        bus.raise(Signal::SampleDue);
        bus.clear_all();
        assert!(!bus.drain(Signal::ExecuteRequested));
        assert!(!bus.drain(Signal::SampleDue));
    }

    #[test]
    fn queue_is_fifo() {
        let q = InputQueue::new();
        assert!(q.push(NavEvent::PageNext));
        assert!(q.push(NavEvent::SelectNext));
        assert!(q.push(NavEvent::Activate));
        assert_eq!(q.pop(), Some(NavEvent::PageNext));
        assert_eq!(q.pop(), Some(NavEvent::SelectNext));
        assert_eq!(q.pop(), Some(NavEvent::Activate));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn queue_drops_when_full() {
        let q = InputQueue::new();
        for _ in 0..NAV_QUEUE_CAP - 1 {
            assert!(q.push(NavEvent::PageNext));
        }
        assert!(!q.push(NavEvent::PagePrev));
        // The dropped event never surfaces.
        let mut drained = 0;
        while let Some(ev) = q.pop() {
            assert_eq!(ev, NavEvent::PageNext);
            drained += 1;
        }
        assert_eq!(drained, NAV_QUEUE_CAP - 1);
    }

    #[test]
    fn queue_clear_empties() {
        let q = InputQueue::new();
        q.push(NavEvent::PagePrev);
        q.push(NavEvent::Activate);
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn mode_toggles_both_ways() {
        let mode = ModeSwitch::new();
        assert!(!mode.is_monitor());
        mode.toggle();
        assert!(mode.is_monitor());
        mode.toggle();
        assert!(!mode.is_monitor());
    }

    #[test]
    fn rel_acc_subtracts_entry_offsets() {
        let s = SensorSample {
            acc: (12, -3, 70),
            offset: (10, 2, 64),
            ..Default::default()
        };
        assert_eq!(s.rel_acc(), (2, -5, 6));
    }
}
