// HomeWatch — Telemetry & Alert Lines
//
// Fixed-format serial lines. The status line carries a 3-digit sequence
// number from a u8 counter that wraps on its own and survives mode
// transitions.

use crate::config::USER_ID;
use crate::events::SensorSample;

pub const FIRE_ALERT: &str = "Fire was Detected.\r\n";
pub const DARKNESS_ALERT: &str = "Movement in darkness was Detected.\r\n";
pub const MONITOR_ENTERED: &str = "Entering MONITOR Mode.\r\n";

/// One assistance-request line tagged with the configured identifier.
pub fn assistance_line() -> String {
    format!("User {} has requested for assistance.\r\n", USER_ID)
}

/// Status-line formatter with the persistent sequence counter.
#[derive(Default)]
pub struct Reporter {
    seq: u8,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the periodic status line and advance the sequence number.
    /// Temperature is reported in degrees with two decimals, acceleration
    /// relative to the Monitor-entry offsets.
    pub fn status_line(&mut self, sample: &SensorSample) -> String {
        let n = self.seq;
        self.seq = self.seq.wrapping_add(1);
        let (ax, ay, az) = sample.rel_acc();
        format!(
            "{:03}_-_T-{:.2}_L-{}_AX.{}_AY.{}_AZ.{}\r\n",
            n,
            sample.temperature as f32 / 10.0,
            sample.light,
            ax,
            ay,
            az
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SensorSample {
        SensorSample {
            light: 120,
            temperature: 365,
            acc: (14, -2, 70),
            offset: (10, 3, 64),
        }
    }

    #[test]
    fn status_line_format() {
        let mut r = Reporter::new();
        assert_eq!(
            r.status_line(&sample()),
            "000_-_T-36.50_L-120_AX.4_AY.-5_AZ.6\r\n"
        );
    }

    #[test]
    fn sequence_increments_and_wraps() {
        let mut r = Reporter::new();
        for _ in 0..255 {
            r.status_line(&sample());
        }
        let line = r.status_line(&sample());
        assert!(line.starts_with("255_"));
        let line = r.status_line(&sample());
        assert!(line.starts_with("000_"), "u8 counter wraps: {line}");
    }

    #[test]
    fn assistance_line_carries_user_id() {
        assert_eq!(
            assistance_line(),
            format!("User {} has requested for assistance.\r\n", USER_ID)
        );
    }

    #[test]
    fn alert_lines_are_fixed() {
        assert_eq!(FIRE_ALERT, "Fire was Detected.\r\n");
        assert_eq!(DARKNESS_ALERT, "Movement in darkness was Detected.\r\n");
    }
}
