//! Check-interval convention shared by triggers and calculated values.
//!
//! A constructor argument below 2 means "every tick", below 100 is taken as
//! seconds, anything else is already milliseconds. Callers routinely pass
//! small integers meaning seconds, so the conversion must stay exactly this.

/// Normalized check interval in milliseconds. `0` means every call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CheckInterval(u64);

impl CheckInterval {
    pub const EVERY_TICK: Self = Self(0);

    pub const fn from_source(value: u32) -> Self {
        match value {
            0 | 1 => Self::EVERY_TICK,
            2..=99 => Self(value as u64 * 1_000),
            _ => Self(value as u64),
        }
    }

    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    pub const fn is_every_tick(self) -> bool {
        self.0 < 2
    }
}

/// Remembers when a gated computation last ran.
#[derive(Clone, Copy, Debug, Default)]
pub struct RateGate {
    interval: CheckInterval,
    last_check: Option<u64>,
}

impl RateGate {
    pub const fn new(interval: CheckInterval) -> Self {
        Self {
            interval,
            last_check: None,
        }
    }

    pub const fn interval(&self) -> CheckInterval {
        self.interval
    }

    /// Returns `true` and records `now_ms` if the interval has elapsed.
    pub fn try_pass(&mut self, now_ms: u64) -> bool {
        if self.interval.is_every_tick() {
            self.last_check = Some(now_ms);
            return true;
        }

        match self.last_check {
            Some(last) if now_ms.saturating_sub(last) < self.interval.as_millis() => false,
            _ => {
                self.last_check = Some(now_ms);
                true
            }
        }
    }

    pub fn has_run(&self) -> bool {
        self.last_check.is_some()
    }

    pub fn last_check(&self) -> Option<u64> {
        self.last_check
    }

    pub fn reset(&mut self) {
        self.last_check = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_values_are_normalized() {
        assert_eq!(CheckInterval::from_source(0), CheckInterval::EVERY_TICK);
        assert_eq!(CheckInterval::from_source(1), CheckInterval::EVERY_TICK);
        assert_eq!(CheckInterval::from_source(2).as_millis(), 2_000);
        assert_eq!(CheckInterval::from_source(99).as_millis(), 99_000);
        assert_eq!(CheckInterval::from_source(100).as_millis(), 100);
        assert_eq!(CheckInterval::from_source(1_500).as_millis(), 1_500);
    }

    #[test]
    fn gate_opens_once_per_window() {
        let mut gate = RateGate::new(CheckInterval::from_source(5));
        assert!(gate.try_pass(10_000));
        assert!(!gate.try_pass(10_001));
        assert!(!gate.try_pass(14_999));
        assert!(gate.try_pass(15_000));
        assert!(!gate.try_pass(15_000));
    }

    #[test]
    fn every_tick_gate_always_passes() {
        let mut gate = RateGate::new(CheckInterval::EVERY_TICK);
        assert!(gate.try_pass(1));
        assert!(gate.try_pass(1));
    }

    #[test]
    fn reset_reopens_gate() {
        let mut gate = RateGate::new(CheckInterval::from_millis(500));
        assert!(gate.try_pass(0));
        assert!(!gate.try_pass(100));
        gate.reset();
        assert!(gate.try_pass(100));
    }
}
