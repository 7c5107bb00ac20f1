use chrono::{Local, NaiveDateTime, Timelike};

/// Time source for closure timestamps.
///
/// Reconciliation never reads the wall clock directly; the clock is
/// injected so tests can pin "now" and runs stay deterministic.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock, truncated to whole seconds to match the store's
/// timestamp resolution.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

/// Fixed clock for tests and replays.
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_returns_its_instant() {
        let instant =
            NaiveDateTime::parse_from_str("2023-02-07 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let clock = FixedClock(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), instant);
    }

    #[test]
    fn test_system_clock_has_second_resolution() {
        let clock = SystemClock;
        assert_eq!(clock.now().nanosecond(), 0);
    }
}
