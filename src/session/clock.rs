// src/session/clock.rs

/// Result of advancing the clock by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Time is left; carries the remaining units.
    Remaining(u32),
    /// This tick took the clock to zero. Reported exactly once.
    Expired,
    /// The clock had already run out; nothing happened.
    Stopped,
}

/// Countdown for one session, in whole time units.
#[derive(Debug, Clone)]
pub struct SessionClock {
    total: u32,
    remaining: u32,
}

impl SessionClock {
    pub fn new(total: u32) -> Self {
        Self {
            total,
            remaining: total,
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Decrements by one unit.
    pub fn tick(&mut self) -> Tick {
        match self.remaining {
            0 => Tick::Stopped,
            1 => {
                self.remaining = 0;
                Tick::Expired
            }
            n => {
                self.remaining = n - 1;
                Tick::Remaining(self.remaining)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_to_a_single_expiry() {
        let mut clock = SessionClock::new(3);
        assert_eq!(clock.tick(), Tick::Remaining(2));
        assert_eq!(clock.tick(), Tick::Remaining(1));
        assert_eq!(clock.tick(), Tick::Expired);
        assert_eq!(clock.remaining(), 0);
        assert_eq!(clock.tick(), Tick::Stopped);
        assert_eq!(clock.tick(), Tick::Stopped);
        assert_eq!(clock.total(), 3);
    }

    #[test]
    fn zero_duration_never_reports_expiry_on_tick() {
        let mut clock = SessionClock::new(0);
        assert_eq!(clock.remaining(), 0);
        assert_eq!(clock.tick(), Tick::Stopped);
    }
}
