use std::time::{Duration, Instant};

/// Fixed-rate deadline sequence.
///
/// Deadlines are `origin + n * interval`. Each deadline is derived from the
/// previous one rather than from the time the caller woke up, so late wake-ups
/// do not shift the phase of later ticks.
#[derive(Debug, Clone)]
pub struct TickSchedule {
    interval: Duration,
    next: Instant,
}

impl TickSchedule {
    /// Creates a schedule whose first deadline is `origin + interval`.
    ///
    /// Returns `None` when that deadline is not representable as an `Instant`.
    pub fn new(origin: Instant, interval: Duration) -> Option<Self> {
        debug_assert!(!interval.is_zero());
        let next = origin.checked_add(interval)?;
        Some(Self { interval, next })
    }

    /// Next pending deadline.
    pub fn next_deadline(&self) -> Instant {
        self.next
    }

    /// Returns true if the next deadline is at or before `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.next <= now
    }

    /// Moves to the following deadline.
    pub fn advance(&mut self) {
        self.next += self.interval;
    }

    /// Number of deadlines at or before `now` that have not been consumed yet.
    pub fn backlog(&self, now: Instant) -> u64 {
        if now < self.next {
            return 0;
        }

        let late = now.duration_since(self.next).as_nanos();
        let step = self.interval.as_nanos();
        u64::try_from(late / step + 1).unwrap_or(u64::MAX)
    }

    /// Drops the oldest pending deadlines so that at most `max` remain due at `now`.
    ///
    /// Returns the number of deadlines dropped. The phase of the schedule is kept.
    pub fn clamp_backlog(&mut self, now: Instant, max: u64) -> u64 {
        let backlog = self.backlog(now);
        if backlog <= max {
            return 0;
        }

        let skip = backlog - max;
        self.skip(skip);
        skip
    }

    fn skip(&mut self, count: u64) {
        // Stepwise in u32 chunks; `Duration` only multiplies by u32.
        let mut remaining = count;
        while remaining > 0 {
            let chunk = remaining.min(u64::from(u32::MAX)) as u32;
            self.next += self.interval * chunk;
            remaining -= u64::from(chunk);
        }
    }
}
