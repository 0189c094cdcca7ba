/// Software tick gate.
///
/// The host render loop calls in every frame; the gate opens at most once
/// per call, and only when the configured interval has elapsed against the
/// wall clock. After a tick the gate re-anchors to `now`, so when the host
/// stalls the simulation falls behind real time instead of running a burst
/// of catch-up ticks.

use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct TickClock {
    interval: Duration,
    last: Option<Instant>,
}

impl TickClock {
    pub fn new(interval: Duration) -> Self {
        TickClock { interval, last: None }
    }

    /// Anchor the gate at run start: the first tick comes one full
    /// interval later.
    pub fn arm(&mut self, now: Instant) {
        self.last = Some(now);
    }

    pub fn disarm(&mut self) {
        self.last = None;
    }

    /// Open the gate if an interval has elapsed. Never opens twice without
    /// an intervening interval, and never before `arm`.
    pub fn should_tick(&mut self, now: Instant) -> bool {
        let last = match self.last {
            Some(t) => t,
            None => return false,
        };
        if now.saturating_duration_since(last) >= self.interval {
            self.last = Some(now);
            true
        } else {
            false
        }
    }
}
