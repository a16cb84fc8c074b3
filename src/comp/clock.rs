use std::time::{Duration, Instant};

/// Fixed-rate clock for the main simulation loop.
///
/// `tick` sleeps out the remainder of the target period with spin_sleep
/// to keep the TPS stable even under OS timer granularity.
pub struct Clock {
    target: Duration,
    last: Instant,
    last_dt: Duration,
}

impl Clock {
    pub fn new(target: Duration) -> Self {
        Self {
            target,
            last: Instant::now(),
            last_dt: target,
        }
    }

    /// Duration of the previous tick.
    pub fn dt(&self) -> Duration { self.last_dt }

    pub fn tick(&mut self) {
        let elapsed = self.last.elapsed();
        if elapsed < self.target {
            spin_sleep::sleep(self.target - elapsed);
        }
        let now = Instant::now();
        self.last_dt = now - self.last;
        self.last = now;
    }
}
