use log::debug;
use std::time::{Duration, Instant};

/// Logical game clock. Advanced only by the tick driver.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GameClock {
    now: f64,
}

impl GameClock {
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn advance(&mut self, dt: f32) -> f64 {
        self.now += dt.max(0.0) as f64;
        self.now
    }
}

/// Accumulates elapsed time and fires once the accumulator exceeds the interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalGate {
    interval: f32,
    accumulated: f32,
    armed: bool,
}

impl IntervalGate {
    pub fn new(interval: f32) -> Self {
        IntervalGate {
            interval: interval.max(0.0),
            accumulated: 0.0,
            armed: false,
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn advance(&mut self, dt: f32) -> bool {
        self.accumulated += dt.max(0.0);
        if self.armed || self.accumulated > self.interval {
            self.accumulated = 0.0;
            self.armed = false;
            true
        } else {
            false
        }
    }

    /// Makes the next `advance` fire regardless of elapsed time.
    pub fn arm(&mut self) {
        self.armed = true;
    }
}

#[derive(Debug)]
pub struct TickStats {
    started: Option<Instant>,
    busy: Duration,
    simulated: f32,
    ticks: u64,
}

impl Default for TickStats {
    fn default() -> Self {
        TickStats {
            started: None,
            busy: Duration::ZERO,
            simulated: 0.0,
            ticks: 0,
        }
    }
}

impl TickStats {
    pub fn tick_start(&mut self) {
        self.started = Some(Instant::now());
    }

    pub fn tick_end(&mut self, dt: f32) {
        if let Some(started) = self.started.take() {
            self.busy += started.elapsed();
        }

        self.simulated += dt;
        self.ticks += 1;

        if self.simulated >= 1.0 {
            debug!(
                "[ticks] {} in {:.2}s simulated, {:?} spent",
                self.ticks, self.simulated, self.busy
            );
            self.simulated = 0.0;
            self.busy = Duration::ZERO;
            self.ticks = 0;
        }
    }
}
