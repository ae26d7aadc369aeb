//! Repeating and one-shot timers driven by simulation time

#[derive(Debug, Clone, PartialEq)]
pub struct Timer {
    interval: f32,
    elapsed: f32,
    repeats: bool,
    finished: bool,
}

impl Timer {
    /// Fires every `interval` seconds, first after one full interval
    pub fn repeating(interval: f32) -> Self {
        Self {
            interval,
            elapsed: 0.0,
            repeats: true,
            finished: false,
        }
    }

    /// Fires once after `delay` seconds
    pub fn once(delay: f32) -> Self {
        Self {
            interval: delay,
            elapsed: 0.0,
            repeats: false,
            finished: false,
        }
    }

    /// Advance and return how many times the timer fired
    pub fn advance(&mut self, dt: f32) -> u32 {
        if self.finished {
            return 0;
        }
        self.elapsed += dt;

        if !self.repeats {
            if self.elapsed >= self.interval {
                self.finished = true;
                return 1;
            }
            return 0;
        }

        let mut fired = 0;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            fired += 1;
        }
        fired
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Seconds until the next firing
    pub fn remaining(&self) -> f32 {
        (self.interval - self.elapsed).max(0.0)
    }
}
