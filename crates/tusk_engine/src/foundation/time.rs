//! Time management utilities

/// Frame timer driven by an external clock
///
/// The platform owns the clock; the timer only turns successive readings
/// into frame times and keeps running totals.
#[derive(Debug, Clone)]
pub struct Timer {
    last_time: Option<f64>,
    delta_time: f64,
    total_time: f64,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub const fn new() -> Self {
        Self {
            last_time: None,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Feed the current clock reading (should be called once per frame)
    ///
    /// Returns the time since the previous reading. The first reading only
    /// establishes the baseline and yields zero.
    pub fn tick(&mut self, now: f64) -> f64 {
        let delta = self.last_time.map_or(0.0, |last| (now - last).max(0.0));
        self.last_time = Some(now);
        self.delta_time = delta;
        self.total_time += delta;
        self.frame_count += 1;
        delta
    }

    /// Get the time since the last frame in seconds
    pub const fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Get the total elapsed time since the first reading
    pub const fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Get the current frame count
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since the first reading
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f64 {
        if self.total_time > 0.0 {
            self.frame_count.saturating_sub(1) as f64 / self.total_time
        } else {
            0.0
        }
    }
}

/// Shortest accepted simulation step (10 kHz)
pub const MIN_STEP: f64 = 1.0e-4;

/// Step used when the requested one is unusable (60 Hz)
pub const DEFAULT_STEP: f64 = 1.0 / 60.0;

/// Fixed simulation step accumulator
///
/// Render frames of arbitrary length are fed in; the accumulator reports how
/// many whole simulation steps of `step` seconds are due.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f64,
    accumulator: f64,
    elapsed: f64,
    ticks: u64,
}

impl FixedTimestep {
    /// Create an accumulator that runs `frequency_hz` steps per simulated second
    ///
    /// Non-positive or non-finite frequencies fall back to 60 Hz.
    pub fn from_frequency(frequency_hz: f64) -> Self {
        let frequency = if frequency_hz.is_finite() && frequency_hz > 0.0 {
            frequency_hz
        } else {
            log::warn!("Invalid update frequency {frequency_hz}, falling back to 60 Hz");
            60.0
        };
        Self::new(1.0 / frequency)
    }

    /// Create an accumulator with an explicit step length in seconds
    ///
    /// Steps shorter than [`MIN_STEP`] are clamped to it. Non-positive or
    /// non-finite steps fall back to [`DEFAULT_STEP`].
    pub fn new(step: f64) -> Self {
        let step = if !step.is_finite() || step <= 0.0 {
            log::warn!("Invalid simulation step {step}, falling back to 60 Hz");
            DEFAULT_STEP
        } else if step < MIN_STEP {
            log::warn!("Simulation step {step} is below {MIN_STEP}, clamping");
            MIN_STEP
        } else {
            step
        };

        Self {
            step,
            accumulator: 0.0,
            elapsed: 0.0,
            ticks: 0,
        }
    }

    /// Length of one simulation step in seconds
    pub const fn step(&self) -> f64 {
        self.step
    }

    /// Add a frame's worth of time
    ///
    /// Negative or non-finite frame times are ignored.
    pub fn accumulate(&mut self, frame_time: f64) {
        if frame_time.is_finite() {
            self.accumulator += frame_time.max(0.0);
        }
    }

    /// Consume one step if enough time has accumulated
    pub fn consume_step(&mut self) -> bool {
        if self.accumulator >= self.step {
            self.accumulator -= self.step;
            self.elapsed += self.step;
            self.ticks += 1;
            true
        } else {
            false
        }
    }

    /// Time left over after the last consumed step
    pub const fn remainder(&self) -> f64 {
        self.accumulator
    }

    /// Total simulated time
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Total number of consumed steps
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}
