//! # Platform Abstraction
//!
//! The driver loop needs four things from the windowing layer: a clock, a
//! close request, a buffer swap and an event pump. [`Platform`] is that
//! surface. [`HeadlessPlatform`] simulates it with a fixed frame time and a
//! frame limit.

/// Windowing layer as seen by the driver loop
pub trait Platform {
    /// Current clock reading in seconds
    fn time(&self) -> f64;

    /// Whether the window has been asked to close
    fn should_close(&self) -> bool;

    /// Present the rendered frame
    fn present(&mut self);

    /// Process pending window and input events
    fn poll_events(&mut self);
}

/// Platform without a window
///
/// Each [`Platform::present`] advances the clock by `frame_time` seconds.
/// The platform asks to close once `frames` frames were presented.
#[derive(Debug, Clone)]
pub struct HeadlessPlatform {
    frame_time: f64,
    frame_limit: u64,
    now: f64,
    presented: u64,
    polls: u64,
}

impl HeadlessPlatform {
    /// Create a platform that runs `frames` frames of `frame_time` seconds each
    pub fn new(frame_time: f64, frames: u64) -> Self {
        Self {
            frame_time: frame_time.max(0.0),
            frame_limit: frames,
            now: 0.0,
            presented: 0,
            polls: 0,
        }
    }

    /// Simulated frame length
    pub const fn frame_time(&self) -> f64 {
        self.frame_time
    }

    /// Number of frames presented so far
    pub const fn presented(&self) -> u64 {
        self.presented
    }

    /// Number of event polls so far
    pub const fn polls(&self) -> u64 {
        self.polls
    }
}

impl Platform for HeadlessPlatform {
    fn time(&self) -> f64 {
        self.now
    }

    fn should_close(&self) -> bool {
        self.presented >= self.frame_limit
    }

    fn present(&mut self) {
        self.presented += 1;
        self.now += self.frame_time;
    }

    fn poll_events(&mut self) {
        self.polls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_headless_clock_advances_per_present() {
        let mut platform = HeadlessPlatform::new(0.25, 3);
        assert_relative_eq!(platform.time(), 0.0);

        platform.present();
        platform.present();
        assert_relative_eq!(platform.time(), 0.5);
        assert!(!platform.should_close());

        platform.present();
        assert!(platform.should_close());
        assert_eq!(platform.presented(), 3);
    }

    #[test]
    fn test_zero_frames_closes_immediately() {
        let platform = HeadlessPlatform::new(0.1, 0);
        assert!(platform.should_close());
    }
}
