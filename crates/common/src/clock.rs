//! Clock and timing utilities for the composition loop.
//!
//! The composer itself is call-and-return; these helpers serve the host
//! tick loop that drives it:
//! - Anchoring a session to a monotonic epoch
//! - Pacing ticks to a target rate
//! - Measuring achieved frame throughput

use std::time::{Duration, Instant};

/// A session clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment the loop started).
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new session clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get nanoseconds elapsed since session start.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Get seconds elapsed since session start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Convert an elapsed nanosecond value to seconds.
    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / 1_000_000_000.0
    }
}

/// Frame rate controller for paced tick loops.
#[derive(Debug)]
pub struct RateController {
    target_interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl RateController {
    /// Create a controller targeting the given Hz rate.
    ///
    /// A rate of zero never throttles.
    pub fn new(target_hz: u32) -> Self {
        let target_interval_ns = if target_hz == 0 {
            0
        } else {
            1_000_000_000 / target_hz as u64
        };
        Self {
            target_interval_ns,
            last_tick_ns: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns >= last + self.target_interval_ns => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }

    /// Time remaining until the next tick is due.
    pub fn wait_hint(&self, current_ns: u64) -> Duration {
        match self.last_tick_ns {
            Some(last) => {
                let due = last + self.target_interval_ns;
                Duration::from_nanos(due.saturating_sub(current_ns))
            }
            None => Duration::ZERO,
        }
    }

    /// Target interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.target_interval_ns
    }
}

/// Accumulated throughput over a run of generated frames.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub frames: u64,
    pub elapsed_secs: f64,
}

impl FrameStats {
    pub fn record(&mut self, frames: u64, elapsed: Duration) {
        self.frames += frames;
        self.elapsed_secs += elapsed.as_secs_f64();
    }

    /// Frames per second; zero before any time has been recorded.
    pub fn fps(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            0.0
        } else {
            self.frames as f64 / self.elapsed_secs
        }
    }

    /// Average milliseconds spent per frame.
    pub fn ms_per_frame(&self) -> f64 {
        if self.frames == 0 {
            0.0
        } else {
            self.elapsed_secs * 1000.0 / self.frames as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = SessionClock::start();
        assert!(clock.elapsed_ns() < 1_000_000_000);
        assert!(!clock.epoch_wall().is_empty());
    }

    #[test]
    fn test_ns_to_secs_conversion() {
        assert!((SessionClock::ns_to_secs(1_500_000_000) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_rate_controller() {
        let mut ctrl = RateController::new(60);
        assert!(ctrl.should_tick(0)); // first tick always fires
        assert!(!ctrl.should_tick(1_000_000)); // 1ms later, too soon
        assert!(ctrl.should_tick(17_000_000)); // ~17ms later (60Hz ~ 16.67ms)
    }

    #[test]
    fn test_unpaced_controller_always_ticks() {
        let mut ctrl = RateController::new(0);
        assert!(ctrl.should_tick(5));
        assert!(ctrl.should_tick(5));
        assert_eq!(ctrl.wait_hint(5), Duration::ZERO);
    }

    #[test]
    fn test_wait_hint_counts_down() {
        let mut ctrl = RateController::new(10);
        ctrl.should_tick(0);
        assert_eq!(ctrl.wait_hint(40_000_000), Duration::from_millis(60));
        assert_eq!(ctrl.wait_hint(200_000_000), Duration::ZERO);
    }

    #[test]
    fn test_frame_stats() {
        let mut stats = FrameStats::default();
        assert_eq!(stats.fps(), 0.0);
        stats.record(50, Duration::from_secs(2));
        assert!((stats.fps() - 25.0).abs() < 1e-9);
        assert!((stats.ms_per_frame() - 40.0).abs() < 1e-9);
    }
}
