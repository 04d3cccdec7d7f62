//! Time management utilities

use std::time::{Duration, Instant};

/// Frame timer measuring the interval between consecutive render-loop calls
///
/// Owned by the update scheduler; replaces a process-wide frame-rate global
/// that a renderer callback would otherwise write.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    last_frame: Option<Instant>,
    delta_time: f64,
    frame_count: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    /// Create a new timer that has not seen any frame yet
    pub fn new() -> Self {
        Self {
            last_frame: None,
            delta_time: 0.0,
            frame_count: 0,
        }
    }

    /// Record a frame at `now`
    pub fn update(&mut self, now: Instant) {
        if let Some(last) = self.last_frame {
            self.delta_time = now.saturating_duration_since(last).as_secs_f64();
        }
        self.last_frame = Some(now);
        self.frame_count += 1;
    }

    /// Time between the two most recent frames, in seconds
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Number of frames recorded
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Current frame rate (based on the last frame interval)
    pub fn current_fps(&self) -> f64 {
        if self.delta_time > 0.0 {
            1.0 / self.delta_time
        } else {
            0.0
        }
    }
}

/// Admits at most one effectful update per `1 / max_rate` seconds
///
/// Never blocks: callers poll [`RateLimiter::try_acquire`] and simply do
/// nothing when it returns `false`.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    last: Option<Instant>,
}

impl RateLimiter {
    /// Create a limiter for `max_rate` updates per second
    ///
    /// Non-positive or non-finite rates disable limiting.
    pub fn new(max_rate: f64) -> Self {
        let min_interval = if max_rate.is_finite() && max_rate > 0.0 {
            Duration::from_secs_f64(1.0 / max_rate)
        } else {
            Duration::ZERO
        };
        Self {
            min_interval,
            last: None,
        }
    }

    /// Minimum spacing between admitted updates
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Returns `true` and records `now` if enough time has elapsed since the
    /// previously admitted update. The first call is always admitted.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) < self.min_interval {
                return false;
            }
        }
        self.last = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_admits_first_then_spaces() {
        let mut limiter = RateLimiter::new(10.0);
        let t0 = Instant::now();

        assert!(limiter.try_acquire(t0));
        assert!(!limiter.try_acquire(t0 + Duration::from_millis(50)));
        assert!(limiter.try_acquire(t0 + Duration::from_millis(100)));
        // Rejected calls do not move the reference point
        assert!(!limiter.try_acquire(t0 + Duration::from_millis(150)));
        assert!(limiter.try_acquire(t0 + Duration::from_millis(200)));
    }

    #[test]
    fn test_rate_limiter_disabled_for_invalid_rate() {
        let mut limiter = RateLimiter::new(0.0);
        let t0 = Instant::now();
        assert!(limiter.try_acquire(t0));
        assert!(limiter.try_acquire(t0));
    }

    #[test]
    fn test_frame_timer_fps() {
        let mut timer = FrameTimer::new();
        let t0 = Instant::now();
        timer.update(t0);
        assert_eq!(timer.current_fps(), 0.0);

        timer.update(t0 + Duration::from_millis(20));
        assert!((timer.current_fps() - 50.0).abs() < 1e-6);
        assert_eq!(timer.frame_count(), 2);
    }
}
