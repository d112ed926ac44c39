/// Frame clock.
/// Turns raw frame deltas into the clamped step the simulation advances by,
/// so a long gap (tab resume, debugger pause) never produces a huge jump.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Upper bound on a single step.
    max_dt: f32,
    /// Simulated time: the sum of clamped steps.
    elapsed: f32,
    /// Wall time: the sum of raw deltas.
    real_time: f64,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            max_dt,
            elapsed: 0.0,
            real_time: 0.0,
        }
    }

    /// Record a raw frame delta. Returns the clamped step.
    /// Negative deltas (clock skew) count as zero.
    pub fn advance(&mut self, raw_dt: f32) -> f32 {
        let raw = raw_dt.max(0.0);
        self.real_time += raw as f64;
        let dt = raw.min(self.max_dt);
        self.elapsed += dt;
        dt
    }

    /// Total simulated time.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Total wall time.
    pub fn real_time(&self) -> f64 {
        self.real_time
    }

    pub fn max_dt(&self) -> f32 {
        self.max_dt
    }
}

/// Windowed frame counter.
/// Counts frames and yields a rounded FPS value once per window.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: f64,
    frames: u32,
    window_start: f64,
    last_fps: u32,
}

impl FpsCounter {
    pub fn new(window: f32) -> Self {
        Self {
            window: window.max(f32::EPSILON) as f64,
            frames: 0,
            window_start: 0.0,
            last_fps: 0,
        }
    }

    /// Count one frame at wall time `now`.
    /// Returns `Some(fps)` when the window has closed, at most once per window.
    pub fn tick(&mut self, now: f64) -> Option<u32> {
        self.frames += 1;
        let span = now - self.window_start;
        if span < self.window {
            return None;
        }
        let fps = (self.frames as f64 / span).round() as u32;
        self.frames = 0;
        self.window_start = now;
        self.last_fps = fps;
        Some(fps)
    }

    /// The most recently reported value (0 before the first window closes).
    pub fn last(&self) -> u32 {
        self.last_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_steps_pass_through() {
        let mut clock = FrameClock::new(0.1);
        let dt = clock.advance(1.0 / 60.0);
        assert!((dt - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn large_gap_is_clamped() {
        let mut clock = FrameClock::new(0.1);
        let dt = clock.advance(5.0); // tab resumed after five seconds
        assert_eq!(dt, 0.1);
        assert!((clock.elapsed() - 0.1).abs() < 1e-6);
        assert!((clock.real_time() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn negative_delta_counts_as_zero() {
        let mut clock = FrameClock::new(0.1);
        assert_eq!(clock.advance(-0.5), 0.0);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn fps_reported_once_per_window() {
        let mut fps = FpsCounter::new(1.0);
        let mut now = 0.0;
        let mut reports = Vec::new();
        for _ in 0..180 {
            now += 1.0 / 60.0;
            if let Some(v) = fps.tick(now) {
                reports.push(v);
            }
        }
        // Three seconds of frames: three windows closed.
        assert!(reports.len() >= 2 && reports.len() <= 3, "reports = {:?}", reports);
        for v in &reports {
            assert!((59..=61).contains(v), "fps was {}", v);
        }
        assert_eq!(fps.last(), *reports.last().unwrap());
    }

    #[test]
    fn fps_silent_inside_window() {
        let mut fps = FpsCounter::new(1.0);
        assert_eq!(fps.tick(0.5), None);
        assert_eq!(fps.last(), 0);
    }
}
