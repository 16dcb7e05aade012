//! Simulation clock: wall-clock frame deltas in, simulation seconds out.
//!
//! Kinematics are a pure function of time, so the clock only has to produce a
//! monotonic simulation time. A long stall (window drag, debugger break) is
//! clamped to [`MAX_FRAME_TIME`] instead of making the planets jump.

use std::time::Instant;

use tracing::warn;

/// Longest wall-clock delta a single frame may contribute, in seconds.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Bounds on the magnitude reachable through [`SimulationClock::scale_time`].
pub const MIN_TIME_SCALE: f64 = 1.0 / 1024.0;
pub const MAX_TIME_SCALE: f64 = 1024.0;

/// Accumulates scaled simulation time across frames.
#[derive(Debug)]
pub struct SimulationClock {
    previous_time: Instant,
    sim_time: f64,
    time_scale: f64,
    paused: bool,
    frame_count: u64,
}

impl SimulationClock {
    pub fn new(time_scale: f64, paused: bool) -> Self {
        let mut clock = Self {
            previous_time: Instant::now(),
            sim_time: 0.0,
            time_scale: 1.0,
            paused,
            frame_count: 0,
        };
        clock.set_time_scale(time_scale);
        clock
    }

    /// Measure the time since the previous tick and advance by it.
    ///
    /// Returns the simulation time to render this frame at.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;
        self.advance(frame_time)
    }

    /// Advance by an explicit wall-clock delta in seconds.
    pub fn advance(&mut self, frame_time: f64) -> f64 {
        let mut frame_time = frame_time.max(0.0);
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }

        if !self.paused {
            self.sim_time += frame_time * self.time_scale;
        }
        self.frame_count += 1;
        self.sim_time
    }

    /// Simulation seconds elapsed so far.
    pub fn elapsed(&self) -> f64 {
        self.sim_time
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Set the simulation speed. Non-finite values are ignored; negative
    /// values run the scene backwards.
    pub fn set_time_scale(&mut self, time_scale: f64) {
        if time_scale.is_finite() {
            self.time_scale = time_scale;
        } else {
            warn!("Ignoring non-finite time scale {time_scale}");
        }
    }

    /// Multiply the time scale by `factor`, staying within
    /// [`MIN_TIME_SCALE`]..=[`MAX_TIME_SCALE`] in magnitude.
    pub fn scale_time(&mut self, factor: f64) -> f64 {
        let scaled = self.time_scale * factor;
        if scaled.is_finite() && (MIN_TIME_SCALE..=MAX_TIME_SCALE).contains(&scaled.abs()) {
            self.time_scale = scaled;
        }
        self.time_scale
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Flip the pause state and return the new one.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(1.0, false)
    }
}

/// Frames-per-second over roughly one-second windows.
#[derive(Debug, Default)]
pub struct FrameRate {
    window: f64,
    frames: u32,
}

impl FrameRate {
    /// Record one frame of `frame_time` seconds. Returns the average rate
    /// once at least a second has been recorded, then starts a new window.
    pub fn record(&mut self, frame_time: f64) -> Option<f64> {
        self.window += frame_time.max(0.0);
        self.frames += 1;
        if self.window < 1.0 {
            return None;
        }
        let fps = f64::from(self.frames) / self.window;
        *self = Self::default();
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_starts_at_zero() {
        let clock = SimulationClock::default();
        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.frame_count(), 0);
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_advance_accumulates() {
        let mut clock = SimulationClock::default();
        for _ in 0..60 {
            clock.advance(1.0 / 60.0);
        }
        assert!((clock.elapsed() - 1.0).abs() < 1e-9);
        assert_eq!(clock.frame_count(), 60);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut clock = SimulationClock::default();
        let t = clock.advance(1.0);
        assert!((t - MAX_FRAME_TIME).abs() < EPSILON);
    }

    #[test]
    fn test_negative_frame_time_is_ignored() {
        let mut clock = SimulationClock::default();
        clock.advance(0.1);
        assert!((clock.advance(-0.5) - 0.1).abs() < EPSILON);
    }

    #[test]
    fn test_time_scale_multiplies_delta() {
        let mut clock = SimulationClock::new(4.0, false);
        let t = clock.advance(0.1);
        assert!((t - 0.4).abs() < EPSILON);
    }

    #[test]
    fn test_clamp_applies_before_scaling() {
        let mut clock = SimulationClock::new(10.0, false);
        let t = clock.advance(5.0);
        assert!((t - MAX_FRAME_TIME * 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_pause_freezes_time_but_counts_frames() {
        let mut clock = SimulationClock::new(1.0, true);
        clock.advance(0.1);
        clock.advance(0.1);
        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.frame_count(), 2);

        assert!(!clock.toggle_pause());
        clock.advance(0.1);
        assert!((clock.elapsed() - 0.1).abs() < EPSILON);
    }

    #[test]
    fn test_negative_scale_runs_backwards() {
        let mut clock = SimulationClock::new(-1.0, false);
        assert!(clock.advance(0.2) < 0.0);
    }

    #[test]
    fn test_non_finite_scale_is_ignored() {
        let mut clock = SimulationClock::new(f64::NAN, false);
        assert_eq!(clock.time_scale(), 1.0);
        clock.set_time_scale(f64::INFINITY);
        assert_eq!(clock.time_scale(), 1.0);
    }

    #[test]
    fn test_scale_time_doubles_and_halves_within_bounds() {
        let mut clock = SimulationClock::default();
        assert_eq!(clock.scale_time(2.0), 2.0);
        assert_eq!(clock.scale_time(0.5), 1.0);

        clock.set_time_scale(MAX_TIME_SCALE);
        assert_eq!(clock.scale_time(2.0), MAX_TIME_SCALE);

        clock.set_time_scale(MIN_TIME_SCALE);
        assert_eq!(clock.scale_time(0.5), MIN_TIME_SCALE);
    }

    #[test]
    fn test_frame_rate_reports_once_per_second() {
        let mut rate = FrameRate::default();
        for _ in 0..3 {
            assert!(rate.record(0.25).is_none());
        }
        assert_eq!(rate.record(0.25), Some(4.0));
        assert!(rate.record(0.25).is_none());
    }
}
