//! Slew limiting for control voltages.
//!
//! A slew limiter bounds how fast its output may change. Each update moves
//! the output toward the target by at most `rate · dt`, so the output
//! approaches the target monotonically and never passes it. A rate of zero
//! disables limiting entirely: the output follows the target instantly.
//!
//! Unlike [`Envelope`](crate::Envelope), the limiter is stateful: it remembers
//! the last output. One limiter belongs to one output channel.
//!
//! ```rust
//! use voltseq_core::SlewLimiter;
//!
//! // 0.5 V per millisecond.
//! let mut slew = SlewLimiter::new(0.5);
//! slew.reset(0.0);
//!
//! assert_eq!(slew.advance(5.0, 1.0), 0.5);
//! assert_eq!(slew.advance(5.0, 4.0), 2.5);
//! assert_eq!(slew.advance(5.0, 100.0), 5.0);
//! ```

/// Rate limiter with a maximum slope in units per millisecond.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlewLimiter {
    current: f32,
    rate_per_ms: f32,
    primed: bool,
}

fn sanitize_rate(rate_per_ms: f32) -> f32 {
    if rate_per_ms.is_nan() || rate_per_ms < 0.0 {
        0.0
    } else {
        rate_per_ms
    }
}

impl SlewLimiter {
    /// Create a limiter. `rate_per_ms <= 0` means no limiting.
    ///
    /// The first call to [`advance`](Self::advance) snaps to its target unless
    /// [`reset`](Self::reset) seeded a starting value.
    pub fn new(rate_per_ms: f32) -> Self {
        Self {
            current: 0.0,
            rate_per_ms: sanitize_rate(rate_per_ms),
            primed: false,
        }
    }

    /// Change the maximum slope. Negative or NaN rates disable limiting.
    pub fn set_rate(&mut self, rate_per_ms: f32) {
        self.rate_per_ms = sanitize_rate(rate_per_ms);
    }

    /// Maximum slope in units per millisecond (`0` = unlimited).
    pub fn rate(&self) -> f32 {
        self.rate_per_ms
    }

    /// Whether limiting is active.
    pub fn is_limiting(&self) -> bool {
        self.rate_per_ms > 0.0
    }

    /// Seed the output with `value`.
    pub fn reset(&mut self, value: f32) {
        self.current = value;
        self.primed = true;
    }

    /// Last output.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Move toward `target` over `dt_ms` milliseconds and return the new output.
    ///
    /// A NaN target leaves the output where it is; a negative or NaN `dt_ms`
    /// counts as zero elapsed time.
    #[inline]
    pub fn advance(&mut self, target: f32, dt_ms: f32) -> f32 {
        if target.is_nan() {
            return self.current;
        }
        if !self.primed || self.rate_per_ms <= 0.0 {
            self.reset(target);
            return target;
        }

        let dt = if dt_ms.is_nan() { 0.0 } else { dt_ms.max(0.0) };
        let max_step = self.rate_per_ms * dt;
        let diff = target - self.current;
        if diff.abs() <= max_step {
            self.current = target;
        } else {
            self.current += max_step.copysign(diff);
        }
        self.current
    }
}

impl Default for SlewLimiter {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_is_instant() {
        let mut slew = SlewLimiter::new(0.0);
        slew.reset(-3.0);
        assert_eq!(slew.advance(4.0, 0.001), 4.0);
        assert_eq!(slew.advance(-10.0, 0.0), -10.0);
    }

    #[test]
    fn first_advance_snaps() {
        let mut slew = SlewLimiter::new(0.01);
        assert_eq!(slew.advance(2.0, 1.0), 2.0);
    }

    #[test]
    fn limits_rising_and_falling() {
        let mut slew = SlewLimiter::new(1.0);
        slew.reset(0.0);
        assert_eq!(slew.advance(3.0, 1.0), 1.0);
        assert_eq!(slew.advance(3.0, 1.0), 2.0);
        assert_eq!(slew.advance(-3.0, 1.0), 1.0);
    }

    #[test]
    fn never_overshoots() {
        let mut slew = SlewLimiter::new(0.7);
        slew.reset(0.0);
        let mut prev = 0.0;
        for _ in 0..100 {
            let out = slew.advance(5.0, 1.0);
            assert!(out >= prev);
            assert!(out <= 5.0);
            prev = out;
        }
        assert_eq!(prev, 5.0);
    }

    #[test]
    fn garbage_inputs_hold_position() {
        let mut slew = SlewLimiter::new(1.0);
        slew.reset(1.0);
        assert_eq!(slew.advance(f32::NAN, 1.0), 1.0);
        assert_eq!(slew.advance(5.0, f32::NAN), 1.0);
        assert_eq!(slew.advance(5.0, -2.0), 1.0);
    }

    #[test]
    fn negative_rate_disables() {
        let slew = SlewLimiter::new(-1.0);
        assert!(!slew.is_limiting());
        assert_eq!(slew.rate(), 0.0);
    }
}
