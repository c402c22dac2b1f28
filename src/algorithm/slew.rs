#[cfg(not(feature = "std"))]
use micromath::F32Ext;

use super::lpf::{alpha, LPF};

const SLEW_RATE_FILTER_HZ: f32 = 10.0;
const PEAK_DECAY_TAU: f32 = 1.0;
const MIN_MODIFIER: f32 = 0.1;

/// Reduces gain when the controller output oscillates faster than allowed
#[derive(Copy, Clone, Debug, Default)]
pub struct SlewLimiter {
    filter: LPF<f32>,
    last_sample: Option<f32>,
    slew_rate: f32,
    peak: f32,
}

impl SlewLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filtered slew rate of the last sample, in sample units per second
    pub fn slew_rate(&self) -> f32 {
        self.slew_rate
    }

    /// Returns the gain multiplier in [0.1, 1], 1 when `slew_max` is not positive
    pub fn modifier(&mut self, sample: f32, slew_max: f32, dt: f32) -> f32 {
        if !(dt > 0.0) || !sample.is_finite() {
            return 1.0;
        }
        let derivative = match self.last_sample {
            Some(last) => (sample - last) / dt,
            None => 0.0,
        };
        self.last_sample = Some(sample);
        self.slew_rate = self.filter.filter(derivative.abs(), alpha(dt, SLEW_RATE_FILTER_HZ));

        let decay = (1.0 - dt / PEAK_DECAY_TAU).max(0.0);
        self.peak = (self.peak * decay).max(self.slew_rate);

        if !(slew_max > 0.0) || self.peak <= slew_max {
            return 1.0;
        }
        let modifier = slew_max / (slew_max + 1.5 * (self.peak - slew_max));
        modifier.max(MIN_MODIFIER)
    }
}

mod test {
    #[test]
    fn test_steady_input() {
        use super::SlewLimiter;

        let mut limiter = SlewLimiter::new();
        for _ in 0..100 {
            assert_eq!(limiter.modifier(5.0, 10.0, 0.02), 1.0);
        }
        assert_eq!(limiter.slew_rate(), 0.0);
    }

    #[test]
    fn test_oscillation_reduces_gain() {
        use super::SlewLimiter;

        let mut limiter = SlewLimiter::new();
        let mut modifier = 1.0;
        for i in 0..50 {
            let sample = if i % 2 == 0 { 100.0 } else { -100.0 };
            modifier = limiter.modifier(sample, 50.0, 0.02);
        }
        assert!(modifier < 1.0);
        assert!(modifier >= 0.1);
        assert!(limiter.slew_rate() > 50.0);

        let mut disabled = SlewLimiter::new();
        for i in 0..50 {
            let sample = if i % 2 == 0 { 100.0 } else { -100.0 };
            assert_eq!(disabled.modifier(sample, 0.0, 0.02), 1.0);
        }
    }

    #[test]
    fn test_peak_decays() {
        use super::SlewLimiter;

        let mut limiter = SlewLimiter::new();
        for i in 0..50 {
            let sample = if i % 2 == 0 { 100.0 } else { -100.0 };
            limiter.modifier(sample, 50.0, 0.02);
        }
        let mut modifier = 0.0;
        for _ in 0..500 {
            modifier = limiter.modifier(0.0, 50.0, 0.02);
        }
        assert_eq!(modifier, 1.0);
    }
}
