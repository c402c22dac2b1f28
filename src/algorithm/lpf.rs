/// Smoothing factor of a first order low pass filter sampled every `dt` seconds,
/// a non-positive cutoff passes samples through unfiltered
pub fn alpha(dt: f32, cutoff_hz: f32) -> f32 {
    if !(cutoff_hz > 0.0) || !(dt > 0.0) {
        return 1.0;
    }
    let rc = 1.0 / (2.0 * core::f32::consts::PI * cutoff_hz);
    dt / (dt + rc)
}

#[derive(Copy, Clone, Debug, Default)]
pub struct LPF<T> {
    value: T,
    primed: bool,
}

impl LPF<f32> {
    pub fn new() -> Self {
        Self::default()
    }

    /// First sample seeds the filter
    pub fn filter(&mut self, sample: f32, alpha: f32) -> f32 {
        if !self.primed {
            self.primed = true;
            self.value = sample;
            return self.value;
        }
        self.value = (1.0 - alpha) * self.value + alpha * sample;
        self.value
    }
}

mod test {
    #[test]
    fn test_lpf() {
        use super::{alpha, LPF};

        let mut lpf = LPF::<f32>::new();
        let a = alpha(0.1, 1.0);
        assert_eq!(lpf.filter(3.335, a), 3.335);
        let value0 = lpf.filter(3.295, a);
        let value1 = lpf.filter(3.295, a);
        assert!(3.295 < value1 && value1 < value0);
        let value2 = lpf.filter(3.295, a);
        assert!(3.295 < value2 && value2 < value1);
    }

    #[test]
    fn test_alpha() {
        use super::alpha;

        assert_eq!(alpha(0.02, 0.0), 1.0);
        assert_eq!(alpha(0.0, 20.0), 1.0);
        assert_eq!(alpha(0.02, f32::NAN), 1.0);
        let a = alpha(0.02, 10.0);
        let expected = 0.02 / (0.02 + 1.0 / (2.0 * core::f32::consts::PI * 10.0));
        assert!((a - expected).abs() < 1e-6);
        assert!(alpha(0.02, 20.0) > a);
    }
}
