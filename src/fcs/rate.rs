#[cfg(not(feature = "std"))]
use micromath::F32Ext;

use super::pid::Pid;
use crate::params::Gains;
use crate::types::control::{Deflection, MAX_DEFLECTION};
use crate::types::measurement::{degrees, radians};
use crate::types::pid::PidInfo;

/// Output magnitude in degrees at which the integrator stops winding up
const OUTPUT_LIMIT: f32 = 45.0;

#[derive(Copy, Clone, Debug, Default)]
pub struct RateInput {
    /// deg/s
    pub desired_rate: f32,
    /// rad/s
    pub rate: f32,
    pub scaler: f32,
    pub eas2tas: f32,
    /// m/s, zero when unknown
    pub airspeed: f32,
    pub airspeed_min: f32,
    pub disable_integrator: bool,
    pub ground_mode: bool,
    pub dt: f32,
}

impl RateInput {
    pub fn underspeed(&self) -> bool {
        !(self.airspeed > self.airspeed_min)
    }
}

/// Inner loop, body rate to surface deflection
#[derive(Clone, Debug, Default)]
pub struct RateLoop {
    pid: Pid,
    last_out: f32,
    info: PidInfo,
}

impl RateLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a deflection in centidegrees within ±4500
    pub fn update(&mut self, gains: &Gains, input: &RateInput) -> Deflection {
        let usable = input.desired_rate.is_finite() && input.rate.is_finite();
        if !usable || !input.scaler.is_finite() {
            return self.hold(input);
        }

        let underspeed = input.underspeed();
        let limit_i = self.last_out.abs() >= OUTPUT_LIMIT || underspeed;
        let old_integrator = self.pid.integrator();

        // P and I see inputs scaled by scaler² so one gain set covers the speed range
        let scaler2 = input.scaler * input.scaler;
        let target = radians(input.desired_rate) * scaler2;
        let measurement = input.rate * scaler2;
        self.pid.update_all(gains, target, measurement, input.dt, limit_i, OUTPUT_LIMIT);

        if underspeed {
            self.pid.set_integrator(old_integrator, gains.imax);
        }

        let denominator = input.scaler * input.eas2tas;
        let ff = if denominator > 0.0 { degrees(self.pid.ff(gains) / denominator) } else { 0.0 };

        if input.disable_integrator {
            self.pid.reset_i();
        }

        let mut info = *self.pid.info();
        info.target = input.desired_rate;
        info.actual = degrees(input.rate);
        info.p = degrees(info.p);
        info.i = degrees(self.pid.integrator());
        info.d = degrees(info.d);
        info.ff = if ff.is_finite() { ff } else { 0.0 };
        self.info = info;

        let mut out = info.ff + info.p + info.i + info.d;
        if input.ground_mode {
            out -= info.d + 0.5 * info.p;
        }
        self.deflect(out)
    }

    /// Tick with unusable input, only the held integrator reaches the surface
    fn hold(&mut self, input: &RateInput) -> Deflection {
        if input.disable_integrator {
            self.pid.reset_i();
        }
        let finite = |value: f32| if value.is_finite() { value } else { 0.0 };
        let i = degrees(self.pid.integrator());
        self.info = PidInfo {
            target: finite(input.desired_rate),
            actual: finite(degrees(input.rate)),
            i,
            d_mod: 1.0,
            ..Default::default()
        };
        self.deflect(i)
    }

    fn deflect(&mut self, out: f32) -> Deflection {
        let out = if out.is_finite() { out } else { 0.0 };
        self.last_out = out.max(-OUTPUT_LIMIT).min(OUTPUT_LIMIT);
        (out * 100.0).max(-MAX_DEFLECTION).min(MAX_DEFLECTION)
    }

    pub fn info(&self) -> &PidInfo {
        &self.info
    }

    pub fn last_out(&self) -> f32 {
        self.last_out
    }

    pub fn integrator(&self) -> f32 {
        self.pid.integrator()
    }

    pub fn reset_i(&mut self) {
        self.pid.reset_i();
        self.info = PidInfo::default();
    }
}

#[cfg(test)]
mod test {
    use super::RateInput;
    use crate::params::Gains;

    fn input(desired_rate: f32, rate: f32) -> RateInput {
        RateInput {
            desired_rate,
            rate,
            scaler: 1.0,
            eas2tas: 1.0,
            airspeed: 20.0,
            airspeed_min: 5.0,
            dt: 0.02,
            ..Default::default()
        }
    }

    fn gains(p: f32, i: f32, ff: f32) -> Gains {
        Gains { p, i, ff, imax: 0.666, ..Default::default() }
    }

    #[test]
    fn test_positive_demand() {
        use super::RateLoop;

        let mut rate_loop = RateLoop::new();
        let gains = gains(0.2, 0.1, 0.0);
        let out = rate_loop.update(&gains, &input(10.0, 0.0));
        assert!(out > 0.0);
        assert!(out <= 4500.0);
        // P contributes 0.2 of the 10 deg/s error, in centidegrees
        assert!((out - 200.0).abs() < 5.0);
        assert_eq!(rate_loop.info().target, 10.0);

        for _ in 0..1000 {
            let out = rate_loop.update(&gains, &input(10.0, 0.0));
            assert!(out > 0.0 && out <= 4500.0);
        }
    }

    #[test]
    fn test_output_clamped() {
        use super::RateLoop;

        let mut rate_loop = RateLoop::new();
        let gains = gains(5.0, 0.5, 1.0);
        for scaler in [0.1f32, 0.5, 1.0, 2.0, 5.0] {
            for desired in [-500.0f32, -30.0, 0.0, 45.0, 720.0] {
                let input = RateInput { scaler, ..input(desired, -desired.signum() * 3.0) };
                let out = rate_loop.update(&gains, &input);
                assert!(out >= -4500.0 && out <= 4500.0);
                assert!(rate_loop.last_out().abs() <= 45.0);
            }
        }
    }

    #[test]
    fn test_feed_forward() {
        use super::RateLoop;

        let mut rate_loop = RateLoop::new();
        let gains = Gains { ff: 0.5, ..Default::default() };
        let input = RateInput { scaler: 2.0, eas2tas: 1.25, ..input(10.0, 0.0) };
        rate_loop.update(&gains, &input);
        // desired × scaler × FF / EAS2TAS
        assert!((rate_loop.info().ff - 8.0).abs() < 1e-3);

        let input = RateInput { eas2tas: 0.0, ..input };
        let out = rate_loop.update(&gains, &input);
        assert_eq!(rate_loop.info().ff, 0.0);
        assert!(out.is_finite());
    }

    #[test]
    fn test_underspeed_locks_integrator() {
        use super::RateLoop;

        let mut rate_loop = RateLoop::new();
        let gains = gains(0.1, 0.5, 0.0);
        for _ in 0..20 {
            rate_loop.update(&gains, &input(20.0, 0.0));
        }
        let held = rate_loop.integrator();
        assert!(held > 0.0);

        let slow = RateInput { airspeed: 5.0, ..input(20.0, 0.0) };
        for _ in 0..20 {
            rate_loop.update(&gains, &slow);
            assert!(rate_loop.integrator().abs() <= held.abs());
        }

        let unknown = RateInput { airspeed: 0.0, ..input(20.0, 0.0) };
        rate_loop.update(&gains, &unknown);
        assert_eq!(rate_loop.integrator(), held);
    }

    #[test]
    fn test_disable_integrator() {
        use super::RateLoop;

        let mut rate_loop = RateLoop::new();
        let gains = gains(0.1, 0.5, 0.0);
        let input = RateInput { disable_integrator: true, ..input(20.0, 0.0) };
        for _ in 0..10 {
            rate_loop.update(&gains, &input);
            assert_eq!(rate_loop.integrator(), 0.0);
        }
    }

    #[test]
    fn test_ground_mode_reduces_output() {
        use super::RateLoop;

        let gains = Gains { p: 0.3, d: 0.02, ..Default::default() };
        let mut airborne = RateLoop::new();
        let mut ground = RateLoop::new();
        for step in 0..50 {
            let rate = (step as f32 * 0.3).sin() * 0.2;
            let flying = input(15.0, rate);
            let taxiing = RateInput { ground_mode: true, ..flying };
            let a = airborne.update(&gains, &flying);
            let g = ground.update(&gains, &taxiing);
            if airborne.info().p >= 0.0 && airborne.info().d >= 0.0 {
                assert!(g.abs() <= a.abs());
            }
        }
    }

    #[test]
    fn test_non_finite_input_after_warm_up() {
        use super::RateLoop;

        let gains = gains(0.2, 0.1, 0.5);
        let mut rate_loop = RateLoop::new();
        assert_eq!(rate_loop.update(&gains, &RateInput { scaler: f32::NAN, ..input(10.0, 0.0) }), 0.0);

        for _ in 0..20 {
            rate_loop.update(&gains, &input(30.0, 0.0));
        }
        let held = rate_loop.integrator();
        assert!(held > 0.0);
        let expected = (held.to_degrees() * 100.0).min(4500.0);

        let bad_gyro = RateInput { rate: f32::NAN, ..input(30.0, 0.0) };
        let bad_scaler = RateInput { scaler: f32::NAN, ..input(30.0, 0.0) };
        for bad in [bad_gyro, bad_scaler] {
            let out = rate_loop.update(&gains, &bad);
            assert!((out - expected).abs() < 1e-2);
            let info = rate_loop.info();
            assert_eq!((info.p, info.d, info.ff), (0.0, 0.0, 0.0));
            assert!(info.actual.is_finite());
            assert_eq!(rate_loop.integrator(), held);
        }

        let disabled = RateInput { disable_integrator: true, ..bad_gyro };
        assert_eq!(rate_loop.update(&gains, &disabled), 0.0);
    }
}
