//! PID core shared by the angle and rate loops.
//!
//! Gains are passed in on every update so that a value written by the
//! tuning thread takes effect on the next tick without any handshake.

use crate::algorithm::lpf::alpha;
use crate::algorithm::SlewLimiter;
use crate::params::Gains;
use crate::types::pid::PidInfo;

#[derive(Clone, Debug, Default)]
pub struct Pid {
    target: f32,
    error: f32,
    derivative: f32,
    integrator: f32,
    primed: bool,
    slew_limiter: SlewLimiter,
    info: PidInfo,
}

impl Pid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the loop on a target and a measurement, returning P + I + D.
    ///
    /// `limit` freezes integration in the direction of saturation, and
    /// `slew_scale` converts P + D into the units `smax` is expressed in.
    pub fn update_all(
        &mut self,
        gains: &Gains,
        target: f32,
        measurement: f32,
        dt: f32,
        limit: bool,
        slew_scale: f32,
    ) -> f32 {
        if !target.is_finite() || !measurement.is_finite() {
            return self.hold();
        }

        if !self.primed {
            self.primed = true;
            self.target = target;
            self.error = target - measurement;
            self.derivative = 0.0;
        } else {
            let last_error = self.error;
            self.target += alpha(dt, gains.fltt) * (target - self.target);
            self.error += alpha(dt, gains.flte) * ((self.target - measurement) - self.error);
            self.filter_derivative(gains, last_error, dt);
        }
        self.info.target = self.target;
        self.info.actual = measurement;
        self.output(gains, dt, limit, slew_scale)
    }

    /// Same as [`Pid::update_all`] with an error computed elsewhere, target is zero
    pub fn update_error(&mut self, gains: &Gains, error: f32, dt: f32, limit: bool) -> f32 {
        if !error.is_finite() {
            return self.hold();
        }

        self.target = 0.0;
        if !self.primed {
            self.primed = true;
            self.error = error;
            self.derivative = 0.0;
        } else {
            let last_error = self.error;
            self.error += alpha(dt, gains.flte) * (error - self.error);
            self.filter_derivative(gains, last_error, dt);
        }
        self.info.target = 0.0;
        self.info.actual = -error;
        self.output(gains, dt, limit, 1.0)
    }

    /// Unusable input contributes nothing, the integrator is kept as it was
    fn hold(&mut self) -> f32 {
        self.info = PidInfo { i: self.integrator, d_mod: 1.0, ..Default::default() };
        self.integrator
    }

    fn filter_derivative(&mut self, gains: &Gains, last_error: f32, dt: f32) {
        if dt > 0.0 {
            let derivative = (self.error - last_error) / dt;
            self.derivative += alpha(dt, gains.fltd) * (derivative - self.derivative);
        }
    }

    fn output(&mut self, gains: &Gains, dt: f32, limit: bool, slew_scale: f32) -> f32 {
        self.update_i(gains, dt, limit);

        let mut p = self.error * gains.p;
        let mut d = self.derivative * gains.d;
        let d_mod = self.slew_limiter.modifier((p + d) * slew_scale, gains.smax, dt);
        p *= d_mod;
        d *= d_mod;

        self.info.error = self.error;
        self.info.p = p;
        self.info.d = d;
        self.info.d_mod = d_mod;
        self.info.slew_rate = self.slew_limiter.slew_rate();
        self.info.limit = limit;
        p + self.integrator + d
    }

    fn update_i(&mut self, gains: &Gains, dt: f32, limit: bool) {
        if gains.i > 0.0 && dt > 0.0 {
            let unwinding = (self.integrator > 0.0 && self.error < 0.0)
                || (self.integrator < 0.0 && self.error > 0.0);
            if !limit || unwinding {
                let integrator = self.integrator + self.error * gains.i * dt;
                self.integrator = integrator.max(-gains.imax).min(gains.imax);
            }
        } else {
            self.integrator = 0.0;
        }
        self.info.i = self.integrator;
    }

    /// Feed-forward on the filtered target
    pub fn ff(&mut self, gains: &Gains) -> f32 {
        self.info.ff = self.target * gains.ff;
        self.info.ff
    }

    pub fn integrator(&self) -> f32 {
        self.integrator
    }

    pub fn set_integrator(&mut self, value: f32, imax: f32) {
        if value.is_finite() {
            self.integrator = value.max(-imax).min(imax);
            self.info.i = self.integrator;
        }
    }

    /// Decays the integrator toward `value` with time constant `tc` seconds
    pub fn relax_integrator(&mut self, value: f32, dt: f32, tc: f32) {
        if dt > 0.0 && tc > 0.0 && value.is_finite() {
            self.integrator += (value - self.integrator) * (dt / (dt + tc));
            self.info.i = self.integrator;
        }
    }

    pub fn reset_i(&mut self) {
        self.integrator = 0.0;
        self.info.i = 0.0;
    }

    pub fn info(&self) -> &PidInfo {
        &self.info
    }
}
