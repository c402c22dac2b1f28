use super::pid::Pid;
use crate::params::Gains;
use crate::types::measurement::{centi_to_degrees, CentiDegrees};
use crate::types::pid::PidInfo;

/// Error in degrees beyond which the integrator is relaxed before the update
const RELAX_THRESHOLD: f32 = 2.0;
/// Relax time constant in seconds
const RELAX_TC: f32 = 0.1;

/// Outer loop, attitude error to desired body rate in deg/s
#[derive(Clone, Debug, Default)]
pub struct AngleLoop {
    pid: Pid,
    info: PidInfo,
}

impl AngleLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(
        &mut self,
        gains: &Gains,
        target: CentiDegrees,
        measured: CentiDegrees,
        dt: f32,
        disable_integrator: bool,
    ) -> f32 {
        let target = centi_to_degrees(target);
        let measured = centi_to_degrees(measured);
        self.relax(target - measured, dt);
        self.pid.update_all(gains, target, measured, dt, false, 1.0);
        self.finish(disable_integrator, target, measured)
    }

    /// Same as [`AngleLoop::update`] with an error a supervisory layer computed,
    /// `target` and `measured` only feed the diagnostics
    pub fn update_error(
        &mut self,
        gains: &Gains,
        error: CentiDegrees,
        target: CentiDegrees,
        measured: CentiDegrees,
        dt: f32,
        disable_integrator: bool,
    ) -> f32 {
        let error = centi_to_degrees(error);
        self.relax(error, dt);
        self.pid.update_error(gains, error, dt, false);
        match target {
            0 => self.finish(disable_integrator, 0.0, 0.0),
            _ => self.finish(disable_integrator, centi_to_degrees(target), centi_to_degrees(measured)),
        }
    }

    fn relax(&mut self, error: f32, dt: f32) {
        if error > RELAX_THRESHOLD {
            self.pid.relax_integrator(0.0, dt, RELAX_TC);
        }
    }

    fn finish(&mut self, disable_integrator: bool, target: f32, actual: f32) -> f32 {
        if disable_integrator {
            self.pid.reset_i();
        }
        let mut info = *self.pid.info();
        info.target = target;
        info.actual = actual;
        self.info = info;
        let desired_rate = info.p + info.i + info.d;
        if desired_rate.is_finite() {
            desired_rate
        } else {
            0.0
        }
    }

    pub fn info(&self) -> &PidInfo {
        &self.info
    }

    pub fn integrator(&self) -> f32 {
        self.pid.integrator()
    }

    pub fn reset_i(&mut self) {
        self.pid.reset_i();
        self.info = PidInfo::default();
    }
}
