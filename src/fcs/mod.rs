//! Per axis attitude controller.
//!
//! Sequences angle loop, rate clamp and rate loop once per control tick.
//! The estimator is the only shared state read here, under a single lock.

pub mod angle;
pub mod autotune;
pub mod pid;
pub mod rate;

use alloc::boxed::Box;
use alloc::sync::Arc;

use hal::persist::Persist;
use hal::scheduler::LoopPeriod;

use crate::ahrs::Estimator;
use crate::config::Parameters;
use crate::params::AxisGains;
use crate::types::control::{Axis, Deflection, Demand};
use crate::types::measurement::{centi_to_degrees, CentiDegrees};
use crate::types::pid::PidInfo;
use angle::AngleLoop;
use autotune::{AutoTune, AutoTuneFactory};
use rate::{RateInput, RateLoop};

/// Angle loop gains overridden while autotune runs
#[derive(Copy, Clone, Debug)]
struct AngleBackup {
    i: f32,
    d: f32,
    fltt: f32,
    fltd: f32,
}

pub struct AttitudeController<E, S> {
    axis: Axis,
    parameters: Arc<Parameters>,
    estimator: E,
    scheduler: S,
    angle: AngleLoop,
    rate: RateLoop,
    autotune_factory: Option<Box<dyn AutoTuneFactory>>,
    autotune: Option<Box<dyn AutoTune>>,
    autotune_failed: bool,
    backup: Option<AngleBackup>,
}

impl<E: Estimator, S: LoopPeriod> AttitudeController<E, S> {
    pub fn new(axis: Axis, parameters: Arc<Parameters>, estimator: E, scheduler: S) -> Self {
        Self {
            axis,
            parameters,
            estimator,
            scheduler,
            angle: AngleLoop::new(),
            rate: RateLoop::new(),
            autotune_factory: None,
            autotune: None,
            autotune_failed: false,
            backup: None,
        }
    }

    pub fn with_autotune(mut self, factory: impl AutoTuneFactory + 'static) -> Self {
        self.autotune_factory = Some(Box::new(factory));
        self
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn parameters(&self) -> &Arc<Parameters> {
        &self.parameters
    }

    pub fn gains(&self) -> &AxisGains {
        self.parameters.axis(self.axis)
    }

    /// Runs one control tick, never fails and always returns a deflection within ±4500
    pub fn compute(
        &mut self,
        demand: Demand,
        scaler: f32,
        disable_integrator: bool,
        ground_mode: bool,
    ) -> Deflection {
        let sample = self.estimator.sample(self.axis);
        let dt = self.scheduler.loop_period_s();
        let gains = self.parameters.axis(self.axis);

        let (desired_rate, angle_error) = match demand {
            Demand::Angle(target) => {
                let angle_gains = gains.angle.load();
                let rate =
                    self.angle.update(&angle_gains, target, sample.attitude, dt, disable_integrator);
                (rate, centi_to_degrees(target.saturating_sub(sample.attitude)))
            }
            Demand::AngleError { error, target } => {
                let angle_gains = gains.angle.load();
                let measured = sample.attitude;
                let rate = self.angle.update_error(
                    &angle_gains,
                    error,
                    target,
                    measured,
                    dt,
                    disable_integrator,
                );
                (rate, centi_to_degrees(error))
            }
            Demand::Rate(rate) => (rate, 0.0),
        };

        let rmax = gains.rmax();
        let desired_rate =
            if rmax > 0.0 { desired_rate.max(-rmax).min(rmax) } else { desired_rate };

        let input = RateInput {
            desired_rate,
            rate: sample.rate,
            scaler,
            eas2tas: sample.eas2tas,
            airspeed: sample.airspeed,
            airspeed_min: self.parameters.fixed_wing.airspeed_min.get(),
            disable_integrator,
            ground_mode,
            dt,
        };
        let out = self.rate.update(&gains.rate.load(), &input);

        if let Some(autotune) = self.autotune.as_mut() {
            if !input.underspeed() {
                autotune.update(self.rate.info(), scaler, angle_error);
            }
        }
        out
    }

    pub fn servo_out_using_angle_target(
        &mut self,
        target: CentiDegrees,
        scaler: f32,
        disable_integrator: bool,
        ground_mode: bool,
    ) -> Deflection {
        self.compute(Demand::Angle(target), scaler, disable_integrator, ground_mode)
    }

    pub fn servo_out_using_angle_error(
        &mut self,
        error: CentiDegrees,
        target: CentiDegrees,
        scaler: f32,
        disable_integrator: bool,
        ground_mode: bool,
    ) -> Deflection {
        let demand = Demand::AngleError { error, target };
        self.compute(demand, scaler, disable_integrator, ground_mode)
    }

    /// Rate only modes, bypasses the angle loop
    pub fn rate_out(&mut self, desired_rate: f32, scaler: f32) -> Deflection {
        self.compute(Demand::Rate(desired_rate), scaler, false, false)
    }

    pub fn reset_i(&mut self) {
        self.angle.reset_i();
        self.rate.reset_i();
    }

    pub fn angle_info(&self) -> &PidInfo {
        self.angle.info()
    }

    pub fn rate_info(&self) -> &PidInfo {
        self.rate.info()
    }

    pub fn autotune_running(&self) -> bool {
        self.autotune.is_some()
    }

    pub fn autotune_start(&mut self) {
        if self.autotune.is_none() {
            let created = match self.autotune_factory.as_ref() {
                Some(factory) => factory.create(self.axis, self.parameters.clone()),
                None => None,
            };
            match created {
                Some(autotune) => self.autotune = Some(autotune),
                None => {
                    if !self.autotune_failed {
                        error!("AutoTune: failed {} allocation", self.axis);
                        self.autotune_failed = true;
                    }
                    return;
                }
            }
        }

        let angle = &self.parameters.axis(self.axis).angle;
        if self.backup.is_none() {
            self.backup = Some(AngleBackup {
                i: angle.i.get(),
                d: angle.d.get(),
                fltt: angle.fltt.get(),
                fltd: angle.fltd.get(),
            });
        }
        angle.i.set(0.0);
        angle.d.set(0.0);
        angle.fltt.set(0.0);

        if let Some(autotune) = self.autotune.as_mut() {
            autotune.start();
        }
        info!("AutoTune: {} started", self.axis);
    }

    /// Stops autotune and puts back the angle loop gains it displaced
    pub fn autotune_restore(&mut self) {
        if let Some(mut autotune) = self.autotune.take() {
            autotune.stop();
            info!("AutoTune: {} stopped", self.axis);
        }
        if let Some(backup) = self.backup.take() {
            let angle = &self.parameters.axis(self.axis).angle;
            angle.i.set(backup.i);
            angle.d.set(backup.d);
            angle.fltt.set(backup.fltt);
            angle.fltd.set(backup.fltd);
        }
    }

    /// Derives the angle P gain from a time constant saved by older firmware
    pub fn convert_legacy_gains(&self, backend: &dyn Persist) {
        let angle_p = &self.parameters.axis(self.axis).angle.p;
        if angle_p.configured() {
            return;
        }
        let key = match self.axis {
            Axis::Roll => "RLL2SRV_TCONST",
            Axis::Pitch => "PTCH2SRV_TCONST",
        };
        let tconst = match backend.read(key) {
            Some(bits) => f32::from_bits(bits),
            None => return,
        };
        if !(tconst > 0.0) || !tconst.is_finite() {
            return;
        }
        angle_p.set_and_save(1.0 / tconst, backend);
        info!("Converted {} to {}={}", key, angle_p.name(), angle_p.get());
    }
}
