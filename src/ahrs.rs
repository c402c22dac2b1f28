//! Attitude estimator state as seen by the controllers.
//!
//! The estimator owns an [`Estimate`] behind a spin lock and refreshes it at
//! its own rate. Controllers copy out the few scalars they need under one
//! lock and never compute while holding it.

use alloc::sync::Arc;

use nalgebra::Vector3;

use crate::types::{control::Axis, measurement::CentiDegrees};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Estimate {
    pub roll_sensor: CentiDegrees,
    pub pitch_sensor: CentiDegrees,
    /// Body rates in rad/s
    pub gyro: Vector3<f32>,
    /// Equivalent to true airspeed ratio
    pub eas2tas: f32,
    /// Airspeed in m/s, `None` when no estimate is available
    pub airspeed: Option<f32>,
}

impl Default for Estimate {
    fn default() -> Self {
        Self {
            roll_sensor: 0,
            pitch_sensor: 0,
            gyro: Vector3::zeros(),
            eas2tas: 1.0,
            airspeed: None,
        }
    }
}

pub type SharedEstimate = spin::Mutex<Estimate>;

/// Scalars one axis controller needs for a tick
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AxisSample {
    pub attitude: CentiDegrees,
    /// rad/s
    pub rate: f32,
    pub eas2tas: f32,
    /// m/s, zero when unknown
    pub airspeed: f32,
}

pub trait Estimator {
    fn lock(&self) -> spin::MutexGuard<'_, Estimate>;

    fn sample(&self, axis: Axis) -> AxisSample {
        let estimate = self.lock();
        let (attitude, rate) = match axis {
            Axis::Roll => (estimate.roll_sensor, estimate.gyro.x),
            Axis::Pitch => (estimate.pitch_sensor, estimate.gyro.y),
        };
        AxisSample {
            attitude,
            rate,
            eas2tas: estimate.eas2tas,
            airspeed: estimate.airspeed.unwrap_or(0.0),
        }
    }
}

impl Estimator for SharedEstimate {
    fn lock(&self) -> spin::MutexGuard<'_, Estimate> {
        spin::Mutex::lock(self)
    }
}

impl<T: Estimator + ?Sized> Estimator for &T {
    fn lock(&self) -> spin::MutexGuard<'_, Estimate> {
        (**self).lock()
    }
}

impl<T: Estimator + ?Sized> Estimator for Arc<T> {
    fn lock(&self) -> spin::MutexGuard<'_, Estimate> {
        (**self).lock()
    }
}

mod test {
    #[test]
    fn test_sample() {
        use nalgebra::Vector3;

        use super::{Estimate, Estimator, SharedEstimate};
        use crate::types::control::Axis;

        let shared = SharedEstimate::new(Estimate {
            roll_sensor: 1500,
            pitch_sensor: -300,
            gyro: Vector3::new(0.1, -0.2, 0.3),
            eas2tas: 1.05,
            airspeed: None,
        });
        let roll = shared.sample(Axis::Roll);
        assert_eq!(roll.attitude, 1500);
        assert_eq!(roll.rate, 0.1);
        assert_eq!(roll.airspeed, 0.0);

        shared.lock().airspeed = Some(17.0);
        let pitch = (&shared).sample(Axis::Pitch);
        assert_eq!(pitch.attitude, -300);
        assert_eq!(pitch.rate, -0.2);
        assert_eq!(pitch.eas2tas, 1.05);
        assert_eq!(pitch.airspeed, 17.0);
    }
}
