use alloc::boxed::Box;
use alloc::sync::Arc;

use crate::config::Parameters;
use crate::types::{control::Axis, pid::PidInfo};

/// Gain search running alongside one axis controller.
///
/// The coordinator receives the rate loop diagnostics each tick while it
/// exists and may write gains through the parameters it was created with.
pub trait AutoTune: Send {
    fn start(&mut self);

    fn stop(&mut self);

    /// `angle_error` in degrees, zero when flying on rate demands
    fn update(&mut self, info: &PidInfo, scaler: f32, angle_error: f32);
}

pub trait AutoTuneFactory: Send + Sync {
    /// `None` when the coordinator cannot be allocated
    fn create(&self, axis: Axis, parameters: Arc<Parameters>) -> Option<Box<dyn AutoTune>>;
}

impl<F> AutoTuneFactory for F
where
    F: Fn(Axis, Arc<Parameters>) -> Option<Box<dyn AutoTune>> + Send + Sync,
{
    fn create(&self, axis: Axis, parameters: Arc<Parameters>) -> Option<Box<dyn AutoTune>> {
        self(axis, parameters)
    }
}
