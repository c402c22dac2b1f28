pub trait LoopPeriod {
    /// Period of the running control loop, re-read every tick since it may jitter
    fn loop_period_s(&self) -> f32;
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FixedPeriod(pub f32);

impl FixedPeriod {
    pub fn from_rate(rate_hz: u16) -> Self {
        Self(1.0 / rate_hz as f32)
    }
}

impl LoopPeriod for FixedPeriod {
    fn loop_period_s(&self) -> f32 {
        self.0
    }
}

impl<T: LoopPeriod + ?Sized> LoopPeriod for &T {
    fn loop_period_s(&self) -> f32 {
        (**self).loop_period_s()
    }
}
