use core::sync::atomic::{AtomicU32, Ordering};

/// Monotonic time since boot
pub type Millis = fugit::MillisDurationU32;

pub trait Clock: Sync {
    fn now(&self) -> Millis;
}

/// Clock advanced by its owner, for simulation and tests
#[derive(Default)]
pub struct ManualClock(AtomicU32);

impl ManualClock {
    pub const fn new(millis: u32) -> Self {
        Self(AtomicU32::new(millis))
    }

    pub fn advance(&self, millis: u32) {
        self.0.fetch_add(millis, Ordering::Relaxed);
    }

    pub fn set(&self, millis: u32) {
        self.0.store(millis, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        Millis::millis(self.0.load(Ordering::Relaxed))
    }
}
