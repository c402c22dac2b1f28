//! Named, independently persisted parameters.
//!
//! A [`Param`] keeps its live value and its persisted value as separate
//! atomic words, so the control thread reading a gain never observes a torn
//! value while the tuning thread writes it.

pub mod gains;
pub mod storage;

use core::{
    marker::PhantomData,
    sync::atomic::{AtomicBool, AtomicU32, Ordering},
};

use hal::persist::Persist;

pub use gains::{AxisGains, FixedWing, GainSet, Gains};
pub use storage::MemoryStorage;

/// Values a parameter may hold, each fitting in a 32-bit word
pub trait Word: Copy + PartialEq {
    fn into_bits(self) -> u32;
    fn from_bits(bits: u32) -> Self;
}

impl Word for f32 {
    fn into_bits(self) -> u32 {
        self.to_bits()
    }

    fn from_bits(bits: u32) -> Self {
        f32::from_bits(bits)
    }
}

impl Word for i16 {
    fn into_bits(self) -> u32 {
        self as u16 as u32
    }

    fn from_bits(bits: u32) -> Self {
        bits as u16 as i16
    }
}

impl Word for u8 {
    fn into_bits(self) -> u32 {
        self as u32
    }

    fn from_bits(bits: u32) -> Self {
        bits as u8
    }
}

impl Word for bool {
    fn into_bits(self) -> u32 {
        self as u32
    }

    fn from_bits(bits: u32) -> Self {
        bits != 0
    }
}

pub struct Param<T> {
    name: &'static str,
    default: T,
    live: AtomicU32,
    persisted: AtomicU32,
    configured: AtomicBool,
    _type: PhantomData<T>,
}

impl<T: Word> Param<T> {
    pub fn new(name: &'static str, default: T) -> Self {
        let bits = default.into_bits();
        Self {
            name,
            default,
            live: AtomicU32::new(bits),
            persisted: AtomicU32::new(bits),
            configured: AtomicBool::new(false),
            _type: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn get(&self) -> T {
        T::from_bits(self.live.load(Ordering::Relaxed))
    }

    /// Changes the live value only, the persisted value is left untouched
    #[inline]
    pub fn set(&self, value: T) {
        self.live.store(value.into_bits(), Ordering::Relaxed);
    }

    pub fn persisted(&self) -> T {
        T::from_bits(self.persisted.load(Ordering::Relaxed))
    }

    pub fn configured(&self) -> bool {
        self.configured.load(Ordering::Relaxed)
    }

    pub fn save(&self, backend: &dyn Persist) {
        let bits = self.live.load(Ordering::Relaxed);
        self.persisted.store(bits, Ordering::Relaxed);
        self.configured.store(true, Ordering::Relaxed);
        backend.write(self.name, bits);
    }

    pub fn set_and_save(&self, value: T, backend: &dyn Persist) {
        self.set(value);
        self.save(backend);
    }

    /// Discards the live value in favour of the last persisted one
    pub fn reload(&self) {
        self.live.store(self.persisted.load(Ordering::Relaxed), Ordering::Relaxed);
    }

    /// Boot-time load; a parameter absent from the backend keeps its default
    pub fn restore(&self, backend: &dyn Persist) {
        let (bits, configured) = match backend.read(self.name) {
            Some(bits) => (bits, true),
            None => (self.default.into_bits(), false),
        };
        self.persisted.store(bits, Ordering::Relaxed);
        self.live.store(bits, Ordering::Relaxed);
        self.configured.store(configured, Ordering::Relaxed);
    }
}

impl<T: Word + core::fmt::Debug> core::fmt::Debug for Param<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}={:?}", self.name, self.get())
    }
}

impl<T: Word + serde::Serialize> serde::Serialize for Param<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.get().serialize(serializer)
    }
}

/// Type-erased view used when walking every parameter of a group
pub trait Entry {
    fn name(&self) -> &'static str;
    fn save(&self, backend: &dyn Persist);
    fn restore(&self, backend: &dyn Persist);
    fn reload(&self);
}

impl<T: Word> Entry for Param<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn save(&self, backend: &dyn Persist) {
        Param::save(self, backend)
    }

    fn restore(&self, backend: &dyn Persist) {
        Param::restore(self, backend)
    }

    fn reload(&self) {
        Param::reload(self)
    }
}

pub trait Visit {
    fn visit(&self, f: &mut dyn FnMut(&dyn Entry));
}

#[cfg(test)]
mod test {
    #[test]
    fn test_param_save_reload() {
        use super::{MemoryStorage, Param};

        let storage = MemoryStorage::new();
        let param = Param::new("RLL_RATE_P", 0.08f32);
        assert!(!param.configured());

        param.set(0.2);
        assert_eq!(param.get(), 0.2);
        assert_eq!(param.persisted(), 0.08);
        param.reload();
        assert_eq!(param.get(), 0.08);

        param.set(0.3);
        param.save(&storage);
        assert!(param.configured());
        param.set(0.5);
        param.reload();
        assert_eq!(param.get(), 0.3);
        assert_eq!(hal::persist::Persist::read(&storage, "RLL_RATE_P"), Some(0.3f32.to_bits()));
    }

    #[test]
    fn test_param_restore() {
        use hal::persist::Persist;

        use super::{MemoryStorage, Param};

        let storage = MemoryStorage::new();
        storage.write("TUNE_PARMSET", (-5i16) as u16 as u32);
        let parmset = Param::new("TUNE_PARMSET", 0i16);
        parmset.restore(&storage);
        assert_eq!(parmset.get(), -5);
        assert!(parmset.configured());

        let revert = Param::new("TUNE_MODE_REVERT", true);
        revert.set(false);
        revert.restore(&storage);
        assert_eq!(revert.get(), true);
        assert!(!revert.configured());
    }
}
