/// Key-value store holding persisted parameter words.
///
/// Every parameter is persisted independently under its own name, a write
/// must replace the whole word or nothing.
pub trait Persist: Sync {
    fn read(&self, key: &str) -> Option<u32>;
    fn write(&self, key: &str, bits: u32);
}

pub struct NoPersist;

impl Persist for NoPersist {
    fn read(&self, _: &str) -> Option<u32> {
        None
    }

    fn write(&self, _: &str, _: u32) {}
}
