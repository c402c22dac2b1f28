use core::sync::atomic::{AtomicUsize, Ordering};

use hal::persist::Persist;
use heapless::{FnvIndexMap, String};

const MAX_KEY_LENGTH: usize = 24;
const CAPACITY: usize = 64;

type Key = String<MAX_KEY_LENGTH>;

fn key(name: &str) -> Option<Key> {
    let mut key = Key::new();
    key.push_str(name).ok()?;
    Some(key)
}

/// RAM backed parameter store, for simulation and tests
#[derive(Default)]
pub struct MemoryStorage {
    words: spin::Mutex<FnvIndexMap<Key, u32, CAPACITY>>,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.words.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Persist for MemoryStorage {
    fn read(&self, name: &str) -> Option<u32> {
        let key = key(name)?;
        self.words.lock().get(&key).copied()
    }

    fn write(&self, name: &str, bits: u32) {
        let key = match key(name) {
            Some(key) => key,
            None => {
                error!("Parameter name {} too long", name);
                return;
            }
        };
        if self.words.lock().insert(key, bits).is_err() {
            error!("Parameter storage full, {} not saved", name);
            return;
        }
        self.writes.fetch_add(1, Ordering::Relaxed);
    }
}

mod test {
    #[test]
    fn test_memory_storage() {
        use hal::persist::Persist;

        use super::MemoryStorage;

        let storage = MemoryStorage::new();
        assert!(storage.is_empty());
        assert_eq!(storage.read("TUNE_CHAN"), None);
        storage.write("TUNE_CHAN", 6);
        storage.write("TUNE_CHAN", 7);
        assert_eq!(storage.read("TUNE_CHAN"), Some(7));
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.writes(), 2);

        storage.write("A_PARAMETER_NAME_FAR_TOO_LONG", 1);
        assert_eq!(storage.writes(), 2);
    }
}
