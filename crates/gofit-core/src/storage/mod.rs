//! Storage layer
//!
//! ## Architecture
//!
//! - **Backend**: blocking key/value text storage (SQLite or memory)
//! - **KvStore**: async adapter that serializes values as JSON
//! - **WorkoutStorage**: the six fixed collections, one key each
//!
//! Every read-modify-write of a collection runs under that collection's
//! key lock, so concurrent writers never clobber each other.

pub mod backend;
pub mod collections;
pub mod error;
pub mod kv;
pub mod schema;

pub use backend::{KvBackend, MemoryBackend, SqliteBackend};
pub use collections::{Snapshot, StorageKey, WorkoutStorage};
pub use error::{StorageError, StorageResult};
pub use kv::KvStore;
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::{io, thread, time::Duration};

    use super::backend::{KvBackend, MemoryBackend};
    use super::error::{StorageError, StorageResult};

    /// Memory backend that can be switched into failing calls
    #[derive(Default)]
    pub struct FlakyBackend {
        inner: MemoryBackend,
        failing: AtomicBool,
        reads_to_fail: AtomicUsize,
        slow_reads: AtomicBool,
    }

    impl FlakyBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Fail the next `count` reads while writes keep working
        pub fn fail_next_reads(&self, count: usize) {
            self.reads_to_fail.store(count, Ordering::SeqCst);
        }

        /// Hold every read for a moment after it returns its value, so
        /// overlapping callers act on what they read before others commit
        pub fn slow_reads(&self, slow: bool) {
            self.slow_reads.store(slow, Ordering::SeqCst);
        }

        /// The wrapped backend, for planting raw values
        pub fn inner(&self) -> &MemoryBackend {
            &self.inner
        }

        fn check(&self) -> StorageResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StorageError::Io(io::Error::new(
                    io::ErrorKind::Other,
                    "simulated device failure",
                )));
            }
            Ok(())
        }
    }

    impl KvBackend for FlakyBackend {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.check()?;
            let pending = self.reads_to_fail.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                n.checked_sub(1)
            });
            if pending.is_ok() {
                return Err(StorageError::Io(io::Error::new(
                    io::ErrorKind::Other,
                    "simulated read failure",
                )));
            }
            let value = self.inner.get(key)?;
            if self.slow_reads.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(20));
            }
            Ok(value)
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            self.check()?;
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            self.check()?;
            self.inner.remove(key)
        }

        fn clear(&self) -> StorageResult<()> {
            self.check()?;
            self.inner.clear()
        }

        fn keys(&self) -> StorageResult<Vec<String>> {
            self.check()?;
            self.inner.keys()
        }
    }
}
