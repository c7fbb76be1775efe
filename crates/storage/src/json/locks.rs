use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async lock per data file, so read-modify-write cycles on the same
/// file never interleave while different users proceed independently.
///
/// Entries nobody holds or waits on are dropped whenever a lock is taken.
#[derive(Clone, Default)]
pub(super) struct FileLocks {
    table: Arc<Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>>,
}

impl FileLocks {
    pub(super) async fn lock(&self, path: &Path) -> OwnedMutexGuard<()> {
        let entry = {
            let mut table = self
                .table
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            table.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(table.entry(path.to_path_buf()).or_default())
        };
        entry.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_path_shares_a_lock() {
        let locks = FileLocks::default();
        let path = Path::new("/tmp/a.json");
        let guard = locks.lock(path).await;
        let table = locks.table.lock().unwrap();
        let lock = table.get(path).unwrap();
        assert!(lock.try_lock().is_err());
        drop(table);
        drop(guard);
    }

    #[tokio::test]
    async fn idle_entries_are_pruned() {
        let locks = FileLocks::default();
        drop(locks.lock(Path::new("/tmp/a.json")).await);
        let held = locks.lock(Path::new("/tmp/b.json")).await;
        let _c = locks.lock(Path::new("/tmp/c.json")).await;

        let table = locks.table.lock().unwrap();
        assert!(!table.contains_key(Path::new("/tmp/a.json")));
        assert!(table.contains_key(Path::new("/tmp/b.json")));
        assert_eq!(table.len(), 2);
        drop(table);
        drop(held);
    }

    #[tokio::test]
    async fn different_paths_do_not_contend() {
        let locks = FileLocks::default();
        let _a = locks.lock(Path::new("/tmp/a.json")).await;
        let _b = locks.lock(Path::new("/tmp/b.json")).await;
    }
}
