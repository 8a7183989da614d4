// src/dataset/store.rs
use crate::dataset::loader::load_listings;
use crate::dataset::snapshot::DatasetSnapshot;
use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{info, warn};

/// Shared handle to the current dataset snapshot.
///
/// Readers get an `Arc` to a complete snapshot. When the backing file's
/// modification time changes, the next reader builds a fresh snapshot and
/// publishes it with a single swap.
pub struct DatasetStore {
    path: Option<PathBuf>,
    current: ArcSwap<DatasetSnapshot>,
}

impl DatasetStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let snapshot = build_snapshot(&path);
        Self {
            path: Some(path),
            current: ArcSwap::new(Arc::new(snapshot)),
        }
    }

    /// A store over fixed rows with no file behind it.
    pub fn from_snapshot(snapshot: DatasetSnapshot) -> Self {
        Self {
            path: None,
            current: ArcSwap::new(Arc::new(snapshot)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn snapshot(&self) -> Arc<DatasetSnapshot> {
        let current = self.current.load_full();
        let Some(path) = &self.path else {
            return current;
        };

        if modified(path) == current.marker() {
            return current;
        }
        self.reload()
    }

    /// Rebuilds from the file unconditionally.
    pub fn reload(&self) -> Arc<DatasetSnapshot> {
        let Some(path) = &self.path else {
            return self.current.load_full();
        };

        let fresh = Arc::new(build_snapshot(path));
        self.current.store(Arc::clone(&fresh));
        fresh
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn build_snapshot(path: &Path) -> DatasetSnapshot {
    let Some(marker) = modified(path) else {
        warn!(path = %path.display(), "dataset file not found, serving empty dataset");
        return DatasetSnapshot::empty();
    };

    match load_listings(path) {
        Ok(loaded) => {
            info!(
                path = %path.display(),
                rows = loaded.rows.len(),
                skipped = loaded.skipped,
                "loaded comparable listings"
            );
            DatasetSnapshot::new(loaded.rows, Some(marker), loaded.skipped)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load dataset, serving empty dataset");
            DatasetSnapshot::new(Vec::new(), Some(marker), 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, UNIX_EPOCH};

    fn temp_csv(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("str_economics_{tag}_{nanos}.csv"))
    }

    #[test]
    fn missing_file_serves_empty_snapshot() {
        let store = DatasetStore::open(temp_csv("missing"));
        let snap = store.snapshot();
        assert!(snap.is_empty());
        assert!(snap.marker().is_none());
    }

    #[test]
    fn reloads_when_file_changes() {
        let path = temp_csv("reload");
        fs::write(&path, "airbnb_id,building,unit_type\n1,Palm Tower,Studio\n").unwrap();

        let store = DatasetStore::open(&path);
        let first = store.snapshot();
        assert_eq!(first.rows().len(), 1);

        // Same marker: the published snapshot is handed back as-is.
        assert!(Arc::ptr_eq(&first, &store.snapshot()));

        fs::write(
            &path,
            "airbnb_id,building,unit_type\n1,Palm Tower,Studio\n2,Palm Tower,1BR\n",
        )
        .unwrap();
        let bumped = first.marker().unwrap() + Duration::from_secs(5);
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(bumped)
            .unwrap();

        let second = store.snapshot();
        assert_eq!(second.rows().len(), 2);
        assert_eq!(first.rows().len(), 1);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn fixed_snapshot_never_reloads() {
        let store = DatasetStore::from_snapshot(DatasetSnapshot::empty());
        assert!(store.path().is_none());
        assert!(Arc::ptr_eq(&store.snapshot(), &store.reload()));
    }
}
