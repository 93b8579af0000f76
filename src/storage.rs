use log::error;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::planner::RouteCollection;
use crate::route::{RouteRecord, RouteSummary};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Route not found: {0}")]
    NotFound(String),
    #[error("Route already stored: {0}")]
    Duplicate(String),
}

/// Saved routes, one YAML file per route under a base folder.
pub struct RouteStore {
    base: PathBuf,
}

impl RouteStore {
    pub fn new(base: PathBuf) -> Self {
        RouteStore { base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn route_path(&self, name: &str) -> PathBuf {
        self.base.join(format!("{}.yaml", file_stem(name)))
    }

    pub fn save(&self, record: &RouteRecord) -> Result<PathBuf, StorageError> {
        let path = self.route_path(record.name());
        if path.exists() {
            return Err(StorageError::Duplicate(record.name().to_string()));
        }

        std::fs::create_dir_all(&self.base)?;
        let content = serde_yaml::to_string(record)?;
        std::fs::write(&path, content)?;
        log::info!("Saved route {} to {}", record.name(), path.display());
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<RouteRecord, StorageError> {
        let path = self.route_path(name);
        if !path.exists() {
            return Err(StorageError::NotFound(name.to_string()));
        }

        let content = std::fs::read_to_string(&path)?;
        let record: RouteRecord = serde_yaml::from_str(&content)?;
        // "a/b" and "a_b" share a file; only the route it holds is found there
        if record.name() != name {
            return Err(StorageError::NotFound(name.to_string()));
        }
        Ok(record)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.load(name).is_ok()
    }

    /// Every readable route, oldest departure first. Files that fail to load
    /// are logged and skipped.
    pub fn load_all(&self) -> Result<Vec<RouteRecord>, StorageError> {
        if !self.base.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in self.base.read_dir()? {
            let entry = entry?;
            let entry_path = entry.path();

            if !entry_path.is_file() || entry_path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }

            let content = match std::fs::read_to_string(&entry_path) {
                Ok(content) => content,
                Err(e) => {
                    error!("Failed to read route file {}: {}", entry_path.display(), e);
                    continue;
                }
            };

            match serde_yaml::from_str::<RouteRecord>(&content) {
                Ok(record) => records.push(record),
                Err(e) => {
                    error!("Failed to parse route {}: {}", entry_path.display(), e);
                    continue;
                }
            }
        }

        records.sort_by(|a, b| a.start_time().cmp(&b.start_time()).then_with(|| a.name().cmp(b.name())));
        Ok(records)
    }

    pub fn list(&self) -> Result<Vec<RouteSummary>, StorageError> {
        Ok(self.load_all()?.iter().map(RouteRecord::summary).collect())
    }

    pub fn collection(&self) -> Result<RouteCollection, StorageError> {
        let mut collection = RouteCollection::new();
        collection.extend(self.load_all()?);
        Ok(collection)
    }

    pub fn delete(&self, name: &str) -> Result<(), StorageError> {
        self.load(name)?;
        let path = self.route_path(name);
        std::fs::remove_file(&path)?;
        log::info!("Deleted route {} ({})", name, path.display());
        Ok(())
    }

    /// Removes every stored route and returns how many were removed.
    pub fn clear(&self) -> Result<usize, StorageError> {
        if !self.base.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in self.base.read_dir()? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("yaml") {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
        log::info!("Cleared {} routes from {}", removed, self.base.display());
        Ok(removed)
    }
}

fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::current::NoCurrent;
    use crate::navigation::RhumbLine;
    use crate::planner::{Projection, RouteProjector};
    use crate::route::{RouteMode, Waypoint};
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn dir() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    fn route(name: &str, day: u32) -> RouteRecord {
        let waypoints = vec![Waypoint::new("A", 50.0, -1.0), Waypoint::new("B", 50.2, -1.3)];
        RouteProjector::new(&RhumbLine, &NoCurrent)
            .project(&Projection {
                name: name.into(),
                mode: RouteMode::Dr,
                waypoints: &waypoints,
                start_time: Utc.with_ymd_and_hms(2024, 3, day, 8, 0, 0).unwrap(),
                speed: 5.0,
            })
            .unwrap()
    }

    #[rstest]
    fn save_then_load(dir: TempDir) {
        let store = RouteStore::new(dir.path().join("routes"));
        let record = route("solent.DR", 1);

        let path = store.save(&record).unwrap();

        assert_eq!(path, dir.path().join("routes").join("solent.DR.yaml"));
        assert_eq!(store.load("solent.DR").unwrap(), record);
        assert!(store.contains("solent.DR"));
    }

    #[rstest]
    fn duplicate_save_is_rejected(dir: TempDir) {
        let store = RouteStore::new(dir.path().to_path_buf());
        store.save(&route("x.DR", 1)).unwrap();
        assert!(matches!(store.save(&route("x.DR", 2)), Err(StorageError::Duplicate(name)) if name == "x.DR"));
    }

    #[rstest]
    fn list_sorts_by_departure_and_skips_junk(dir: TempDir) {
        let store = RouteStore::new(dir.path().to_path_buf());
        store.save(&route("late.DR", 5)).unwrap();
        store.save(&route("early.DR", 2)).unwrap();
        std::fs::write(dir.path().join("broken.yaml"), "name: [").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let names: Vec<_> = store.list().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["early.DR", "late.DR"]);
        assert_eq!(store.collection().unwrap().len(), 2);
    }

    #[rstest]
    fn missing_folder_is_empty(dir: TempDir) {
        let store = RouteStore::new(dir.path().join("nothing-here"));
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.clear().unwrap(), 0);
        assert!(matches!(store.load("a.DR"), Err(StorageError::NotFound(_))));
    }

    #[rstest]
    fn delete_and_clear(dir: TempDir) {
        let store = RouteStore::new(dir.path().to_path_buf());
        for (name, day) in [("a.DR", 1), ("b.0.EP", 2), ("b.1.EP", 3)] {
            store.save(&route(name, day)).unwrap();
        }

        store.delete("a.DR").unwrap();
        assert!(matches!(store.delete("a.DR"), Err(StorageError::NotFound(_))));
        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.list().unwrap().is_empty());
    }

    #[rstest]
    fn names_sharing_a_file_do_not_alias(dir: TempDir) {
        let store = RouteStore::new(dir.path().to_path_buf());
        store.save(&route("a_b.DR", 1)).unwrap();

        assert!(matches!(store.load("a/b.DR"), Err(StorageError::NotFound(name)) if name == "a/b.DR"));
        assert!(!store.contains("a/b.DR"));
        assert!(matches!(store.delete("a/b.DR"), Err(StorageError::NotFound(_))));
        assert!(matches!(store.save(&route("a/b.DR", 2)), Err(StorageError::Duplicate(_))));
        assert_eq!(store.load("a_b.DR").unwrap().name(), "a_b.DR");
    }

    #[rstest]
    #[case("plain.DR", "plain.DR")]
    #[case("a/b.DR", "a_b.DR")]
    #[case("c:\\d.0.EP", "c__d.0.EP")]
    fn names_are_made_safe_for_files(#[case] name: &str, #[case] stem: &str) {
        assert_eq!(file_stem(name), stem);
    }
}
