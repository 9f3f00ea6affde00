use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{Result, StateError};

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct ArchiveGeneration {
    #[serde(default)]
    pub generation: u64,
    #[serde(default)]
    pub time: i64,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct StateDoc {
    #[serde(default)]
    archive: BTreeMap<String, ArchiveGeneration>,
    #[serde(default)]
    sync: BTreeMap<String, i64>,
}

#[derive(Debug)]
pub struct GenerationStore {
    path: PathBuf,
    doc: StateDoc,
}

impl GenerationStore {
    pub fn load(path: &Path) -> Result<Self> {
        let doc = match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| StateError::Parse(path.display().to_string(), e.to_string()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => StateDoc::default(),
            Err(err) => {
                return Err(
                    StateError::Read(path.display().to_string(), err.to_string()).into(),
                )
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            doc,
        })
    }

    pub fn archive(&self, name: &str) -> ArchiveGeneration {
        self.doc.archive.get(name).copied().unwrap_or_default()
    }

    pub fn sync_time(&self, repo: &str) -> i64 {
        self.doc.sync.get(repo).copied().unwrap_or(0)
    }

    pub fn record_archive(&mut self, name: &str, generation: u64, now: i64) -> Result<()> {
        self.doc.archive.insert(
            name.to_string(),
            ArchiveGeneration {
                generation,
                time: now,
            },
        );
        self.flush()
    }

    pub fn record_sync(&mut self, repo: &str, now: i64) -> Result<()> {
        self.doc.sync.insert(repo.to_string(), now);
        self.flush()
    }

    fn flush(&self) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.doc)
            .map_err(|e| StateError::Write(self.path.display().to_string(), e.to_string()))?;
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .map_err(|e| StateError::Write(self.path.display().to_string(), e.to_string()))?;
        let mut file = NamedTempFile::new_in(parent)
            .map_err(|e| StateError::Write(self.path.display().to_string(), e.to_string()))?;
        file.write_all(data.as_bytes())
            .map_err(|e| StateError::Write(self.path.display().to_string(), e.to_string()))?;
        file.persist(&self.path)
            .map_err(|e| StateError::Write(self.path.display().to_string(), e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty_state() {
        let dir = TempDir::new().expect("tempdir");
        let store = GenerationStore::load(&dir.path().join("state.json")).expect("load");
        assert_eq!(store.archive("etc").generation, 0);
        assert_eq!(store.archive("etc").time, 0);
        assert_eq!(store.sync_time("main"), 0);
    }

    #[test]
    fn record_and_reload() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("state.json");
        let mut store = GenerationStore::load(&path).expect("load");
        store.record_archive("etc", 3, 1700000000).expect("record");
        store.record_sync("main", 1700000100).expect("record");

        let reloaded = GenerationStore::load(&path).expect("reload");
        assert_eq!(reloaded.archive("etc").generation, 3);
        assert_eq!(reloaded.archive("etc").time, 1700000000);
        assert_eq!(reloaded.sync_time("main"), 1700000100);
    }

    #[test]
    fn corrupt_file_is_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").expect("write");
        assert!(GenerationStore::load(&path).is_err());
    }

    #[test]
    fn flush_replaces_whole_document() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("state.json");
        fs::write(&path, "{\"archive\": {}, \"sync\": {}}").expect("seed");
        let mut store = GenerationStore::load(&path).expect("load");
        store.record_archive("home", 1, 42).expect("record");

        let contents = fs::read_to_string(&path).expect("read");
        let doc: StateDoc = serde_json::from_str(&contents).expect("parse");
        assert_eq!(doc.archive.get("home").expect("entry").generation, 1);
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "state.json")
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn abandoned_partial_write_leaves_prior_state_intact() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("state.json");
        let mut store = GenerationStore::load(&path).expect("load");
        store.record_archive("etc", 1, 100).expect("record");
        let before = fs::read_to_string(&path).expect("read");

        // A write that died before the rename leaves only a stray temp file.
        fs::write(dir.path().join(".tmp-crashed"), "{\"archive\": {\"etc").expect("write");

        assert_eq!(fs::read_to_string(&path).expect("read"), before);
        let reloaded = GenerationStore::load(&path).expect("reload");
        assert_eq!(reloaded.archive("etc").generation, 1);
    }

    #[test]
    fn tolerates_partial_entries() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("state.json");
        fs::write(&path, "{\"archive\": {\"etc\": {\"generation\": 2}}}").expect("write");
        let store = GenerationStore::load(&path).expect("load");
        assert_eq!(store.archive("etc").generation, 2);
        assert_eq!(store.archive("etc").time, 0);
    }
}
