//! In-memory note store

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use citenote_bibtex::Header;
use citenote_identifiers::in_folder;

use super::{is_note, listed_header, NoteStore};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Contents {
    files: BTreeMap<String, String>,
    folders: BTreeSet<String>,
}

impl Contents {
    fn add_parents(&mut self, path: &str) {
        let mut parent = path;
        while let Some((dir, _)) = parent.rsplit_once('/') {
            self.folders.insert(dir.to_string());
            parent = dir;
        }
    }
}

/// A note store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: Mutex<Contents>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a folder (and its parents).
    pub fn create_folder(&self, path: &str) {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return;
        }
        let mut contents = self.lock();
        contents.add_parents(path);
        contents.folders.insert(path.to_string());
    }

    /// All file paths, sorted
    pub fn paths(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Contents> {
        // A panic while holding the lock leaves the maps consistent
        self.contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NoteStore for MemoryStore {
    fn exists(&self, path: &str) -> bool {
        let contents = self.lock();
        contents.files.contains_key(path) || contents.folders.contains(path.trim_end_matches('/'))
    }

    fn read(&self, path: &str) -> Result<String, StoreError> {
        self.lock()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    fn create(&self, path: &str, content: &str) -> Result<(), StoreError> {
        let mut contents = self.lock();
        if contents.files.contains_key(path) || contents.folders.contains(path) {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }
        contents.add_parents(path);
        contents.files.insert(path.to_string(), content.to_string());
        Ok(())
    }

    fn modify(&self, path: &str, content: &str) -> Result<(), StoreError> {
        match self.lock().files.get_mut(path) {
            Some(existing) => {
                *existing = content.to_string();
                Ok(())
            }
            None => Err(StoreError::NotFound(path.to_string())),
        }
    }

    fn list_headers(&self, prefix: &str) -> Result<Vec<(String, Header)>, StoreError> {
        let contents = self.lock();
        Ok(contents
            .files
            .iter()
            .filter(|(path, _)| is_note(path) && in_folder(path, prefix))
            .filter_map(|(path, content)| {
                listed_header(path, content).map(|header| (path.clone(), header))
            })
            .collect())
    }
}
