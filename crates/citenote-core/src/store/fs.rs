//! Note store backed by a vault directory on disk

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use citenote_bibtex::Header;
use walkdir::{DirEntry, WalkDir};

use super::{is_note, listed_header, NoteStore};
use crate::error::StoreError;

/// A vault directory of Markdown notes
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a vault rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(StoreError::NotFound(root.display().to_string()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a vault-relative path, refusing anything that leaves the vault
    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn relative_path(&self, full: &Path) -> Option<String> {
        let relative = full.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }
}

fn io_error(path: &str, source: std::io::Error) -> StoreError {
    match source.kind() {
        ErrorKind::NotFound => StoreError::NotFound(path.to_string()),
        ErrorKind::AlreadyExists => StoreError::AlreadyExists(path.to_string()),
        _ => StoreError::Io {
            path: path.to_string(),
            source,
        },
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

impl NoteStore for FsStore {
    fn exists(&self, path: &str) -> bool {
        let folder = path.trim_end_matches('/');
        self.resolve(folder).is_ok_and(|full| full.exists())
    }

    fn read(&self, path: &str) -> Result<String, StoreError> {
        let full = self.resolve(path)?;
        fs::read_to_string(full).map_err(|e| io_error(path, e))
    }

    fn create(&self, path: &str, content: &str) -> Result<(), StoreError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(path, e))?;
        }
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .and_then(|mut file| std::io::Write::write_all(&mut file, content.as_bytes()))
            .map_err(|e| io_error(path, e))?;
        tracing::debug!("Created {:?}", full);
        Ok(())
    }

    fn modify(&self, path: &str, content: &str) -> Result<(), StoreError> {
        let full = self.resolve(path)?;
        if !full.is_file() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        fs::write(&full, content).map_err(|e| io_error(path, e))?;
        tracing::debug!("Modified {:?}", full);
        Ok(())
    }

    fn list_headers(&self, prefix: &str) -> Result<Vec<(String, Header)>, StoreError> {
        let prefix = prefix.trim_matches('/');
        let start = if prefix.is_empty() {
            self.root.clone()
        } else {
            self.resolve(prefix)?
        };
        if !start.is_dir() {
            return Ok(Vec::new());
        }

        let mut headers = Vec::new();
        let walker = WalkDir::new(&start)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable vault entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(path) = self.relative_path(entry.path()) else {
                continue;
            };
            if !is_note(&path) {
                continue;
            }
            let content = match fs::read_to_string(entry.path()) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path, e);
                    continue;
                }
            };
            if let Some(header) = listed_header(&path, &content) {
                headers.push((path, header));
            }
        }

        headers.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vault() -> (TempDir, FsStore) {
        let dir = TempDir::new().unwrap();
        let store = FsStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(FsStore::open(&missing), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_create_read_modify() {
        let (dir, store) = vault();
        store.create("Lit/a.md", "one").unwrap();
        assert!(dir.path().join("Lit").join("a.md").is_file());
        assert_eq!(store.read("Lit/a.md").unwrap(), "one");

        store.modify("Lit/a.md", "two").unwrap();
        assert_eq!(store.read("Lit/a.md").unwrap(), "two");
        assert!(store.exists("Lit"));
        assert!(store.exists("Lit/"));
        assert!(store.exists("Lit/a.md"));
    }

    #[test]
    fn test_create_never_overwrites() {
        let (_dir, store) = vault();
        store.create("a.md", "one").unwrap();
        assert!(matches!(store.create("a.md", "two"), Err(StoreError::AlreadyExists(_))));
        assert_eq!(store.read("a.md").unwrap(), "one");
    }

    #[test]
    fn test_modify_missing() {
        let (_dir, store) = vault();
        assert!(matches!(store.modify("a.md", "x"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.read("a.md"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_paths_outside_vault_refused() {
        let (_dir, store) = vault();
        assert!(matches!(store.read("../secret"), Err(StoreError::InvalidPath(_))));
        assert!(matches!(store.create("/tmp/x.md", ""), Err(StoreError::InvalidPath(_))));
        assert!(!store.exists("../"));
    }

    #[test]
    fn test_list_headers() {
        let (dir, store) = vault();
        store.create("Lit/b.md", "---\ncitationKey: b\n---\n").unwrap();
        store.create("Lit/sub/a.md", "---\ncitationKey: a\n---\n").unwrap();
        store.create("Lit/plain.md", "no header").unwrap();
        store.create("Lit/broken.md", "---\nkey: [oops\n---\n").unwrap();
        store.create("Lit/refs.bib", "@misc{x,\n}\n").unwrap();
        store.create("Other/c.md", "---\ncitationKey: c\n---\n").unwrap();
        fs::create_dir_all(dir.path().join(".obsidian")).unwrap();
        fs::write(dir.path().join(".obsidian/d.md"), "---\ncitationKey: d\n---\n").unwrap();

        let listed = store.list_headers("Lit").unwrap();
        let paths: Vec<&str> = listed.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["Lit/b.md", "Lit/sub/a.md"]);
        assert_eq!(listed[0].1["citationKey"], serde_json::json!("b"));

        let all = store.list_headers("").unwrap();
        assert_eq!(all.len(), 3);

        assert!(store.list_headers("Missing").unwrap().is_empty());
    }

    #[test]
    fn test_list_headers_skips_unreadable_notes() {
        let (dir, store) = vault();
        store.create("Lit/a.md", "---\ncitationKey: a\n---\n").unwrap();
        fs::write(dir.path().join("Lit").join("bin.md"), [0xff, 0xfe, 0x00]).unwrap();

        let listed = store.list_headers("Lit").unwrap();
        let paths: Vec<&str> = listed.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["Lit/a.md"]);
    }
}
