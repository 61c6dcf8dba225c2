//! In-memory filesystem for tests and dry runs.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Cursor, Read};

use super::VirtualFilesystem;

/// A fixed tree of directories and files held in memory.
///
/// Forensic path convention: `/dir/file.bin`. Creating a file implicitly
/// creates its parent directories.
#[derive(Debug, Default)]
pub struct InMemoryFilesystem {
    files: BTreeMap<String, Vec<u8>>,
    directories: BTreeSet<String>,
}

impl InMemoryFilesystem {
    pub fn new() -> InMemoryFilesystem {
        InMemoryFilesystem::default()
    }

    /// Register a directory and all of its ancestors.
    pub fn create_directory(&mut self, path: &str) {
        let normalized = normalize(path);
        let mut current = String::new();
        for segment in normalized.split('/').filter(|s| !s.is_empty()) {
            current.push('/');
            current.push_str(segment);
            self.directories.insert(current.clone());
        }
    }

    /// Register a file with the given content, creating parent directories.
    pub fn create_file(&mut self, path: &str, content: &[u8]) {
        let normalized = normalize(path);
        if let Some(index) = normalized.rfind('/') {
            if index > 0 {
                self.create_directory(&normalized[..index]);
            }
        }
        self.files.insert(normalized, content.to_vec());
    }

    fn is_directory(&self, path: &str) -> bool {
        path.is_empty() || path == "/" || self.directories.contains(path)
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

impl VirtualFilesystem for InMemoryFilesystem {
    fn name(&self) -> &'static str {
        "MemFs"
    }

    fn list_directory(&self, path: &str) -> io::Result<Vec<String>> {
        let normalized = if path.is_empty() || path == "/" {
            String::new()
        } else {
            normalize(path)
        };
        if !self.is_directory(if normalized.is_empty() { "/" } else { &normalized }) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not a directory: {path}"),
            ));
        }

        let prefix = format!("{normalized}/");
        let mut entries = BTreeSet::new();
        for candidate in self.directories.iter().chain(self.files.keys()) {
            if let Some(rest) = candidate.strip_prefix(&prefix) {
                if let Some(first) = rest.split('/').next() {
                    if !first.is_empty() {
                        entries.insert(first.to_string());
                    }
                }
            }
        }
        Ok(entries.into_iter().collect())
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        let normalized = normalize(path);
        match self.files.get(&normalized) {
            Some(content) => Ok(Box::new(Cursor::new(content.clone()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {path}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::exists;

    fn fixture() -> InMemoryFilesystem {
        let mut fs = InMemoryFilesystem::new();
        fs.create_directory("/dir/a");
        fs.create_file("/dir/bar.bin", b"test");
        fs.create_file("/foo.bin", b"test");
        fs
    }

    #[test]
    fn test_list_root() {
        let fs = fixture();
        assert_eq!(fs.list_directory("/").unwrap(), vec!["dir", "foo.bin"]);
    }

    #[test]
    fn test_list_directory() {
        let fs = fixture();
        assert_eq!(fs.list_directory("/dir").unwrap(), vec!["a", "bar.bin"]);
    }

    #[test]
    fn test_list_file_fails() {
        let fs = fixture();
        assert!(fs.list_directory("/foo.bin").is_err());
    }

    #[test]
    fn test_open_and_exists() {
        let fs = fixture();
        let mut content = String::new();
        fs.open("/dir/bar.bin").unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "test");

        assert!(exists(&fs, "/dir"));
        assert!(exists(&fs, "/dir/bar.bin"));
        assert!(!exists(&fs, "/dir/missing.bin"));
    }

    #[test]
    fn test_file_creates_parents() {
        let mut fs = InMemoryFilesystem::new();
        fs.create_file("/a/b/c.txt", b"x");
        assert_eq!(fs.list_directory("/a").unwrap(), vec!["b"]);
        assert_eq!(fs.list_directory("/a/b").unwrap(), vec!["c.txt"]);
    }
}
