//! Abstract filesystem capability used by the expansion engine.
//!
//! The engine never touches a filesystem directly; it only lists
//! directories and probes for existence through this trait, so the same
//! glob logic runs against the local OS tree, the Windows registry and
//! in-memory fixtures.

use std::io::{self, Read};

mod memory;
mod os;
#[cfg(windows)]
mod registry;

pub use memory::InMemoryFilesystem;
pub use os::OsFilesystem;
#[cfg(windows)]
pub use registry::RegistryFilesystem;

/// Minimal filesystem surface consumed by the expansion engine.
///
/// Paths are always forensic paths: absolute, slash-separated, with
/// Windows drive letters folded into root segments (`/C/Windows`).
pub trait VirtualFilesystem: Send + Sync {
    /// Identifier of the backend, e.g. `OsFs`. Used to recognize the real
    /// OS filesystem when deciding whether partition expansion applies.
    fn name(&self) -> &'static str;

    /// Entry names directly below `path`. Fails for files and for paths
    /// that do not exist.
    fn list_directory(&self, path: &str) -> io::Result<Vec<String>>;

    /// Open a file for reading. Directories and missing paths fail.
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>>;
}

/// Whether a forensic path exists on the filesystem, as a directory or a
/// file.
pub fn exists(fs: &dyn VirtualFilesystem, path: &str) -> bool {
    fs.list_directory(path).is_ok() || fs.open(path).is_ok()
}

/// Join a parent forensic path and a child name. The root is the empty
/// string, so joining stays slash-rooted.
pub(crate) fn join(parent: &str, child: &str) -> String {
    format!("{parent}/{child}")
}
