//! Local OS filesystem behind the forensic path convention.

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use super::VirtualFilesystem;

/// The real filesystem of the machine this process runs on.
///
/// On Windows the virtual root lists the available drive letters and
/// `/C/Windows` maps to `C:\Windows`; on unix forensic paths are the
/// native paths.
#[derive(Debug, Default)]
pub struct OsFilesystem;

impl OsFilesystem {
    pub fn new() -> OsFilesystem {
        OsFilesystem
    }

    /// Translate a forensic path into a native path.
    fn to_native(&self, path: &str) -> PathBuf {
        if cfg!(windows) {
            let trimmed = path.trim_start_matches('/');
            match trimmed.split_once('/') {
                Some((drive, rest)) => PathBuf::from(format!("{drive}:\\{}", rest.replace('/', "\\"))),
                None if !trimmed.is_empty() => PathBuf::from(format!("{trimmed}:\\")),
                _ => PathBuf::from("\\"),
            }
        } else if path.is_empty() {
            PathBuf::from("/")
        } else {
            PathBuf::from(path)
        }
    }

    #[cfg(windows)]
    fn list_drives(&self) -> Vec<String> {
        ('A'..='Z')
            .filter(|letter| std::path::Path::new(&format!("{letter}:\\")).exists())
            .map(|letter| letter.to_string())
            .collect()
    }
}

impl VirtualFilesystem for OsFilesystem {
    fn name(&self) -> &'static str {
        "OsFs"
    }

    fn list_directory(&self, path: &str) -> io::Result<Vec<String>> {
        #[cfg(windows)]
        if path.is_empty() || path == "/" {
            return Ok(self.list_drives());
        }

        let native = self.to_native(path);
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(native)? {
            entries.push(entry?.file_name().to_string_lossy().into_owned());
        }
        entries.sort();
        Ok(entries)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        let native = self.to_native(path);
        if native.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("is a directory: {path}"),
            ));
        }
        Ok(Box::new(File::open(native)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_list_root_contains_etc() {
        let fs = OsFilesystem::new();
        let entries = fs.list_directory("/").unwrap();
        assert!(entries.iter().any(|entry| entry == "etc"));
    }

    #[test]
    #[cfg(unix)]
    fn test_open_file() {
        let fs = OsFilesystem::new();
        assert!(fs.open("/etc/passwd").is_ok());
        assert!(fs.open("/etc").is_err());
    }
}
