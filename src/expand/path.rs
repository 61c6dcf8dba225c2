//! Cross-platform path normalization and expansion.

use std::io;

use anyhow::{bail, Result};
use log::warn;

use crate::expand::{glob, resolver};
use crate::knowledge::ParameterResolver;
use crate::vfs::VirtualFilesystem;

/// Expand one declared path into the concrete filesystem locations it
/// denotes: resolve `%%parameter%%` placeholders, convert each candidate
/// to a forensic path (optionally once per partition), then glob.
///
/// Failure to resolve a parameter or to normalize a candidate aborts the
/// call; glob failures are logged per candidate and skipped so sibling
/// candidates still contribute results. The result is sorted.
pub fn expand_path(
    fs: &dyn VirtualFilesystem,
    syspath: &str,
    add_partitions: bool,
    parameters: &dyn ParameterResolver,
) -> Result<Vec<String>> {
    let candidates = resolver::resolve(syspath, parameters)?;
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let mut forensic_paths = Vec::new();
    for candidate in candidates {
        forensic_paths.extend(to_forensic_paths(&candidate, add_partitions, fs)?);
    }

    let mut expanded = Vec::new();
    for path in forensic_paths {
        match glob::glob(fs, &path) {
            Ok(matches) => expanded.extend(matches),
            Err(err) => warn!("glob expansion failed for {path}: {err:#}"),
        }
    }

    expanded.sort();
    Ok(expanded)
}

/// Convert a candidate path into one or more rooted forensic paths.
fn to_forensic_paths(
    name: &str,
    add_partitions: bool,
    fs: &dyn VirtualFilesystem,
) -> Result<Vec<String>> {
    if cfg!(windows) {
        return windows_forensic_paths(name, add_partitions, || fs.list_directory("/"));
    }
    if !name.starts_with('/') {
        bail!("path needs to be absolute: {name}");
    }
    Ok(vec![name.to_string()])
}

/// Windows normalization: fold a drive letter into a root segment
/// (`C:\Windows` becomes `/C/Windows`) and, when partition expansion is
/// requested and the path is not already partition qualified, replicate
/// the path once per discovered drive root.
fn windows_forensic_paths<F>(
    name: &str,
    add_partitions: bool,
    list_partitions: F,
) -> Result<Vec<String>>
where
    F: Fn() -> io::Result<Vec<String>>,
{
    let name = name.replace('\\', "/");
    let bytes = name.as_bytes();

    match bytes.len() {
        0 => Ok(vec!["/".to_string()]),
        1 => {
            if bytes[0] == b'/' {
                if add_partitions {
                    let partitions = list_partitions()?;
                    Ok(partitions.iter().map(|p| format!("/{p}")).collect())
                } else {
                    Ok(vec!["/".to_string()])
                }
            } else if bytes[0].is_ascii_alphabetic() {
                Ok(vec![format!("/{name}")])
            } else {
                bail!("invalid path: {name}")
            }
        }
        len => {
            if bytes[1] == b':' {
                return Ok(vec![format!("/{}{}", &name[..1], &name[2..])]);
            }
            // Already partition qualified, e.g. /C or /C/Windows.
            if bytes[0] == b'/'
                && bytes[1].is_ascii_alphabetic()
                && (len == 2 || bytes[2] == b'/')
            {
                return Ok(vec![name]);
            }
            if add_partitions {
                let partitions = list_partitions()?;
                return Ok(partitions.iter().map(|p| format!("/{p}{name}")).collect());
            }
            Ok(vec![name])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{IdentityResolver, ResolutionError};
    use crate::vfs::InMemoryFilesystem;

    fn two_partitions() -> io::Result<Vec<String>> {
        Ok(vec!["C".to_string(), "D".to_string()])
    }

    #[test]
    fn test_drive_letter_becomes_root_segment() {
        assert_eq!(
            windows_forensic_paths("C:/Windows", false, two_partitions).unwrap(),
            vec!["/C/Windows"]
        );
        assert_eq!(
            windows_forensic_paths(r"C:\Windows\System32", false, two_partitions).unwrap(),
            vec!["/C/Windows/System32"]
        );
    }

    #[test]
    fn test_partition_qualified_path_is_kept() {
        assert_eq!(
            windows_forensic_paths("/C/Windows", true, two_partitions).unwrap(),
            vec!["/C/Windows"]
        );
        assert_eq!(
            windows_forensic_paths("/C", true, two_partitions).unwrap(),
            vec!["/C"]
        );
    }

    #[test]
    fn test_partition_expansion() {
        assert_eq!(
            windows_forensic_paths("/Windows", true, two_partitions).unwrap(),
            vec!["/C/Windows", "/D/Windows"]
        );
        assert_eq!(
            windows_forensic_paths("/", true, two_partitions).unwrap(),
            vec!["/C", "/D"]
        );
    }

    #[test]
    fn test_unqualified_path_without_partitions() {
        assert_eq!(
            windows_forensic_paths("/Windows/Temp", false, two_partitions).unwrap(),
            vec!["/Windows/Temp"]
        );
    }

    #[test]
    fn test_single_letter() {
        assert_eq!(
            windows_forensic_paths("C", false, two_partitions).unwrap(),
            vec!["/C"]
        );
        assert!(windows_forensic_paths("%", false, two_partitions).is_err());
    }

    #[test]
    #[cfg(not(windows))]
    fn test_relative_path_is_rejected() {
        let fs = InMemoryFilesystem::new();
        assert!(expand_path(&fs, "etc/passwd", false, &IdentityResolver).is_err());
    }

    #[test]
    fn test_expand_path_with_glob() {
        let mut fs = InMemoryFilesystem::new();
        fs.create_file("/dir/bar.bin", b"x");
        fs.create_file("/dir/baz.bin", b"x");
        fs.create_file("/dir/other.txt", b"x");

        let expanded = expand_path(&fs, "/dir/*.bin", false, &IdentityResolver).unwrap();
        assert_eq!(expanded, vec!["/dir/bar.bin", "/dir/baz.bin"]);
    }

    #[test]
    fn test_expand_path_strips_placeholders_via_resolver() {
        struct DirResolver;
        impl ParameterResolver for DirResolver {
            fn resolve(&self, parameter: &str) -> Result<Vec<String>, ResolutionError> {
                match parameter {
                    "users.homedir" => Ok(vec!["/home/alice".to_string(), "/home/bob".to_string()]),
                    other => Err(ResolutionError::UnknownParameter(other.to_string())),
                }
            }
        }

        let mut fs = InMemoryFilesystem::new();
        fs.create_file("/home/alice/.bashrc", b"x");
        fs.create_file("/home/bob/.bashrc", b"x");
        fs.create_file("/home/carol/.bashrc", b"x");

        let expanded =
            expand_path(&fs, "%%users.homedir%%/.bashrc", false, &DirResolver).unwrap();
        assert_eq!(expanded, vec!["/home/alice/.bashrc", "/home/bob/.bashrc"]);
    }

    #[test]
    fn test_unresolvable_parameter_fails_whole_call() {
        struct FailingResolver;
        impl ParameterResolver for FailingResolver {
            fn resolve(&self, parameter: &str) -> Result<Vec<String>, ResolutionError> {
                Err(ResolutionError::UnknownParameter(parameter.to_string()))
            }
        }

        let fs = InMemoryFilesystem::new();
        assert!(expand_path(&fs, "/%%users.homedir%%/x", false, &FailingResolver).is_err());
    }
}
