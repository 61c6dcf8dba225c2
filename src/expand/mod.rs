//! Expansion engine: parameter resolution, glob and registry expansion,
//! artifact group flattening.
//!
//! Expansion is copy-on-write: sources are cloned and the expanded copies
//! returned, so a definition shared across concurrent expansion tasks is
//! never mutated.

pub mod glob;
pub mod group;
pub mod path;
pub mod resolver;

use anyhow::Result;
use log::warn;

use crate::definitions::{ArtifactDefinition, KeyValuePair, Source, SourceType};
use crate::knowledge::ParameterResolver;
use crate::vfs::VirtualFilesystem;

pub use group::expand_artifact_group;
pub use path::expand_path;
pub use resolver::resolve;

/// Everything source expansion needs from its environment: parameter
/// values, the filesystem, optionally a registry view, and whether rooted
/// paths should be replicated per partition.
///
/// The registry is `None` on platforms without one, which makes key
/// expansion an empty no-op there.
pub trait ArtifactCollector: Send + Sync {
    fn resolver(&self) -> &dyn ParameterResolver;
    fn fs(&self) -> &dyn VirtualFilesystem;
    fn registry(&self) -> Option<&dyn VirtualFilesystem>;
    fn add_partitions(&self) -> bool;
}

/// Expand a single source, replacing its declared paths, keys or key
/// value pairs with the concrete locations they resolve to.
///
/// A path or key that fails to expand is logged and contributes nothing;
/// its siblings still expand. Source kinds without locations (groups,
/// commands, WMI) pass through unchanged.
pub fn expand_source(source: &Source, collector: &dyn ArtifactCollector) -> Source {
    let mut expanded = source.clone();
    match source.source_type {
        SourceType::File | SourceType::Directory | SourceType::Path => {
            let mut paths = Vec::new();
            for declared in &source.attributes.paths {
                let normalized = if source.attributes.separator == "\\" {
                    declared.replace('\\', "/")
                } else {
                    declared.clone()
                };
                match expand_path(
                    collector.fs(),
                    &normalized,
                    collector.add_partitions(),
                    collector.resolver(),
                ) {
                    Ok(matches) => paths.extend(matches),
                    Err(err) => warn!("skipping path {declared}: {err:#}"),
                }
            }
            expanded.attributes.paths = paths;
        }
        SourceType::RegistryKey => {
            let mut keys = Vec::new();
            for declared in &source.attributes.keys {
                match expand_key(declared, collector) {
                    Ok(matches) => keys.extend(matches),
                    Err(err) => warn!("skipping key {declared}: {err:#}"),
                }
            }
            expanded.attributes.keys = keys;
        }
        SourceType::RegistryValue => {
            let mut pairs = Vec::new();
            for declared in &source.attributes.key_value_pairs {
                match expand_key(&declared.key, collector) {
                    Ok(matches) => pairs.extend(matches.into_iter().map(|key| KeyValuePair {
                        key,
                        value: declared.value.clone(),
                    })),
                    Err(err) => warn!("skipping key value pair {}: {err:#}", declared.key),
                }
            }
            expanded.attributes.key_value_pairs = pairs;
        }
        SourceType::ArtifactGroup
        | SourceType::Command
        | SourceType::Wmi
        | SourceType::Unknown(_) => {}
    }
    expanded
}

/// Expand every source of every definition. Definitions keep their order;
/// sources keep their declaration order.
pub fn expand_definitions(
    definitions: Vec<ArtifactDefinition>,
    collector: &dyn ArtifactCollector,
) -> Vec<ArtifactDefinition> {
    definitions
        .into_iter()
        .map(|mut definition| {
            definition.sources = definition
                .sources
                .iter()
                .map(|source| expand_source(source, collector))
                .collect();
            definition
        })
        .collect()
}

/// Expand a registry key declaration against the registry view. Key paths
/// are declared backslash separated; the separators are swapped and the
/// key rooted before the usual expand-and-glob pipeline runs. Platforms
/// without a registry yield no results.
pub fn expand_key(key: &str, collector: &dyn ArtifactCollector) -> Result<Vec<String>> {
    let Some(registry) = collector.registry() else {
        return Ok(Vec::new());
    };
    let rooted = format!("/{}", swap_separators(key));
    expand_path(registry, &rooted, false, collector.resolver())
}

/// Swap backslash and slash so registry keys become forensic paths while
/// embedded forward slashes in key names survive as backslashes.
fn swap_separators(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\\' => '/',
            '/' => '\\',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::Attributes;
    use crate::knowledge::IdentityResolver;
    use crate::vfs::InMemoryFilesystem;

    struct TestCollector {
        fs: InMemoryFilesystem,
        registry: Option<InMemoryFilesystem>,
        resolver: IdentityResolver,
    }

    impl ArtifactCollector for TestCollector {
        fn resolver(&self) -> &dyn ParameterResolver {
            &self.resolver
        }

        fn fs(&self) -> &dyn VirtualFilesystem {
            &self.fs
        }

        fn registry(&self) -> Option<&dyn VirtualFilesystem> {
            self.registry.as_ref().map(|r| r as &dyn VirtualFilesystem)
        }

        fn add_partitions(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_swap_separators() {
        assert_eq!(
            swap_separators(r"HKEY_LOCAL_MACHINE\SOFTWARE\Micro/soft"),
            r"HKEY_LOCAL_MACHINE/SOFTWARE/Micro\soft"
        );
    }

    #[test]
    fn test_expand_file_source() {
        let mut fs = InMemoryFilesystem::new();
        fs.create_file("/dir/bar.bin", b"x");
        fs.create_file("/dir/baz.bin", b"x");
        let collector = TestCollector {
            fs,
            registry: None,
            resolver: IdentityResolver,
        };

        let source = Source {
            source_type: SourceType::File,
            attributes: Attributes {
                paths: vec!["/*/bar.bin".to_string()],
                ..Attributes::default()
            },
            ..Source::default()
        };

        let expanded = expand_source(&source, &collector);
        assert_eq!(expanded.attributes.paths, vec!["/dir/bar.bin"]);
        // The input source is untouched.
        assert_eq!(source.attributes.paths, vec!["/*/bar.bin"]);
    }

    #[test]
    fn test_expand_backslash_separator_paths() {
        let mut fs = InMemoryFilesystem::new();
        fs.create_file("/C/Windows/notepad.exe", b"x");
        let collector = TestCollector {
            fs,
            registry: None,
            resolver: IdentityResolver,
        };

        let source = Source {
            source_type: SourceType::File,
            attributes: Attributes {
                paths: vec![r"\C\Windows\*.exe".to_string()],
                separator: "\\".to_string(),
                ..Attributes::default()
            },
            ..Source::default()
        };

        let expanded = expand_source(&source, &collector);
        assert_eq!(expanded.attributes.paths, vec!["/C/Windows/notepad.exe"]);
    }

    #[test]
    fn test_expand_registry_key_source() {
        let mut registry = InMemoryFilesystem::new();
        registry.create_directory("/HKEY_LOCAL_MACHINE/SOFTWARE/VendorA");
        registry.create_directory("/HKEY_LOCAL_MACHINE/SOFTWARE/VendorB");
        let collector = TestCollector {
            fs: InMemoryFilesystem::new(),
            registry: Some(registry),
            resolver: IdentityResolver,
        };

        let source = Source {
            source_type: SourceType::RegistryKey,
            attributes: Attributes {
                keys: vec![r"HKEY_LOCAL_MACHINE\SOFTWARE\*".to_string()],
                ..Attributes::default()
            },
            ..Source::default()
        };

        let expanded = expand_source(&source, &collector);
        assert_eq!(
            expanded.attributes.keys,
            vec![
                "/HKEY_LOCAL_MACHINE/SOFTWARE/VendorA",
                "/HKEY_LOCAL_MACHINE/SOFTWARE/VendorB"
            ]
        );
    }

    #[test]
    fn test_expand_registry_value_source_without_registry() {
        let collector = TestCollector {
            fs: InMemoryFilesystem::new(),
            registry: None,
            resolver: IdentityResolver,
        };

        let source = Source {
            source_type: SourceType::RegistryValue,
            attributes: Attributes {
                key_value_pairs: vec![KeyValuePair {
                    key: r"HKEY_LOCAL_MACHINE\SOFTWARE\App".to_string(),
                    value: "Version".to_string(),
                }],
                ..Attributes::default()
            },
            ..Source::default()
        };

        let expanded = expand_source(&source, &collector);
        assert!(expanded.attributes.key_value_pairs.is_empty());
    }

    #[test]
    fn test_group_and_command_sources_pass_through() {
        let collector = TestCollector {
            fs: InMemoryFilesystem::new(),
            registry: None,
            resolver: IdentityResolver,
        };

        let mut command = Source::new(SourceType::Command);
        command.attributes.cmd = "uname".to_string();
        let expanded = expand_source(&command, &collector);
        assert_eq!(expanded, command);
    }
}
