//! Collection pipeline: decode, filter by name, filter by OS, expand.
//!
//! The pipeline never collects anything itself; it turns a definition
//! corpus into the stream of concrete, expanded sources a collector can
//! act on. The parallel variant fans expansion out with one worker per
//! definition and funnels results through a bounded channel.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc::{self, Receiver};

use crate::constants::RESULT_CHANNEL_CAPACITY;
use crate::decode;
use crate::definitions::{ArtifactDefinition, Source};
use crate::expand::{expand_source, ArtifactCollector};
use crate::filter::{filter_name, filter_os};
use crate::knowledge::{HostResolver, ParameterResolver};
use crate::vfs::{OsFilesystem, VirtualFilesystem};

/// A fully expanded source paired with the name of its owning artifact
/// definition.
#[derive(Debug, Clone)]
pub struct NamedSource {
    pub artifact: String,
    pub source: Source,
}

/// Collector composition for the machine this process runs on: the real
/// filesystem, the live registry on Windows, and host-backed parameter
/// resolution.
#[derive(Debug, Default)]
pub struct HostCollector {
    fs: OsFilesystem,
    #[cfg(windows)]
    registry: crate::vfs::RegistryFilesystem,
    resolver: HostResolver,
    add_partitions: bool,
}

impl HostCollector {
    pub fn new(add_partitions: bool) -> HostCollector {
        HostCollector {
            add_partitions,
            ..HostCollector::default()
        }
    }
}

impl ArtifactCollector for HostCollector {
    fn resolver(&self) -> &dyn ParameterResolver {
        &self.resolver
    }

    fn fs(&self) -> &dyn VirtualFilesystem {
        &self.fs
    }

    fn registry(&self) -> Option<&dyn VirtualFilesystem> {
        #[cfg(windows)]
        {
            Some(&self.registry)
        }
        #[cfg(not(windows))]
        {
            None
        }
    }

    fn add_partitions(&self) -> bool {
        self.add_partitions
    }
}

/// Reduce a corpus to the definitions that apply here and now: the
/// requested names (flattening groups) when given, then the current
/// platform.
fn select(
    selected: Option<&[String]>,
    definitions: Vec<ArtifactDefinition>,
) -> Vec<ArtifactDefinition> {
    let definitions = match selected {
        Some(names) => filter_name(names, definitions),
        None => definitions,
    };
    filter_os(definitions)
}

/// Filter and expand a corpus sequentially.
///
/// Within one artifact the expanded sources keep their declaration
/// order; artifacts keep corpus order.
pub fn process(
    selected: Option<&[String]>,
    definitions: Vec<ArtifactDefinition>,
    collector: &dyn ArtifactCollector,
) -> Vec<NamedSource> {
    let mut results = Vec::new();
    for definition in select(selected, definitions) {
        for source in &definition.sources {
            results.push(NamedSource {
                artifact: definition.name.clone(),
                source: expand_source(source, collector),
            });
        }
    }
    results
}

/// Decode definition files, then [`process`] them. File-level I/O and
/// parse failures are hard errors.
pub fn process_files(
    selected: Option<&[String]>,
    paths: &[PathBuf],
    collector: &dyn ArtifactCollector,
) -> Result<Vec<NamedSource>> {
    let mut definitions = Vec::new();
    for path in paths {
        let (decoded, _) = decode::decode_file(path)?;
        definitions.extend(decoded);
    }
    Ok(process(selected, definitions, collector))
}

/// Filter the corpus, then expand every definition on its own blocking
/// worker task.
///
/// Returns the number of sources that will be expanded along with the
/// receiving end of a bounded channel. The channel closes once every
/// worker has finished; a full channel exerts backpressure on workers, an
/// abandoned receiver stops them. Results from different artifacts
/// interleave by worker completion; within one artifact, declaration
/// order is preserved.
pub fn process_parallel(
    selected: Option<&[String]>,
    definitions: Vec<ArtifactDefinition>,
    collector: Arc<dyn ArtifactCollector>,
) -> (usize, Receiver<NamedSource>) {
    let definitions = select(selected, definitions);
    let expected = definitions
        .iter()
        .map(|definition| definition.sources.len())
        .sum();

    let (tx, rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);
    for definition in definitions {
        let tx = tx.clone();
        let collector = Arc::clone(&collector);
        tokio::task::spawn_blocking(move || {
            for source in &definition.sources {
                let expanded = expand_source(source, collector.as_ref());
                let named = NamedSource {
                    artifact: definition.name.clone(),
                    source: expanded,
                };
                if tx.blocking_send(named).is_err() {
                    // Receiver abandoned the run.
                    return;
                }
            }
        });
    }
    // Workers hold the remaining senders; the channel closes when the
    // last one finishes.
    (expected, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{Attributes, SourceType};
    use crate::knowledge::IdentityResolver;
    use crate::vfs::InMemoryFilesystem;

    struct MemoryCollector {
        fs: InMemoryFilesystem,
        resolver: IdentityResolver,
    }

    impl ArtifactCollector for MemoryCollector {
        fn resolver(&self) -> &dyn ParameterResolver {
            &self.resolver
        }

        fn fs(&self) -> &dyn VirtualFilesystem {
            &self.fs
        }

        fn registry(&self) -> Option<&dyn VirtualFilesystem> {
            None
        }

        fn add_partitions(&self) -> bool {
            false
        }
    }

    fn collector() -> MemoryCollector {
        let mut fs = InMemoryFilesystem::new();
        fs.create_file("/dir/bar.bin", b"x");
        fs.create_file("/dir/baz.bin", b"x");
        MemoryCollector {
            fs,
            resolver: IdentityResolver,
        }
    }

    fn file_definition(name: &str, pattern: &str) -> ArtifactDefinition {
        ArtifactDefinition {
            name: name.to_string(),
            sources: vec![Source {
                source_type: SourceType::File,
                attributes: Attributes {
                    paths: vec![pattern.to_string()],
                    ..Attributes::default()
                },
                ..Source::default()
            }],
            ..ArtifactDefinition::default()
        }
    }

    #[test]
    fn test_process_expands_sources() {
        let results = process(
            None,
            vec![file_definition("BinFiles", "/dir/*.bin")],
            &collector(),
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].artifact, "BinFiles");
        assert_eq!(
            results[0].source.attributes.paths,
            vec!["/dir/bar.bin", "/dir/baz.bin"]
        );
    }

    #[test]
    fn test_process_filters_by_name() {
        let corpus = vec![
            file_definition("BinFiles", "/dir/*.bin"),
            file_definition("OtherFiles", "/dir/none"),
        ];
        let results = process(Some(&["BinFiles".to_string()]), corpus, &collector());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].artifact, "BinFiles");
    }

    #[test]
    fn test_process_filters_by_os() {
        let mut foreign = file_definition("ForeignFiles", "/dir/*.bin");
        // No platform matches both names at once.
        foreign.supported_os = vec!["Windows".to_string(), "Darwin".to_string()];
        foreign.supported_os.retain(|os| {
            !crate::knowledge::OperatingSystem::current().matches(os)
        });
        let results = process(None, vec![foreign], &collector());
        assert!(results.is_empty());
    }
}
